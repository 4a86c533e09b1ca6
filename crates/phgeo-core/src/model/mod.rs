// crates/phgeo-core/src/model/mod.rs
pub mod convert;
pub mod flat;
pub mod hierarchy;
pub mod records;
pub mod search;

pub use flat::GeoDb;
pub use hierarchy::{BarangayView, MunicipalityView, ProvinceView, RegionView};
pub use records::{
    Barangay, BarangayId, GeoFields, Geography, Municipality, MunicipalityId, Province, ProvinceId,
    Region, RegionId, Row,
};
pub use search::GeoItem;
