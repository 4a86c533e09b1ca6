// crates/phgeo-core/src/prelude.rs
pub use crate::choices::{CityClass, IncomeClass, IslandGroup};
pub use crate::model::{
    Barangay, GeoDb, GeoItem, Geography, Municipality, Province, Region,
};
pub use crate::schema::{
    EntityKind, FieldDef, FieldValue, MigrationHistory, SchemaRegistry, Target,
};
pub use crate::text::NameMatch;
pub use crate::{FixtureConfig, FixtureLoader, GeoError, Result};
