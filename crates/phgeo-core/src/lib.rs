// crates/phgeo-core/src/lib.rs
//! Philippine geographic hierarchy: regions, provinces, municipalities and
//! barangays, with a runtime-mutable declared schema and a fixture loader.
//!
//! ```rust
//! use phgeo_core::prelude::*;
//!
//! let mut db = GeoDb::default();
//! let ncr = db.insert_region(Region::new("130000000", "NCR", IslandGroup::Luzon))?;
//! let mm = db.insert_province(Province::new("137400000", "METRO MANILA", ncr))?;
//! let qc = db.insert_municipality(Municipality::new("137404000", "QUEZON CITY", mm, true, false))?;
//! let b = db.insert_barangay(Barangay::new("137404001", "ALICIA", qc, Some(true)))?;
//!
//! let alicia = db.barangay(b).unwrap();
//! assert_eq!(alicia.island_group(), Some(IslandGroup::Luzon));
//! assert_eq!(format!("{alicia:?}"), "<Code: 137404001, Barangay: ALICIA>");
//! # Ok::<(), phgeo_core::GeoError>(())
//! ```

pub mod choices;
pub mod common;
pub mod error;
pub mod loader;
pub mod model;
pub mod prelude;
pub mod schema;
pub mod text;
// Fixture rows as read from disk
#[doc(hidden)]
pub mod raw;

// Re-exports
pub use crate::common::{DbStats, DeleteSummary, LoadSummary};
pub use crate::error::{GeoError, IntegrityViolation, Result};
pub use crate::loader::{FixtureConfig, FixtureLoader};
pub use crate::schema::{EntityKind, SchemaRegistry};
pub use model::*;
