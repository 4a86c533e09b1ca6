// crates/phgeo-core/src/schema/mod.rs

//! # Declared Shapes
//!
//! Every record type has a first-class [`ModelDescriptor`]: an ordered list
//! of [`FieldDef`]s composed from the shared base template plus the type's
//! own fields. The [`SchemaRegistry`] owns the four descriptors and is the
//! only place shapes are mutated; [`migration`] turns two snapshots of it
//! into a numbered [`Migration`].

pub mod field;
pub mod migration;
pub mod registry;

pub use field::{FieldDef, FieldKind, FieldValue, OnDelete};
pub use migration::{autodetect, Migration, MigrationHistory, Operation, SchemaState};
pub use registry::{ModelDescriptor, RemovedField, SchemaRegistry, Target};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every table name.
pub const APP_LABEL: &str = "ph_geography";

/// The four concrete levels of the hierarchy, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Region,
    Province,
    Municipality,
    Barangay,
}

impl EntityKind {
    /// Dependency order: parents before children.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Region,
        EntityKind::Province,
        EntityKind::Municipality,
        EntityKind::Barangay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Region => "Region",
            EntityKind::Province => "Province",
            EntityKind::Municipality => "Municipality",
            EntityKind::Barangay => "Barangay",
        }
    }

    pub fn verbose_name_plural(self) -> &'static str {
        match self {
            EntityKind::Region => "Regions",
            EntityKind::Province => "Provinces",
            EntityKind::Municipality => "Municipalities",
            EntityKind::Barangay => "Barangays",
        }
    }

    /// Lowercase name used in table names and migration names.
    pub fn model_name(self) -> &'static str {
        match self {
            EntityKind::Region => "region",
            EntityKind::Province => "province",
            EntityKind::Municipality => "municipality",
            EntityKind::Barangay => "barangay",
        }
    }

    pub fn db_table(self) -> String {
        format!("{APP_LABEL}_{}", self.model_name())
    }

    /// The level directly above, if any.
    pub fn parent(self) -> Option<EntityKind> {
        match self {
            EntityKind::Region => None,
            EntityKind::Province => Some(EntityKind::Region),
            EntityKind::Municipality => Some(EntityKind::Province),
            EntityKind::Barangay => Some(EntityKind::Municipality),
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
