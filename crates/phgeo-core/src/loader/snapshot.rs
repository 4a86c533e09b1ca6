// crates/phgeo-core/src/loader/snapshot.rs
use super::common_io;
use crate::error::{GeoError, Result};
use crate::model::GeoDb;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bumped whenever the serialized layout of [`GeoDb`] changes.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    db: GeoDb,
}

pub(super) fn save(db: &GeoDb, path: &Path) -> Result<()> {
    #[derive(Serialize)]
    struct SnapshotRef<'a> {
        version: u32,
        db: &'a GeoDb,
    }

    common_io::write_bincode(
        path,
        &SnapshotRef {
            version: SNAPSHOT_VERSION,
            db,
        },
    )?;
    tracing::info!(path = %path.display(), stats = ?db.stats(), "snapshot written");
    Ok(())
}

pub(super) fn load(path: &Path) -> Result<GeoDb> {
    let snapshot: Snapshot = common_io::read_bincode(path)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(GeoError::InvalidData(format!(
            "snapshot {} has version {}, expected {SNAPSHOT_VERSION}",
            path.display(),
            snapshot.version
        )));
    }
    let mut db = snapshot.db;
    db.reindex();
    tracing::debug!(path = %path.display(), "snapshot loaded");
    Ok(db)
}
