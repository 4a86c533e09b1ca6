// crates/phgeo-core/src/loader/mod.rs

//! # Fixture Loader
//!
//! Populates a [`GeoDb`] from the four fixture files, in dependency order:
//! regions, provinces, municipalities, barangays. Each later file references
//! its parents by code, so the order is not negotiable.
//!
//! The first failing step aborts the run. Its error comes back as
//! [`GeoError::LoadFailure`](crate::GeoError::LoadFailure) naming the fixture.
//! Each step is applied as a whole: the failing fixture leaves none of its rows
//! behind, while records inserted by earlier steps stay in the store.

use crate::error::Result;
use crate::model::GeoDb;
use std::path::{Path, PathBuf};

pub mod common_io;
mod snapshot;

#[cfg(feature = "json")]
use crate::common::LoadSummary;
#[cfg(feature = "json")]
use crate::model::convert;
#[cfg(feature = "json")]
use crate::raw::{BarangayRaw, MunicipalityRaw, ProvinceRaw, RegionRaw};
#[cfg(feature = "json")]
use once_cell::sync::OnceCell;
#[cfg(feature = "json")]
use serde::de::DeserializeOwned;

/// Environment variable overriding the fixture directory in the CLI.
pub const FIXTURE_DIR_ENV: &str = "PHGEO_FIXTURE_DIR";

/// File name of the snapshot cache kept next to the fixtures.
#[cfg(not(feature = "compact"))]
pub const SNAPSHOT_FILENAME: &str = "phgeo.snapshot.bin";
#[cfg(feature = "compact")]
pub const SNAPSHOT_FILENAME: &str = "phgeo.snapshot.bin.gz";

#[cfg(feature = "json")]
static GEO_DB_CACHE: OnceCell<GeoDb> = OnceCell::new();

/// Where the fixtures live and what they are called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureConfig {
    pub dir: PathBuf,
    pub regions: String,
    pub provinces: String,
    pub municipalities: String,
    pub barangays: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            dir: GeoDb::default_data_dir(),
            regions: "regions.json".into(),
            provinces: "provinces.json".into(),
            municipalities: "municipalities.json".into(),
            barangays: "barangays.json".into(),
        }
    }
}

impl FixtureConfig {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// The fixture files in load order.
    pub fn files(&self) -> [&str; 4] {
        [
            &self.regions,
            &self.provinces,
            &self.municipalities,
            &self.barangays,
        ]
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files().iter().map(|f| self.dir.join(f)).collect()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILENAME)
    }
}

/// Runs the fixture steps against a store.
#[derive(Debug, Clone, Default)]
pub struct FixtureLoader {
    config: FixtureConfig,
}

impl FixtureLoader {
    pub fn new(config: FixtureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Loads all four fixtures into `db`, stopping at the first failure.
    ///
    /// Each fixture is all-or-nothing: a failing step leaves none of its own
    /// rows behind, while the fixtures loaded before it stay.
    #[cfg(feature = "json")]
    pub fn load_all(&self, db: &mut GeoDb) -> Result<LoadSummary> {
        let c = &self.config;
        let mut summary = LoadSummary::default();

        let n = self.step(db, &c.regions, |db, raw: RegionRaw| {
            let record = convert::region(raw)?;
            db.insert_region(record).map(drop)
        })?;
        summary.steps.push((c.regions.clone(), n));

        let n = self.step(db, &c.provinces, |db, raw: ProvinceRaw| {
            let record = convert::province(db, raw)?;
            db.insert_province(record).map(drop)
        })?;
        summary.steps.push((c.provinces.clone(), n));

        let n = self.step(db, &c.municipalities, |db, raw: MunicipalityRaw| {
            let record = convert::municipality(db, raw)?;
            db.insert_municipality(record).map(drop)
        })?;
        summary.steps.push((c.municipalities.clone(), n));

        let n = self.step(db, &c.barangays, |db, raw: BarangayRaw| {
            let record = convert::barangay(db, raw)?;
            db.insert_barangay(record).map(drop)
        })?;
        summary.steps.push((c.barangays.clone(), n));

        tracing::info!(total = summary.total(), "all fixtures loaded");
        Ok(summary)
    }

    /// Reads one fixture and feeds every row to `insert` on a staged copy of
    /// `db`, which replaces `db` only once every row went in.
    #[cfg(feature = "json")]
    fn step<R, F>(&self, db: &mut GeoDb, fixture: &str, mut insert: F) -> Result<usize>
    where
        R: DeserializeOwned,
        F: FnMut(&mut GeoDb, R) -> Result<()>,
    {
        let path = self.config.dir.join(fixture);
        let mut staged = db.clone();
        let mut run = || -> Result<usize> {
            let reader = common_io::open_stream(&path)?;
            let rows: Vec<R> = serde_json::from_reader(reader)?;
            let count = rows.len();
            for row in rows {
                insert(&mut staged, row)?;
            }
            Ok(count)
        };
        match run() {
            Ok(count) => {
                *db = staged;
                tracing::info!(fixture, count, "installed fixture");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(fixture, error = %e, "fixture failed");
                Err(e.in_fixture(fixture))
            }
        }
    }
}

impl GeoDb {
    /// `data/` inside this crate.
    pub fn default_data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    /// The default fixtures, loaded once per process.
    ///
    /// Uses the snapshot cache next to the fixtures when it is newer than all
    /// of them, otherwise loads the fixtures and rewrites the cache (best
    /// effort).
    #[cfg(feature = "json")]
    pub fn load() -> Result<Self> {
        GEO_DB_CACHE
            .get_or_try_init(|| Self::load_cached(&FixtureConfig::default()))
            .cloned()
    }

    /// Loads the fixtures described by `config` into a fresh standard store.
    #[cfg(feature = "json")]
    pub fn load_fixtures(config: &FixtureConfig) -> Result<Self> {
        let mut db = GeoDb::default();
        FixtureLoader::new(config.clone()).load_all(&mut db)?;
        Ok(db)
    }

    #[cfg(feature = "json")]
    fn load_cached(config: &FixtureConfig) -> Result<Self> {
        let cache = config.snapshot_path();
        if common_io::is_cache_fresh(&cache, &config.paths()) {
            match Self::load_snapshot(&cache) {
                Ok(db) => return Ok(db),
                Err(e) => tracing::warn!(error = %e, "ignoring unreadable snapshot cache"),
            }
        }

        let db = Self::load_fixtures(config)?;
        if let Err(e) = db.save_snapshot(&cache) {
            tracing::warn!(path = %cache.display(), error = %e, "could not write snapshot cache");
        }
        Ok(db)
    }

    /// Writes the store, applied schema included, to `path`.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        snapshot::save(self, path.as_ref())
    }

    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        snapshot::load(path.as_ref())
    }
}
