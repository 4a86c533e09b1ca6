use assert_matches::assert_matches;
use phgeo_core::prelude::*;
use phgeo_core::IntegrityViolation;
use std::fs;
use std::path::Path;

fn copy_bundled(to: &Path) {
    let config = FixtureConfig::default();
    for file in config.files() {
        fs::copy(config.dir.join(file), to.join(file)).unwrap();
    }
}

#[test]
fn bundled_fixtures_load_in_order() {
    let mut db = GeoDb::default();
    let summary = FixtureLoader::default().load_all(&mut db).unwrap();
    let files: Vec<_> = summary.steps.iter().map(|(f, _)| f.as_str()).collect();
    assert_eq!(
        files,
        ["regions.json", "provinces.json", "municipalities.json", "barangays.json"]
    );
    let stats = db.stats();
    assert_eq!(stats.regions, 3);
    assert_eq!(stats.provinces, 3);
    assert_eq!(stats.municipalities, 4);
    assert_eq!(stats.barangays, 6);
    assert_eq!(summary.total(), stats.total());
}

#[test]
fn barangays_without_their_municipalities_fail() {
    let dir = tempfile::tempdir().unwrap();
    copy_bundled(dir.path());
    fs::write(dir.path().join("municipalities.json"), "[]").unwrap();

    let mut db = GeoDb::default();
    let err = FixtureLoader::new(FixtureConfig::in_dir(dir.path()))
        .load_all(&mut db)
        .unwrap_err();
    assert_matches!(&err, GeoError::LoadFailure { fixture, .. } if fixture == "barangays.json");
    assert_matches!(
        err.integrity(),
        Some(IntegrityViolation::MissingParent { model: EntityKind::Barangay, .. })
    );
    assert_eq!(db.stats().barangays, 0);
}

#[test]
fn malformed_fixture_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    copy_bundled(dir.path());
    // A barangay file where regions are expected lacks `island_group`.
    let config = FixtureConfig {
        regions: "barangays.json".into(),
        ..FixtureConfig::in_dir(dir.path())
    };
    let err = GeoDb::load_fixtures(&config).unwrap_err();
    assert_matches!(
        err,
        GeoError::LoadFailure { fixture, source } if fixture == "barangays.json"
            && matches!(*source, GeoError::Json(_))
    );
}

#[test]
fn unknown_parent_code_reports_missing_parent() {
    let dir = tempfile::tempdir().unwrap();
    copy_bundled(dir.path());
    fs::write(
        dir.path().join("municipalities.json"),
        r#"[{"code": "999999000", "name": "NOWHERE", "province": "999900000",
             "is_city": false, "is_capital": false}]"#,
    )
    .unwrap();
    let mut db = GeoDb::default();
    let err = FixtureLoader::new(FixtureConfig::in_dir(dir.path()))
        .load_all(&mut db)
        .unwrap_err();
    assert_matches!(
        err.integrity(),
        Some(IntegrityViolation::MissingParent { target: EntityKind::Province, reference, .. })
            if reference == "999900000"
    );
    // Earlier steps stay applied.
    assert_eq!(db.stats().provinces, 3);
    assert_eq!(db.stats().municipalities, 0);
}

#[test]
fn duplicate_code_stops_the_step() {
    let dir = tempfile::tempdir().unwrap();
    copy_bundled(dir.path());
    fs::write(
        dir.path().join("regions.json"),
        r#"[{"code": "130000000", "name": "A", "island_group": "L"},
            {"code": "130000000", "name": "B", "island_group": "L"}]"#,
    )
    .unwrap();
    let err = GeoDb::load_fixtures(&FixtureConfig::in_dir(dir.path())).unwrap_err();
    assert_matches!(
        err.integrity(),
        Some(IntegrityViolation::Duplicate { model: EntityKind::Region, .. })
    );
}

#[test]
fn extra_keys_fill_runtime_fields() {
    let dir = tempfile::tempdir().unwrap();
    copy_bundled(dir.path());
    fs::write(
        dir.path().join("regions.json"),
        r#"[{"code": "130000000", "name": "NCR", "island_group": "L", "nickname": "Metro"}]"#,
    )
    .unwrap();
    fs::write(dir.path().join("provinces.json"), "[]").unwrap();
    fs::write(dir.path().join("municipalities.json"), "[]").unwrap();
    fs::write(dir.path().join("barangays.json"), "[]").unwrap();

    let mut registry = SchemaRegistry::new();
    let mut history = MigrationHistory::new(&registry.state());
    registry
        .add_field(EntityKind::Region, FieldDef::char("nickname", 20).blank().default(""))
        .unwrap();
    let migration = history.make_migration(&registry.state(), None).unwrap().clone();
    assert_eq!(migration.file_stem(), "0002_add_region_nickname");

    let mut db = GeoDb::default();
    db.migrate(&migration).unwrap();
    FixtureLoader::new(FixtureConfig::in_dir(dir.path()))
        .load_all(&mut db)
        .unwrap();
    let region = db.find_region_by_code("130000000").unwrap();
    assert_eq!(region.value("nickname"), Some(FieldValue::from("Metro")));
}

#[cfg(feature = "compact")]
#[test]
fn gzipped_fixtures_are_read() {
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    copy_bundled(dir.path());
    let json = fs::read(dir.path().join("barangays.json")).unwrap();
    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(&json).unwrap();
    fs::write(dir.path().join("barangays.json.gz"), gz.finish().unwrap()).unwrap();

    let config = FixtureConfig {
        barangays: "barangays.json.gz".into(),
        ..FixtureConfig::in_dir(dir.path())
    };
    let db = GeoDb::load_fixtures(&config).unwrap();
    assert_eq!(db.stats().barangays, 6);
}

#[test]
fn snapshot_preserves_stats_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phgeo.bin");
    let db = GeoDb::load_fixtures(&FixtureConfig::default()).unwrap();
    db.save_snapshot(&path).unwrap();

    let back = GeoDb::load_snapshot(&path).unwrap();
    assert_eq!(back.stats(), db.stats());
    assert_eq!(back.schema(), db.schema());
    let barangay = back.find_barangay_by_code("137404056").unwrap();
    assert_eq!(barangay.region().unwrap().to_string(), "NATIONAL CAPITAL REGION (NCR)");
}

#[test]
fn search_ignores_accents() {
    let db = GeoDb::load_fixtures(&FixtureConfig::default()).unwrap();
    let hits = db.search("dona imelda");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind(), EntityKind::Barangay);
    assert_eq!(hits[0].label(), "DOÑA IMELDA");
}
