use assert_matches::assert_matches;
use phgeo_core::prelude::*;
use phgeo_core::schema::{Migration, Operation};
use serde_json::json;

const ADDED_FIELD_SPECIFIC: &str = "specific";
const ADDED_FIELD_ALL: &str = "all";
const REMOVED_FIELD_SPECIFIC: &str = "is_urban";
const REMOVED_FIELD_ALL: &str = "population";
const MIGRATION_NAME: &str = "monkey_patching";

/// Applies the full set of mutations and returns the registry together with
/// the migration derived from them.
fn patched() -> (SchemaRegistry, Migration) {
    let mut registry = SchemaRegistry::new();
    let mut history = MigrationHistory::new(&registry.state());

    registry
        .add_field(
            EntityKind::Barangay,
            FieldDef::boolean(ADDED_FIELD_SPECIFIC).default(true),
        )
        .unwrap();
    registry
        .add_field(Target::Base, FieldDef::boolean(ADDED_FIELD_ALL).default(true))
        .unwrap();
    registry
        .remove_field(EntityKind::Barangay, &[REMOVED_FIELD_SPECIFIC])
        .unwrap();
    registry
        .remove_field(Target::Base, &[REMOVED_FIELD_ALL])
        .unwrap();
    registry.remove_field(EntityKind::Region, &["name"]).unwrap();
    registry.remove_field(EntityKind::Province, &["code"]).unwrap();
    registry
        .remove_field(EntityKind::Municipality, &["code", "name"])
        .unwrap();

    let migration = history
        .make_migration(&registry.state(), Some(MIGRATION_NAME))
        .expect("changes detected")
        .clone();
    (registry, migration)
}

/// A fresh store with the standard schema, migrated to the patched one.
fn migrated_db() -> GeoDb {
    let (_, migration) = patched();
    let mut db = GeoDb::default();
    db.migrate(&migration).unwrap();
    db
}

#[test]
fn migration_is_numbered_after_initial() {
    let (_, migration) = patched();
    assert_eq!(migration.file_stem(), "0002_monkey_patching");
}

#[test]
fn migration_holds_exactly_the_mutations() {
    let (_, migration) = patched();
    let mut added = Vec::new();
    let mut removed = Vec::new();
    for op in &migration.operations {
        match op {
            Operation::AddField { model, field, .. } => added.push((*model, field.name.clone())),
            Operation::RemoveField { model, field, .. } => {
                removed.push((*model, field.name.clone()))
            }
            other => panic!("unexpected operation: {}", other.describe()),
        }
    }
    assert_eq!(added.len(), 5);
    assert!(added.contains(&(EntityKind::Barangay, ADDED_FIELD_SPECIFIC.to_owned())));
    for kind in EntityKind::ALL {
        assert!(added.contains(&(kind, ADDED_FIELD_ALL.to_owned())));
        assert!(removed.contains(&(kind, REMOVED_FIELD_ALL.to_owned())));
    }
    assert!(removed.contains(&(EntityKind::Barangay, REMOVED_FIELD_SPECIFIC.to_owned())));
    assert!(removed.contains(&(EntityKind::Region, "name".to_owned())));
    assert!(removed.contains(&(EntityKind::Province, "code".to_owned())));
    assert!(removed.contains(&(EntityKind::Municipality, "code".to_owned())));
    assert!(removed.contains(&(EntityKind::Municipality, "name".to_owned())));
}

#[test]
fn add_field_specific_model_result() {
    let (registry, _) = patched();
    assert!(registry
        .descriptor(EntityKind::Barangay)
        .has_field(ADDED_FIELD_SPECIFIC));
    assert!(!registry
        .descriptor(EntityKind::Municipality)
        .has_field(ADDED_FIELD_SPECIFIC));
}

#[test]
fn add_field_all_models_result() {
    let (registry, _) = patched();
    for kind in EntityKind::ALL {
        assert!(registry.descriptor(kind).has_field(ADDED_FIELD_ALL), "{kind}");
    }
}

#[test]
fn remove_field_specific_model_result() {
    let (registry, _) = patched();
    assert!(!registry
        .descriptor(EntityKind::Barangay)
        .has_field(REMOVED_FIELD_SPECIFIC));
}

#[test]
fn remove_field_all_models_result() {
    let (registry, _) = patched();
    for kind in EntityKind::ALL {
        assert!(!registry.descriptor(kind).has_field(REMOVED_FIELD_ALL), "{kind}");
    }
}

#[test]
fn remove_field_params_not_str() {
    let mut registry = SchemaRegistry::new();
    assert_matches!(
        registry.remove_field_values(EntityKind::Barangay, &[json!("code"), json!(123)]),
        Err(GeoError::InvalidArgument(_))
    );
    assert_matches!(
        registry.remove_field_values(Target::Base, &[json!("code"), json!(123)]),
        Err(GeoError::InvalidArgument(_))
    );
    // Validation happens before anything is detached.
    assert!(registry.descriptor(EntityKind::Barangay).has_field("code"));
}

#[test]
fn remove_field_not_found() {
    let mut registry = SchemaRegistry::new();
    assert_matches!(
        registry.remove_field(EntityKind::Barangay, &["_"]),
        Err(GeoError::FieldNotFound { model: EntityKind::Barangay, .. })
    );
    assert_matches!(
        registry.remove_field(Target::Base, &["_"]),
        Err(GeoError::FieldNotFoundInAny { .. })
    );
}

#[test]
fn store_follows_the_registry_only_after_migrate() {
    let (registry, migration) = patched();
    let mut db = GeoDb::default();
    assert_ne!(db.schema(), &registry.state());
    db.migrate(&migration).unwrap();
    assert_eq!(db.schema(), &registry.state());
}

#[test]
fn new_records_reflect_added_defaults_and_removed_columns() {
    let mut db = migrated_db();
    let r = db
        .insert_region(Region::new("REGION", "", IslandGroup::Luzon))
        .unwrap();
    let p = db.insert_province(Province::new("", "PROVINCE", r)).unwrap();
    let m = db
        .insert_municipality(Municipality::new("", "", p, false, false))
        .unwrap();
    db.insert_barangay(Barangay::new("B1", "BARANGAY", m, Some(true)))
        .unwrap();

    let rows = db.rows(EntityKind::Barangay);
    let row = &rows[0];
    assert_eq!(row[ADDED_FIELD_SPECIFIC], FieldValue::Bool(true));
    assert_eq!(row[ADDED_FIELD_ALL], FieldValue::Bool(true));
    assert!(!row.contains_key(REMOVED_FIELD_SPECIFIC));
    assert!(!row.contains_key(REMOVED_FIELD_ALL));
}

#[test]
fn remove_field_name_str() {
    let mut db = migrated_db();
    let r = db
        .insert_region(Region::new("REGION", "", IslandGroup::Luzon))
        .unwrap();
    let region = db.region(r).unwrap();
    assert_eq!(region.to_string(), "Region object (1)");
}

#[test]
fn remove_field_code_repr() {
    let mut db = migrated_db();
    let r = db
        .insert_region(Region::new("REGION", "", IslandGroup::Luzon))
        .unwrap();
    let p = db.insert_province(Province::new("", "PROVINCE", r)).unwrap();
    assert_eq!(format!("{:?}", db.province(p).unwrap()), "<Province: PROVINCE>");
}

#[test]
fn remove_field_code_name_repr() {
    let mut db = migrated_db();
    let r = db
        .insert_region(Region::new("REGION", "", IslandGroup::Luzon))
        .unwrap();
    let p = db.insert_province(Province::new("", "PROVINCE", r)).unwrap();
    let m = db
        .insert_municipality(Municipality::new("", "", p, false, false))
        .unwrap();
    assert_eq!(
        format!("{:?}", db.municipality(m).unwrap()),
        "<Municipality: Municipality object (1)>"
    );
}

#[test]
fn migration_sql_touches_every_table() {
    let (_, migration) = patched();
    let sql = migration.sql().join("\n");
    for kind in EntityKind::ALL {
        assert!(sql.contains(&kind.db_table()), "{kind}");
    }
    assert!(sql.contains("\"all\" bool DEFAULT true NOT NULL"));
}
