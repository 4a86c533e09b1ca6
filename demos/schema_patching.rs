//! Changing the declared shape at runtime
//!
//! This example demonstrates how to:
//! - Add and remove fields on one model or on all of them
//! - Derive a numbered migration from the changes
//! - Apply the migration to a store and see its effect on new records

use phgeo_core::prelude::*;

fn main() -> Result<()> {
    let mut registry = SchemaRegistry::new();
    let mut history = MigrationHistory::new(&registry.state());

    registry.add_field(EntityKind::Barangay, FieldDef::boolean("specific").default(true))?;
    registry.add_field(Target::Base, FieldDef::boolean("all").default(true))?;
    registry.remove_field(EntityKind::Barangay, &["is_urban"])?;
    registry.remove_field(Target::Base, &["population"])?;
    registry.remove_field(EntityKind::Province, &["code"])?;

    // Unknown names are reported, not ignored.
    if let Err(e) = registry.remove_field(Target::Base, &["_"]) {
        println!("expected failure: {e}");
    }

    let Some(migration) = history.make_migration(&registry.state(), Some("monkey_patching"))
    else {
        println!("nothing changed");
        return Ok(());
    };
    let migration = migration.clone();

    println!("\n-- {}", migration.file_stem());
    for statement in migration.sql() {
        println!("{statement}");
    }

    // The store only changes shape once the migration is applied.
    let mut db = GeoDb::default();
    db.migrate(&migration)?;

    let r = db.insert_region(Region::new("130000000", "NCR", IslandGroup::Luzon))?;
    let p = db.insert_province(Province::new("", "METRO MANILA", r))?;
    if let Some(province) = db.province(p) {
        println!("\n{province:?}");
    }
    println!("Barangay fields: {:?}", registry.field_names(EntityKind::Barangay));
    for row in db.rows(EntityKind::Region) {
        println!("Region row: {row:?}");
    }

    Ok(())
}
