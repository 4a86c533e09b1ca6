//! Basic usage example for phgeo-rs
//!
//! This example demonstrates how to:
//! - Load the bundled fixtures (cached as a snapshot after the first run)
//! - Look records up by code
//! - Walk the hierarchy up and down
//! - Search names without caring about accents

use phgeo_core::prelude::*;

fn main() -> Result<()> {
    println!("=== phgeo-rs Basic Usage Example ===\n");

    let db = GeoDb::load()?;
    let stats = db.stats();
    println!(
        "Loaded {} regions, {} provinces, {} municipalities, {} barangays\n",
        stats.regions, stats.provinces, stats.municipalities, stats.barangays
    );

    println!("--- Example 1: Lookup by code ---");
    if let Some(item) = db.lookup("072217000") {
        println!("{} -> {item:?}", item.kind());
    }
    println!();

    println!("--- Example 2: Walk up from a barangay ---");
    if let Some(b) = db.find_barangay_by_code("137404056") {
        println!("Barangay:     {b}");
        if let Some(m) = b.municipality() {
            println!("Municipality: {m}");
        }
        if let Some(p) = b.province() {
            println!("Province:     {p}");
        }
        if let Some(r) = b.region() {
            println!("Region:       {r}");
        }
        if let Some(group) = b.island_group() {
            println!("Island group: {group}");
        }
    }
    println!();

    println!("--- Example 3: Walk down from every region ---");
    for region in db.regions() {
        println!("{region} ({})", region.island_group);
        for province in region.provinces() {
            println!("  {province}");
            for municipality in province.municipalities() {
                let kind = if municipality.is_city { "city" } else { "municipality" };
                println!(
                    "    {municipality} [{kind}, {} barangays]",
                    municipality.barangays().len()
                );
            }
        }
    }
    println!();

    println!("--- Example 4: Accent-insensitive search ---");
    for hit in db.search("dona") {
        println!("{}: {hit}", hit.kind());
    }

    Ok(())
}
