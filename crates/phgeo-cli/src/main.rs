//! phgeo: command-line interface for phgeo-core
//!
//! Loads the four fixture files (regions, provinces, municipalities,
//! barangays) and answers simple questions about them.
//!
//! Usage examples
//! --------------
//!
//! - Check that the fixtures load cleanly
//!   $ phgeo load
//!
//! - Show record counts
//!   $ phgeo stats
//!
//! - Find a record by code, at any level
//!   $ phgeo lookup 072217000
//!
//! - Search names, ignoring accents and case
//!   $ phgeo search "dona"
//!
//! Data source
//! -----------
//!
//! Without `--dir` (or `PHGEO_FIXTURE_DIR`) the fixtures bundled with
//! `phgeo-core` are used, through a binary snapshot cached next to them.
//! Logging goes to stderr and follows `RUST_LOG` (default `phgeo=info`).
mod args;

use crate::args::{CliArgs, Commands};
use anyhow::Context;
use clap::Parser;
use phgeo_core::model::GeoItem;
use phgeo_core::{FixtureConfig, GeoDb, SchemaRegistry};
use phgeo_core::schema::MigrationHistory;
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phgeo=info,phgeo_core=info".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match args.command {
        Commands::Load => {
            let config = fixture_config(args.dir.as_deref());
            let db = GeoDb::load_fixtures(&config)
                .with_context(|| format!("loading fixtures from {}", config.dir.display()))?;
            tracing::info!(stats = ?db.stats(), "fixtures loaded");
        }

        Commands::Stats => {
            let db = open_db(args.dir.as_deref())?;
            let stats = db.stats();
            println!("Database statistics:");
            println!("  Regions: {}", stats.regions);
            println!("  Provinces: {}", stats.provinces);
            println!("  Municipalities: {}", stats.municipalities);
            println!("  Barangays: {}", stats.barangays);
        }

        Commands::Lookup { code } => {
            let db = open_db(args.dir.as_deref())?;
            match db.lookup(&code) {
                Some(item) => print_item(&item),
                None => eprintln!("No record found for code: {code}"),
            }
        }

        Commands::Search { query } => {
            let db = open_db(args.dir.as_deref())?;
            let hits = db.search(&query);
            if hits.is_empty() {
                println!("No names found matching: {query}");
            }
            for hit in hits {
                println!("{:<12} {:?}", hit.kind().to_string(), hit);
            }
        }

        Commands::Migrations => {
            let history = MigrationHistory::new(&SchemaRegistry::standard().state());
            for migration in history.migrations() {
                println!("-- {}", migration.file_stem());
                for op in &migration.operations {
                    println!("-- {}", op.describe());
                }
                for statement in migration.sql() {
                    println!("{statement}");
                }
            }
        }

        Commands::Snapshot { out } => {
            let db = open_db(args.dir.as_deref())?;
            db.save_snapshot(&out)
                .with_context(|| format!("writing snapshot to {}", out.display()))?;
            println!("Snapshot written to {}", out.display());
        }
    }

    Ok(())
}

fn fixture_config(dir: Option<&Path>) -> FixtureConfig {
    dir.map(FixtureConfig::in_dir).unwrap_or_default()
}

/// Bundled fixtures go through the process-wide cache; a custom directory
/// is always loaded fresh.
fn open_db(dir: Option<&Path>) -> anyhow::Result<GeoDb> {
    let db = match dir {
        None => GeoDb::load()?,
        Some(dir) => GeoDb::load_fixtures(&FixtureConfig::in_dir(dir))?,
    };
    Ok(db)
}

fn print_item(item: &GeoItem<'_>) {
    println!("{}: {}", item.kind(), item);
    match item {
        GeoItem::Region(r) => {
            println!("  Island group: {}", r.island_group);
            println!("  Provinces: {}", r.provinces().len());
        }
        GeoItem::Province(p) => {
            print_ancestor("Region", p.region().map(|r| r.to_string()));
            println!("  Municipalities: {}", p.municipalities().len());
        }
        GeoItem::Municipality(m) => {
            print_ancestor("Province", m.province().map(|p| p.to_string()));
            print_ancestor("Region", m.region().map(|r| r.to_string()));
            println!("  City: {}", if m.is_city { "yes" } else { "no" });
            if let Some(class) = m.city_class {
                println!("  City class: {class}");
            }
            println!("  Barangays: {}", m.barangays().len());
        }
        GeoItem::Barangay(b) => {
            print_ancestor("Municipality", b.municipality().map(|m| m.to_string()));
            print_ancestor("Province", b.province().map(|p| p.to_string()));
            print_ancestor("Region", b.region().map(|r| r.to_string()));
            let urban = match b.is_urban {
                Some(true) => "urban",
                Some(false) => "rural",
                None => "no data",
            };
            println!("  Classification: {urban}");
        }
    }
    if let Some(population) = item_population(item) {
        println!("  Population: {population}");
    }
}

fn print_ancestor(label: &str, name: Option<String>) {
    println!("  {label}: {}", name.as_deref().unwrap_or("-"));
}

fn item_population(item: &GeoItem<'_>) -> Option<u32> {
    match item {
        GeoItem::Region(r) => r.geo.population,
        GeoItem::Province(p) => p.geo.population,
        GeoItem::Municipality(m) => m.geo.population,
        GeoItem::Barangay(b) => b.geo.population,
    }
}
