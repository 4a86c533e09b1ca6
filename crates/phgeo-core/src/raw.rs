// crates/phgeo-core/src/raw.rs
//! Fixture rows as they appear on disk.
//!
//! Parents are referenced by code. Keys not listed here are kept in `extra`
//! and become values of runtime-added fields; the store rejects any the
//! applied schema does not declare.
#![cfg(feature = "json")]

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Columns shared by every fixture file.
#[derive(Debug, Default, Deserialize)]
pub struct GeoRaw {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RegionRaw {
    #[serde(flatten)]
    pub geo: GeoRaw,
    pub island_group: String,
}

#[derive(Debug, Deserialize)]
pub struct ProvinceRaw {
    #[serde(flatten)]
    pub geo: GeoRaw,
    /// Code of the owning region.
    pub region: String,
    #[serde(default)]
    pub income_class: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MunicipalityRaw {
    #[serde(flatten)]
    pub geo: GeoRaw,
    /// Code of the owning province.
    pub province: String,
    pub is_city: bool,
    pub is_capital: bool,
    #[serde(default)]
    pub city_class: Option<String>,
    #[serde(default)]
    pub income_class: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BarangayRaw {
    #[serde(flatten)]
    pub geo: GeoRaw,
    /// Code of the owning municipality.
    pub municipality: String,
    #[serde(default)]
    pub is_urban: Option<bool>,
}
