// crates/phgeo-core/src/model/convert.rs
//! Raw fixture rows -> records, resolving parent codes against the store.
//! Parent codes must match exactly.
#![cfg(feature = "json")]

use super::flat::GeoDb;
use super::records::{
    Barangay, BarangayId, GeoFields, Geography, Municipality, MunicipalityId, Province, ProvinceId,
    Region, RegionId,
};
use crate::choices::{CityClass, IncomeClass, IslandGroup};
use crate::error::{GeoError, IntegrityViolation, Result};
use crate::raw::{BarangayRaw, GeoRaw, MunicipalityRaw, ProvinceRaw, RegionRaw};
use crate::schema::{EntityKind, FieldValue};

fn geo_fields(kind: EntityKind, raw: GeoRaw) -> Result<GeoFields> {
    let population = match raw.population {
        None => None,
        Some(n) if n < 0 => {
            return Err(IntegrityViolation::Check {
                model: kind,
                field: "population".to_owned(),
            }
            .into())
        }
        Some(n) => Some(u32::try_from(n).map_err(|_| {
            GeoError::InvalidData(format!("{kind}.population out of range: {n}"))
        })?),
    };

    let mut extra = std::collections::BTreeMap::new();
    for (key, value) in raw.extra {
        let value = FieldValue::from_json(&value).ok_or_else(|| {
            GeoError::InvalidData(format!("{kind}.{key}: only scalar values are supported"))
        })?;
        extra.insert(key, value);
    }

    Ok(GeoFields {
        code: raw.code,
        name: raw.name,
        population,
        is_active: raw.is_active,
        extra,
    })
}

/// Parses a classification code; blank and missing both mean "unset".
fn choice<T>(
    kind: EntityKind,
    field: &str,
    code: Option<&str>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match code.map(str::trim) {
        None | Some("") => Ok(None),
        Some(code) => parse(code).map(Some).ok_or_else(|| {
            IntegrityViolation::InvalidChoice {
                model: kind,
                field: field.to_owned(),
                value: code.to_owned(),
            }
            .into()
        }),
    }
}

fn missing_parent(kind: EntityKind, field: &str, target: EntityKind, code: &str) -> GeoError {
    IntegrityViolation::MissingParent {
        model: kind,
        field: field.to_owned(),
        target,
        reference: code.to_owned(),
    }
    .into()
}

pub(crate) fn region(raw: RegionRaw) -> Result<Region> {
    let kind = Region::KIND;
    let island_group = choice(
        kind,
        "island_group",
        Some(raw.island_group.as_str()),
        IslandGroup::from_code,
    )?
    .ok_or_else(|| IntegrityViolation::Blank {
        model: kind,
        field: "island_group".to_owned(),
    })?;
    Ok(Region {
        id: RegionId::default(),
        geo: geo_fields(kind, raw.geo)?,
        island_group,
    })
}

pub(crate) fn province(db: &GeoDb, raw: ProvinceRaw) -> Result<Province> {
    let kind = Province::KIND;
    let region = db
        .regions
        .get_by_code(&raw.region)
        .ok_or_else(|| missing_parent(kind, "region", EntityKind::Region, &raw.region))?;
    Ok(Province {
        id: ProvinceId::default(),
        region: region.id,
        income_class: choice(
            kind,
            "income_class",
            raw.income_class.as_deref(),
            IncomeClass::from_code,
        )?,
        geo: geo_fields(kind, raw.geo)?,
    })
}

pub(crate) fn municipality(db: &GeoDb, raw: MunicipalityRaw) -> Result<Municipality> {
    let kind = Municipality::KIND;
    let province = db.provinces.get_by_code(&raw.province).ok_or_else(|| {
        missing_parent(kind, "province", EntityKind::Province, &raw.province)
    })?;
    Ok(Municipality {
        id: MunicipalityId::default(),
        province: province.id,
        is_city: raw.is_city,
        is_capital: raw.is_capital,
        city_class: choice(kind, "city_class", raw.city_class.as_deref(), CityClass::from_code)?,
        income_class: choice(
            kind,
            "income_class",
            raw.income_class.as_deref(),
            IncomeClass::from_code,
        )?,
        geo: geo_fields(kind, raw.geo)?,
    })
}

pub(crate) fn barangay(db: &GeoDb, raw: BarangayRaw) -> Result<Barangay> {
    let kind = Barangay::KIND;
    let municipality = db.municipalities.get_by_code(&raw.municipality).ok_or_else(|| {
        missing_parent(
            kind,
            "municipality",
            EntityKind::Municipality,
            &raw.municipality,
        )
    })?;
    Ok(Barangay {
        id: BarangayId::default(),
        municipality: municipality.id,
        is_urban: raw.is_urban,
        geo: geo_fields(kind, raw.geo)?,
    })
}
