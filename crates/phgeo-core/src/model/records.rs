// crates/phgeo-core/src/model/records.rs
use crate::choices::{CityClass, IncomeClass, IslandGroup};
use crate::error::{GeoError, Result};
use crate::schema::{EntityKind, FieldValue, ModelDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A record projected onto a declared shape, column name to value.
pub type Row = BTreeMap<String, FieldValue>;

macro_rules! record_id {
    ($($name:ident),*) => {
        $(
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(pub u32);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

record_id!(RegionId, ProvinceId, MunicipalityId, BarangayId);

/// Columns every level shares.
///
/// All of them are optional here because any of them may be removed from a
/// declared shape; whether a value is *required* is decided by the store
/// against its applied schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoFields {
    pub code: Option<String>,
    pub name: Option<String>,
    /// 2015 POPCEN count; `None` means no data.
    pub population: Option<u32>,
    pub is_active: Option<bool>,
    /// Values of fields added to the shape at runtime.
    #[serde(default)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl GeoFields {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: Some(code.to_owned()),
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }
}

/// A region, the top of the hierarchy.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub geo: GeoFields,
    pub island_group: IslandGroup,
}

/// A province, owned by one region.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub geo: GeoFields,
    pub region: RegionId,
    /// `None` means no data (stored blank).
    pub income_class: Option<IncomeClass>,
}

/// A municipality or city, owned by one province.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub id: MunicipalityId,
    pub geo: GeoFields,
    pub province: ProvinceId,
    pub is_city: bool,
    pub is_capital: bool,
    pub city_class: Option<CityClass>,
    pub income_class: Option<IncomeClass>,
}

/// A barangay, owned by one municipality.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barangay {
    pub id: BarangayId,
    pub geo: GeoFields,
    pub municipality: MunicipalityId,
    /// Urban (`true`), rural (`false`) or no data.
    pub is_urban: Option<bool>,
}

impl Region {
    /// An unsaved region; the store assigns the id.
    pub fn new(code: &str, name: &str, island_group: IslandGroup) -> Self {
        Self {
            id: RegionId::default(),
            geo: GeoFields::new(code, name),
            island_group,
        }
    }
}

impl Province {
    pub fn new(code: &str, name: &str, region: RegionId) -> Self {
        Self {
            id: ProvinceId::default(),
            geo: GeoFields::new(code, name),
            region,
            income_class: None,
        }
    }

    pub fn with_income_class(mut self, income_class: IncomeClass) -> Self {
        self.income_class = Some(income_class);
        self
    }
}

impl Municipality {
    pub fn new(code: &str, name: &str, province: ProvinceId, is_city: bool, is_capital: bool) -> Self {
        Self {
            id: MunicipalityId::default(),
            geo: GeoFields::new(code, name),
            province,
            is_city,
            is_capital,
            city_class: None,
            income_class: None,
        }
    }

    pub fn with_city_class(mut self, city_class: CityClass) -> Self {
        self.city_class = Some(city_class);
        self
    }

    pub fn with_income_class(mut self, income_class: IncomeClass) -> Self {
        self.income_class = Some(income_class);
        self
    }
}

impl Barangay {
    pub fn new(code: &str, name: &str, municipality: MunicipalityId, is_urban: Option<bool>) -> Self {
        Self {
            id: BarangayId::default(),
            geo: GeoFields::new(code, name),
            municipality,
            is_urban,
        }
    }
}

/// Behaviour shared by the four record types.
pub trait Geography {
    const KIND: EntityKind;

    /// Raw primary key; `0` for records the store has not saved yet.
    fn pk(&self) -> u32;
    fn set_pk(&mut self, pk: u32);
    fn geo(&self) -> &GeoFields;
    fn geo_mut(&mut self) -> &mut GeoFields;

    /// Value of one of the type's own columns, `None` if `field` is not one.
    fn own_value(&self, field: &str) -> Option<FieldValue>;

    /// Sets one of the type's own columns. `Ok(false)` if `field` is not one.
    fn set_own(&mut self, field: &str, value: &FieldValue) -> Result<bool>;

    /// Id of the owning record and the relation field naming it.
    fn parent(&self) -> Option<(&'static str, u32)> {
        None
    }

    fn code(&self) -> Option<&str> {
        self.geo().code.as_deref().filter(|s| !s.is_empty())
    }

    fn name(&self) -> Option<&str> {
        self.geo().name.as_deref().filter(|s| !s.is_empty())
    }

    /// Value of any column: shared, own or runtime-added.
    fn value(&self, field: &str) -> Option<FieldValue> {
        let geo = self.geo();
        match field {
            "id" => Some(self.pk().into()),
            "code" => Some(geo.code.clone().into()),
            "name" => Some(geo.name.clone().into()),
            "population" => Some(geo.population.into()),
            "is_active" => Some(geo.is_active.into()),
            _ => self
                .own_value(field)
                .or_else(|| geo.extra.get(field).cloned()),
        }
    }

    /// Sets any column; unknown names land in the runtime-added values.
    fn set_value(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let kind = Self::KIND;
        match field {
            "code" => self.geo_mut().code = opt_text(kind, field, &value)?,
            "name" => self.geo_mut().name = opt_text(kind, field, &value)?,
            "population" => {
                self.geo_mut().population = match opt_int(kind, field, &value)? {
                    None => None,
                    Some(n) => Some(u32::try_from(n).map_err(|_| {
                        GeoError::InvalidData(format!("{kind}.population out of range: {n}"))
                    })?),
                }
            }
            "is_active" => self.geo_mut().is_active = opt_bool(kind, field, &value)?,
            _ => {
                if !self.set_own(field, &value)? {
                    self.geo_mut().extra.insert(field.to_owned(), value);
                }
            }
        }
        Ok(())
    }

    /// Drops the value of a column that is no longer declared. Required own
    /// attributes stay in memory; they are simply no longer projected.
    fn clear_value(&mut self, field: &str) {
        match field {
            "code" | "name" | "population" | "is_active" => {
                // Null is accepted by every shared column.
                let _ = self.set_value(field, FieldValue::Null);
            }
            _ => {
                if self.geo_mut().extra.remove(field).is_none() {
                    let _ = self.set_own(field, &FieldValue::Null);
                }
            }
        }
    }

    /// Projects the record onto `shape`: `id` plus every declared field.
    fn to_row(&self, shape: &ModelDescriptor) -> Row {
        let mut row = Row::new();
        row.insert("id".to_owned(), self.pk().into());
        for field in &shape.fields {
            let value = self.value(&field.name).unwrap_or(FieldValue::Null);
            row.insert(field.name.clone(), value);
        }
        row
    }

    /// Generic form used when no name is available: `Region object (3)`.
    fn fallback_str(&self) -> String {
        format!("{} object ({})", Self::KIND, self.pk())
    }

    /// Developer representation, in three tiers:
    /// `<Code: NCR, Region: National Capital Region>` when both code and
    /// name are present, `<Region: National Capital Region>` when only the
    /// name is, and `<Region: Region object (1)>` otherwise.
    fn repr(&self) -> String {
        let model = Self::KIND;
        match (self.code(), self.name()) {
            (Some(code), Some(name)) => format!("<Code: {code}, {model}: {name}>"),
            (_, Some(name)) => format!("<{model}: {name}>"),
            _ => format!("<{model}: {}>", self.fallback_str()),
        }
    }
}

fn mismatch(kind: EntityKind, field: &str, expected: &str, value: &FieldValue) -> GeoError {
    GeoError::InvalidData(format!("{kind}.{field} expects {expected}, got {value:?}"))
}

fn opt_text(kind: EntityKind, field: &str, value: &FieldValue) -> Result<Option<String>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Text(s) => Ok(Some(s.clone())),
        other => Err(mismatch(kind, field, "text", other)),
    }
}

fn opt_int(kind: EntityKind, field: &str, value: &FieldValue) -> Result<Option<i64>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Int(i) => Ok(Some(*i)),
        other => Err(mismatch(kind, field, "an integer", other)),
    }
}

fn opt_bool(kind: EntityKind, field: &str, value: &FieldValue) -> Result<Option<bool>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Bool(b) => Ok(Some(*b)),
        other => Err(mismatch(kind, field, "a boolean", other)),
    }
}

/// Foreign keys are stored as `u32` primary keys.
fn fk_id(kind: EntityKind, field: &str, value: &FieldValue) -> Result<u32> {
    let id = required(kind, field, opt_int(kind, field, value)?)?;
    u32::try_from(id)
        .map_err(|_| GeoError::InvalidData(format!("{kind}.{field} out of range: {id}")))
}

fn required<T>(kind: EntityKind, field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| GeoError::InvalidData(format!("{kind}.{field} may not be null")))
}

/// Blank text is the stored form of "no classification".
fn opt_choice<T>(
    kind: EntityKind,
    field: &str,
    value: &FieldValue,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match opt_text(kind, field, value)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => parse(&s)
            .map(Some)
            .ok_or_else(|| GeoError::InvalidData(format!("{kind}.{field}: invalid choice '{s}'"))),
    }
}

fn choice_value(code: Option<&'static str>) -> FieldValue {
    FieldValue::Text(code.unwrap_or_default().to_owned())
}

impl Geography for Region {
    const KIND: EntityKind = EntityKind::Region;

    fn pk(&self) -> u32 {
        self.id.0
    }
    fn set_pk(&mut self, pk: u32) {
        self.id = RegionId(pk);
    }
    fn geo(&self) -> &GeoFields {
        &self.geo
    }
    fn geo_mut(&mut self) -> &mut GeoFields {
        &mut self.geo
    }

    fn own_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "island_group" => Some(self.island_group.code().into()),
            _ => None,
        }
    }

    fn set_own(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
        match field {
            "island_group" => {
                let group = opt_choice(Self::KIND, field, value, IslandGroup::from_code)?;
                self.island_group = required(Self::KIND, field, group)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl Geography for Province {
    const KIND: EntityKind = EntityKind::Province;

    fn pk(&self) -> u32 {
        self.id.0
    }
    fn set_pk(&mut self, pk: u32) {
        self.id = ProvinceId(pk);
    }
    fn geo(&self) -> &GeoFields {
        &self.geo
    }
    fn geo_mut(&mut self) -> &mut GeoFields {
        &mut self.geo
    }

    fn own_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "region" => Some(self.region.0.into()),
            "income_class" => Some(choice_value(self.income_class.map(IncomeClass::code))),
            _ => None,
        }
    }

    fn set_own(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
        match field {
            "region" => {
                self.region = RegionId(fk_id(Self::KIND, field, value)?);
            }
            "income_class" => {
                self.income_class = opt_choice(Self::KIND, field, value, IncomeClass::from_code)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn parent(&self) -> Option<(&'static str, u32)> {
        Some(("region", self.region.0))
    }
}

impl Geography for Municipality {
    const KIND: EntityKind = EntityKind::Municipality;

    fn pk(&self) -> u32 {
        self.id.0
    }
    fn set_pk(&mut self, pk: u32) {
        self.id = MunicipalityId(pk);
    }
    fn geo(&self) -> &GeoFields {
        &self.geo
    }
    fn geo_mut(&mut self) -> &mut GeoFields {
        &mut self.geo
    }

    fn own_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "province" => Some(self.province.0.into()),
            "is_city" => Some(self.is_city.into()),
            "is_capital" => Some(self.is_capital.into()),
            "city_class" => Some(choice_value(self.city_class.map(CityClass::code))),
            "income_class" => Some(choice_value(self.income_class.map(IncomeClass::code))),
            _ => None,
        }
    }

    fn set_own(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
        let kind = Self::KIND;
        match field {
            "province" => {
                self.province = ProvinceId(fk_id(kind, field, value)?);
            }
            "is_city" => self.is_city = required(kind, field, opt_bool(kind, field, value)?)?,
            "is_capital" => self.is_capital = required(kind, field, opt_bool(kind, field, value)?)?,
            "city_class" => {
                self.city_class = opt_choice(kind, field, value, CityClass::from_code)?;
            }
            "income_class" => {
                self.income_class = opt_choice(kind, field, value, IncomeClass::from_code)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn parent(&self) -> Option<(&'static str, u32)> {
        Some(("province", self.province.0))
    }
}

impl Geography for Barangay {
    const KIND: EntityKind = EntityKind::Barangay;

    fn pk(&self) -> u32 {
        self.id.0
    }
    fn set_pk(&mut self, pk: u32) {
        self.id = BarangayId(pk);
    }
    fn geo(&self) -> &GeoFields {
        &self.geo
    }
    fn geo_mut(&mut self) -> &mut GeoFields {
        &mut self.geo
    }

    fn own_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "municipality" => Some(self.municipality.0.into()),
            "is_urban" => Some(self.is_urban.into()),
            _ => None,
        }
    }

    fn set_own(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
        match field {
            "municipality" => {
                self.municipality = MunicipalityId(fk_id(Self::KIND, field, value)?);
            }
            "is_urban" => self.is_urban = opt_bool(Self::KIND, field, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn parent(&self) -> Option<(&'static str, u32)> {
        Some(("municipality", self.municipality.0))
    }
}

macro_rules! geo_fmt {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    match self.name() {
                        Some(name) => f.write_str(name),
                        None => f.write_str(&self.fallback_str()),
                    }
                }
            }

            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.repr())
                }
            }
        )*
    };
}

geo_fmt!(Region, Province, Municipality, Barangay);

#[cfg(test)]
mod tests {
    use super::*;

    fn ncr() -> Region {
        let mut r = Region::new("NCR", "National Capital Region", IslandGroup::Luzon);
        r.set_pk(1);
        r
    }

    #[test]
    fn repr_with_code_and_name() {
        assert_eq!(
            format!("{:?}", ncr()),
            "<Code: NCR, Region: National Capital Region>"
        );
    }

    #[test]
    fn repr_falls_back_to_name_only() {
        let mut r = ncr();
        r.geo.code = None;
        assert_eq!(r.repr(), "<Region: National Capital Region>");
    }

    #[test]
    fn repr_falls_back_to_type_only() {
        let mut r = ncr();
        r.geo.name = None;
        // A lone code is not enough for the first tier.
        assert_eq!(r.repr(), "<Region: Region object (1)>");
        assert_eq!(r.to_string(), "Region object (1)");
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let mut r = ncr();
        r.geo.name = Some(String::new());
        assert_eq!(r.to_string(), "Region object (1)");
    }

    #[test]
    fn set_value_routes_to_the_right_column() {
        let mut b = Barangay::new("B1", "Alicia", MunicipalityId(3), None);
        b.set_value("is_urban", true.into()).unwrap();
        b.set_value("population", 120u32.into()).unwrap();
        b.set_value("flag", true.into()).unwrap();
        assert_eq!(b.is_urban, Some(true));
        assert_eq!(b.geo.population, Some(120));
        assert_eq!(b.geo.extra.get("flag"), Some(&FieldValue::Bool(true)));
        assert!(b.set_value("population", FieldValue::Int(-1)).is_err());
        assert!(b.set_value("is_urban", "yes".into()).is_err());
    }

    #[test]
    fn blank_choice_reads_as_unset() {
        let mut m = Municipality::new("M1", "Bansalan", ProvinceId(1), false, false);
        m.set_value("city_class", "".into()).unwrap();
        assert_eq!(m.city_class, None);
        assert_eq!(m.value("city_class"), Some(FieldValue::Text(String::new())));
        m.set_value("city_class", "H".into()).unwrap();
        assert_eq!(m.city_class, Some(CityClass::HighlyUrbanizedCity));
    }

    #[test]
    fn required_own_columns_survive_clearing() {
        let mut m = Municipality::new("M1", "Bansalan", ProvinceId(1), true, false);
        m.clear_value("is_city");
        assert!(m.is_city);
        m.income_class = Some(IncomeClass::First);
        m.clear_value("income_class");
        assert_eq!(m.income_class, None);
    }

    #[test]
    fn foreign_keys_must_fit_a_primary_key() {
        let mut p = Province::new("P1", "Cebu", RegionId(1));
        assert_matches::assert_matches!(
            p.set_value("region", FieldValue::Int(4_294_967_297)),
            Err(GeoError::InvalidData(_))
        );
        assert!(p.set_value("region", FieldValue::Int(-1)).is_err());
        assert_eq!(p.region, RegionId(1));
        p.set_value("region", FieldValue::Int(7)).unwrap();
        assert_eq!(p.region, RegionId(7));
    }
}
