// crates/phgeo-core/src/model/flat.rs
use super::records::{
    Barangay, BarangayId, Geography, Municipality, MunicipalityId, Province, ProvinceId, Region,
    RegionId, Row,
};
use crate::common::DeleteSummary;
use crate::error::{GeoError, IntegrityViolation, Result};
use crate::schema::{
    EntityKind, FieldKind, FieldValue, Migration, ModelDescriptor, Operation, SchemaRegistry,
    SchemaState,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One table of records keyed by primary key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Table<T> {
    rows: BTreeMap<u32, T>,
    next_id: u32,
    /// Rebuilt after deserialization, see [`GeoDb::reindex`].
    #[serde(skip)]
    by_code: HashMap<String, u32>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            by_code: HashMap::new(),
        }
    }
}

impl<T: Geography> Table<T> {
    pub(crate) fn get(&self, pk: u32) -> Option<&T> {
        self.rows.get(&pk)
    }

    pub(crate) fn contains(&self, pk: u32) -> bool {
        self.rows.contains_key(&pk)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Exact match only; foreign keys resolve through this.
    pub(crate) fn get_by_code(&self, code: &str) -> Option<&T> {
        self.by_code.get(code).and_then(|pk| self.rows.get(pk))
    }

    /// Exact match first, then ASCII case-insensitive.
    pub(crate) fn find_by_code(&self, code: &str) -> Option<&T> {
        if let Some(record) = self.get_by_code(code) {
            return Some(record);
        }
        self.rows
            .values()
            .find(|r| r.code().is_some_and(|c| c.eq_ignore_ascii_case(code)))
    }

    fn insert(&mut self, mut record: T) -> u32 {
        let pk = self.next_id;
        self.next_id += 1;
        record.set_pk(pk);
        if let Some(code) = record.code() {
            self.by_code.insert(code.to_owned(), pk);
        }
        self.rows.insert(pk, record);
        pk
    }

    fn remove(&mut self, pk: u32) -> Option<T> {
        let record = self.rows.remove(&pk)?;
        if let Some(code) = record.code() {
            self.by_code.remove(code);
        }
        Some(record)
    }

    fn children_of(&self, parent: u32) -> Vec<u32> {
        self.rows
            .values()
            .filter(|r| r.parent().is_some_and(|(_, p)| p == parent))
            .map(Geography::pk)
            .collect()
    }

    fn reindex(&mut self) {
        self.by_code = self
            .rows
            .values()
            .filter_map(|r| r.code().map(|c| (c.to_owned(), r.pk())))
            .collect();
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.by_code.clear();
    }
}

/// The record store: four flat tables plus the schema they currently
/// materialize.
///
/// The applied schema is independent of any [`SchemaRegistry`]. Mutating a
/// registry changes nothing here until the resulting [`Migration`] is passed
/// to [`GeoDb::migrate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoDb {
    schema: SchemaState,
    pub(crate) regions: Table<Region>,
    pub(crate) provinces: Table<Province>,
    pub(crate) municipalities: Table<Municipality>,
    pub(crate) barangays: Table<Barangay>,
}

impl Default for GeoDb {
    fn default() -> Self {
        Self::new(SchemaRegistry::standard().state())
    }
}

impl GeoDb {
    /// An empty store materializing `schema`.
    pub fn new(schema: SchemaState) -> Self {
        Self {
            schema,
            regions: Table::default(),
            provinces: Table::default(),
            municipalities: Table::default(),
            barangays: Table::default(),
        }
    }

    /// The schema the stored data currently follows.
    pub fn schema(&self) -> &SchemaState {
        &self.schema
    }

    fn shape(&self, kind: EntityKind) -> Result<&ModelDescriptor> {
        self.schema
            .model(kind)
            .ok_or_else(|| GeoError::NotFound(format!("no such table: {}", kind.db_table())))
    }

    // -----------------------------------------------------------------------
    // INSERT
    // -----------------------------------------------------------------------

    pub fn insert_region(&mut self, region: Region) -> Result<RegionId> {
        let shape = self.shape(EntityKind::Region)?;
        let region = prepare(shape, &self.regions, region)?;
        Ok(RegionId(self.regions.insert(region)))
    }

    pub fn insert_province(&mut self, province: Province) -> Result<ProvinceId> {
        let shape = self.shape(EntityKind::Province)?;
        check_parent(shape, &province, EntityKind::Region, &self.regions)?;
        let province = prepare(shape, &self.provinces, province)?;
        Ok(ProvinceId(self.provinces.insert(province)))
    }

    pub fn insert_municipality(&mut self, municipality: Municipality) -> Result<MunicipalityId> {
        let shape = self.shape(EntityKind::Municipality)?;
        check_parent(shape, &municipality, EntityKind::Province, &self.provinces)?;
        let municipality = prepare(shape, &self.municipalities, municipality)?;
        Ok(MunicipalityId(self.municipalities.insert(municipality)))
    }

    pub fn insert_barangay(&mut self, barangay: Barangay) -> Result<BarangayId> {
        let shape = self.shape(EntityKind::Barangay)?;
        check_parent(shape, &barangay, EntityKind::Municipality, &self.municipalities)?;
        let barangay = prepare(shape, &self.barangays, barangay)?;
        Ok(BarangayId(self.barangays.insert(barangay)))
    }

    // -----------------------------------------------------------------------
    // DELETE (cascading)
    // -----------------------------------------------------------------------

    pub fn delete_region(&mut self, id: RegionId) -> Result<DeleteSummary> {
        let mut summary = DeleteSummary::default();
        self.regions
            .remove(id.0)
            .ok_or_else(|| missing(EntityKind::Region, id.0))?;
        summary.regions += 1;
        for child in self.provinces.children_of(id.0) {
            summary += self.delete_province(ProvinceId(child))?;
        }
        tracing::debug!(region = %id, ?summary, "deleted region");
        Ok(summary)
    }

    pub fn delete_province(&mut self, id: ProvinceId) -> Result<DeleteSummary> {
        let mut summary = DeleteSummary::default();
        self.provinces
            .remove(id.0)
            .ok_or_else(|| missing(EntityKind::Province, id.0))?;
        summary.provinces += 1;
        for child in self.municipalities.children_of(id.0) {
            summary += self.delete_municipality(MunicipalityId(child))?;
        }
        Ok(summary)
    }

    pub fn delete_municipality(&mut self, id: MunicipalityId) -> Result<DeleteSummary> {
        let mut summary = DeleteSummary::default();
        self.municipalities
            .remove(id.0)
            .ok_or_else(|| missing(EntityKind::Municipality, id.0))?;
        summary.municipalities += 1;
        for child in self.barangays.children_of(id.0) {
            self.barangays.remove(child);
            summary.barangays += 1;
        }
        Ok(summary)
    }

    pub fn delete_barangay(&mut self, id: BarangayId) -> Result<DeleteSummary> {
        self.barangays
            .remove(id.0)
            .ok_or_else(|| missing(EntityKind::Barangay, id.0))?;
        Ok(DeleteSummary {
            barangays: 1,
            ..DeleteSummary::default()
        })
    }

    // -----------------------------------------------------------------------
    // SCHEMA
    // -----------------------------------------------------------------------

    /// Applies `migration` to the stored data and the applied schema.
    ///
    /// Removed columns are cleared on every record; added columns are set to
    /// their default (or null) on every record. Adding a non-null column
    /// without a default to a non-empty table is refused before anything
    /// changes. The migration runs against a copy of the store, so a failing
    /// operation leaves data and schema as they were.
    pub fn migrate(&mut self, migration: &Migration) -> Result<()> {
        for op in &migration.operations {
            if let Operation::AddField { model, field, .. } = op {
                if field.initial_value().is_none() && self.count(*model) > 0 {
                    return Err(GeoError::InvalidArgument(format!(
                        "cannot add non-nullable field '{}' without a default to {model}",
                        field.name
                    )));
                }
            }
        }

        let mut staged = self.clone();
        for op in &migration.operations {
            staged.apply(op).map_err(|e| {
                tracing::error!(migration = %migration.file_stem(), error = %e, "migration failed");
                e
            })?;
        }
        staged.reindex();
        *self = staged;
        tracing::info!(migration = %migration.file_stem(), "migration applied");
        Ok(())
    }

    fn apply(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::AddField { model, field, .. } => {
                // Whatever the record still holds under this name belongs to
                // a dropped column.
                if let Some(initial) = field.initial_value() {
                    self.for_each_record(*model, |r| r.assign(&field.name, &initial))?;
                }
            }
            Operation::RemoveField { model, field, .. } => {
                self.for_each_record(*model, |r| {
                    r.clear(&field.name);
                    Ok(())
                })?;
            }
            Operation::AlterField { model, field, .. } => {
                if !field.null {
                    if let Some(default) = &field.default {
                        self.for_each_record(*model, |r| r.fill(&field.name, default))?;
                    }
                }
            }
            Operation::DeleteModel { model, .. } => self.clear_table(*model),
            Operation::CreateModel { .. } => {}
        }
        op.state_forwards(&mut self.schema);
        Ok(())
    }

    /// Every record of `kind`, projected onto the applied schema.
    pub fn rows(&self, kind: EntityKind) -> Vec<Row> {
        let Some(shape) = self.schema.model(kind) else {
            return Vec::new();
        };
        match kind {
            EntityKind::Region => self.regions.iter().map(|r| r.to_row(shape)).collect(),
            EntityKind::Province => self.provinces.iter().map(|r| r.to_row(shape)).collect(),
            EntityKind::Municipality => {
                self.municipalities.iter().map(|r| r.to_row(shape)).collect()
            }
            EntityKind::Barangay => self.barangays.iter().map(|r| r.to_row(shape)).collect(),
        }
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Region => self.regions.len(),
            EntityKind::Province => self.provinces.len(),
            EntityKind::Municipality => self.municipalities.len(),
            EntityKind::Barangay => self.barangays.len(),
        }
    }

    /// Rebuilds the code indexes (they are not part of snapshots).
    pub(crate) fn reindex(&mut self) {
        self.regions.reindex();
        self.provinces.reindex();
        self.municipalities.reindex();
        self.barangays.reindex();
    }

    fn clear_table(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Region => self.regions.clear(),
            EntityKind::Province => self.provinces.clear(),
            EntityKind::Municipality => self.municipalities.clear(),
            EntityKind::Barangay => self.barangays.clear(),
        }
    }

    fn for_each_record<F>(&mut self, kind: EntityKind, mut f: F) -> Result<()>
    where
        F: FnMut(&mut dyn ColumnAccess) -> Result<()>,
    {
        match kind {
            EntityKind::Region => self.regions.rows.values_mut().try_for_each(|r| f(r)),
            EntityKind::Province => self.provinces.rows.values_mut().try_for_each(|r| f(r)),
            EntityKind::Municipality => {
                self.municipalities.rows.values_mut().try_for_each(|r| f(r))
            }
            EntityKind::Barangay => self.barangays.rows.values_mut().try_for_each(|r| f(r)),
        }
    }
}

/// Object-safe slice of [`Geography`] used by migrations.
trait ColumnAccess {
    /// Sets `field` to `value` where it is currently absent or null.
    fn fill(&mut self, field: &str, value: &FieldValue) -> Result<()>;
    fn assign(&mut self, field: &str, value: &FieldValue) -> Result<()>;
    fn clear(&mut self, field: &str);
}

impl<T: Geography> ColumnAccess for T {
    fn assign(&mut self, field: &str, value: &FieldValue) -> Result<()> {
        self.set_value(field, value.clone())
    }

    fn fill(&mut self, field: &str, value: &FieldValue) -> Result<()> {
        match self.value(field) {
            Some(v) if !v.is_null() => Ok(()),
            _ => self.set_value(field, value.clone()),
        }
    }

    fn clear(&mut self, field: &str) {
        self.clear_value(field);
    }
}

fn missing(kind: EntityKind, pk: u32) -> GeoError {
    GeoError::NotFound(format!("{kind} with id {pk}"))
}

/// Foreign-key check, applied only while the relation is declared.
fn check_parent<T: Geography, P: Geography>(
    shape: &ModelDescriptor,
    record: &T,
    target: EntityKind,
    parents: &Table<P>,
) -> Result<()> {
    let Some((field, parent)) = record.parent() else {
        return Ok(());
    };
    if shape.has_field(field) && !parents.contains(parent) {
        return Err(IntegrityViolation::MissingParent {
            model: T::KIND,
            field: field.to_owned(),
            target,
            reference: parent.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Conforms `record` to `shape` and checks every declared constraint.
fn prepare<T: Geography>(shape: &ModelDescriptor, table: &Table<T>, mut record: T) -> Result<T> {
    let kind = T::KIND;

    // Values of columns the shape no longer declares are dropped.
    for builtin in ["code", "name", "population", "is_active"] {
        if !shape.has_field(builtin) {
            record.clear_value(builtin);
        }
    }
    if let Some(key) = record.geo().extra.keys().find(|k| !shape.has_field(k)) {
        return Err(GeoError::InvalidData(format!("{kind} has no field named '{key}'")));
    }

    for field in &shape.fields {
        let mut value = record.value(&field.name).unwrap_or(FieldValue::Null);
        if value.is_null() {
            if let Some(initial) = field.initial_value() {
                record.set_value(&field.name, initial.clone())?;
                value = initial;
            }
        }

        if value.is_null() {
            if !field.null {
                return Err(IntegrityViolation::NotNull {
                    model: kind,
                    field: field.name.clone(),
                }
                .into());
            }
            continue;
        }

        match (&field.kind, &value) {
            (FieldKind::Char { max_length, choices }, FieldValue::Text(s)) => {
                if s.is_empty() {
                    if !field.blank {
                        return Err(IntegrityViolation::Blank {
                            model: kind,
                            field: field.name.clone(),
                        }
                        .into());
                    }
                } else if choices.is_some_and(|set| !set.contains(s)) {
                    return Err(IntegrityViolation::InvalidChoice {
                        model: kind,
                        field: field.name.clone(),
                        value: s.clone(),
                    }
                    .into());
                }
                let length = s.chars().count();
                if length > *max_length {
                    return Err(IntegrityViolation::TooLong {
                        model: kind,
                        field: field.name.clone(),
                        max_length: *max_length,
                        length,
                    }
                    .into());
                }
            }
            (FieldKind::PositiveInteger, FieldValue::Int(i)) if *i < 0 => {
                return Err(IntegrityViolation::Check {
                    model: kind,
                    field: field.name.clone(),
                }
                .into());
            }
            (FieldKind::PositiveInteger, FieldValue::Int(_))
            | (FieldKind::Boolean, FieldValue::Bool(_))
            | (FieldKind::ForeignKey { .. }, FieldValue::Int(_)) => {}
            (_, other) => {
                return Err(GeoError::InvalidData(format!(
                    "{kind}.{}: {other:?} does not fit a {:?} column",
                    field.name, field.kind
                )));
            }
        }

        if field.unique && is_taken(table, &field.name, &value) {
            return Err(IntegrityViolation::Duplicate {
                model: kind,
                field: field.name.clone(),
                value: value.to_string(),
            }
            .into());
        }
    }
    Ok(record)
}

fn is_taken<T: Geography>(table: &Table<T>, field: &str, value: &FieldValue) -> bool {
    match (field, value) {
        ("code", FieldValue::Text(code)) => table.by_code.contains_key(code.as_str()),
        _ => table
            .iter()
            .any(|r| r.value(field).as_ref() == Some(value)),
    }
}
