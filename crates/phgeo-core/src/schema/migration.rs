// crates/phgeo-core/src/schema/migration.rs

//! # Schema Derivation
//!
//! Mutating a [`SchemaRegistry`](super::SchemaRegistry) has no effect on
//! stored data by itself. Its effect becomes observable by diffing a
//! snapshot of the registry against the last known state:
//!
//! ```rust
//! use phgeo_core::schema::{EntityKind, FieldDef, MigrationHistory, Operation, SchemaRegistry};
//!
//! let mut registry = SchemaRegistry::new();
//! let mut history = MigrationHistory::new(&SchemaRegistry::new().state());
//!
//! registry
//!     .add_field(EntityKind::Barangay, FieldDef::boolean("specific").default(true))
//!     .unwrap();
//!
//! let migration = history.make_migration(&registry.state(), None).unwrap();
//! assert_eq!(migration.file_stem(), "0002_add_barangay_specific");
//! assert!(matches!(migration.operations[0], Operation::AddField { .. }));
//! ```

use super::field::FieldDef;
use super::registry::{reverse_name, ModelDescriptor};
use super::EntityKind;
use serde::{Deserialize, Serialize};

/// Frozen copy of every declared shape at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaState {
    models: Vec<ModelDescriptor>,
}

impl SchemaState {
    pub fn new(mut models: Vec<ModelDescriptor>) -> Self {
        models.sort_by_key(|m| m.kind);
        Self { models }
    }

    pub fn empty() -> Self {
        Self { models: Vec::new() }
    }

    pub fn model(&self, kind: EntityKind) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.kind == kind)
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// See [`SchemaRegistry::field_names`](super::SchemaRegistry::field_names).
    pub fn field_names(&self, kind: EntityKind) -> Vec<String> {
        let Some(model) = self.model(kind) else {
            return Vec::new();
        };
        let mut names: Vec<String> = model.field_names().map(str::to_owned).collect();
        names.push("id".to_owned());
        for other in &self.models {
            names.extend(
                other
                    .fields
                    .iter()
                    .filter_map(|f| reverse_name(f, kind))
                    .map(str::to_owned),
            );
        }
        names.sort();
        names.dedup();
        names
    }

    fn model_mut(&mut self, kind: EntityKind) -> Option<&mut ModelDescriptor> {
        self.models.iter_mut().find(|m| m.kind == kind)
    }
}

/// One step of a migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CreateModel {
        model: ModelDescriptor,
    },
    DeleteModel {
        model: EntityKind,
        db_table: String,
    },
    AddField {
        model: EntityKind,
        db_table: String,
        field: FieldDef,
    },
    RemoveField {
        model: EntityKind,
        db_table: String,
        field: FieldDef,
    },
    AlterField {
        model: EntityKind,
        db_table: String,
        field: FieldDef,
    },
}

impl Operation {
    pub fn model(&self) -> EntityKind {
        match self {
            Operation::CreateModel { model } => model.kind,
            Operation::DeleteModel { model, .. }
            | Operation::AddField { model, .. }
            | Operation::RemoveField { model, .. }
            | Operation::AlterField { model, .. } => *model,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Operation::CreateModel { model } => format!("Create model {}", model.kind),
            Operation::DeleteModel { model, .. } => format!("Delete model {model}"),
            Operation::AddField { model, field, .. } => {
                format!("Add field {} to {}", field.name, model.model_name())
            }
            Operation::RemoveField { model, field, .. } => {
                format!("Remove field {} from {}", field.name, model.model_name())
            }
            Operation::AlterField { model, field, .. } => {
                format!("Alter field {} on {}", field.name, model.model_name())
            }
        }
    }

    fn name_fragment(&self) -> String {
        match self {
            Operation::CreateModel { model } => model.kind.model_name().to_owned(),
            Operation::DeleteModel { model, .. } => format!("delete_{}", model.model_name()),
            Operation::AddField { model, field, .. } => {
                format!("add_{}_{}", model.model_name(), field.name)
            }
            Operation::RemoveField { model, field, .. } => {
                format!("remove_{}_{}", model.model_name(), field.name)
            }
            Operation::AlterField { model, field, .. } => {
                format!("alter_{}_{}", model.model_name(), field.name)
            }
        }
    }

    /// Applies this operation to an in-memory state.
    pub fn state_forwards(&self, state: &mut SchemaState) {
        match self {
            Operation::CreateModel { model } => {
                state.models.retain(|m| m.kind != model.kind);
                state.models.push(model.clone());
                state.models.sort_by_key(|m| m.kind);
            }
            Operation::DeleteModel { model, .. } => state.models.retain(|m| m.kind != *model),
            Operation::AddField { model, field, .. } => {
                if let Some(m) = state.model_mut(*model) {
                    m.fields.push(field.clone());
                }
            }
            Operation::RemoveField { model, field, .. } => {
                if let Some(m) = state.model_mut(*model) {
                    m.fields.retain(|f| f.name != field.name);
                }
            }
            Operation::AlterField { model, field, .. } => {
                if let Some(existing) = state
                    .model_mut(*model)
                    .and_then(|m| m.fields.iter_mut().find(|f| f.name == field.name))
                {
                    *existing = field.clone();
                }
            }
        }
    }

    /// DDL statements for this operation.
    pub fn sql(&self) -> Vec<String> {
        match self {
            Operation::CreateModel { model } => {
                let mut columns =
                    vec!["\"id\" integer NOT NULL PRIMARY KEY AUTOINCREMENT".to_owned()];
                columns.extend(model.fields.iter().map(FieldDef::column_sql));
                vec![format!(
                    "CREATE TABLE \"{}\" ({});",
                    model.db_table,
                    columns.join(", ")
                )]
            }
            Operation::DeleteModel { db_table, .. } => vec![format!("DROP TABLE \"{db_table}\";")],
            Operation::AddField {
                db_table, field, ..
            } => vec![format!(
                "ALTER TABLE \"{db_table}\" ADD COLUMN {};",
                field.column_sql()
            )],
            Operation::RemoveField {
                db_table, field, ..
            } => vec![format!(
                "ALTER TABLE \"{db_table}\" DROP COLUMN \"{}\";",
                field.column()
            )],
            Operation::AlterField {
                db_table, field, ..
            } => {
                let column = field.column();
                let null = if field.null { "DROP" } else { "SET" };
                vec![
                    format!(
                        "ALTER TABLE \"{db_table}\" ALTER COLUMN \"{column}\" TYPE {};",
                        field.sql_type()
                    ),
                    format!("ALTER TABLE \"{db_table}\" ALTER COLUMN \"{column}\" {null} NOT NULL;"),
                ]
            }
        }
    }
}

/// Operations turning `from` into `to`, model by model in hierarchy order.
pub fn autodetect(from: &SchemaState, to: &SchemaState) -> Vec<Operation> {
    let mut ops = Vec::new();

    for kind in EntityKind::ALL {
        match (from.model(kind), to.model(kind)) {
            (None, Some(new)) => ops.push(Operation::CreateModel { model: new.clone() }),
            (Some(old), Some(new)) => diff_fields(old, new, &mut ops),
            _ => {}
        }
    }

    // Children are dropped before their parents.
    for kind in EntityKind::ALL.into_iter().rev() {
        if let (Some(old), None) = (from.model(kind), to.model(kind)) {
            ops.push(Operation::DeleteModel {
                model: kind,
                db_table: old.db_table.clone(),
            });
        }
    }

    ops
}

fn diff_fields(old: &ModelDescriptor, new: &ModelDescriptor, ops: &mut Vec<Operation>) {
    let kind = new.kind;
    for field in old.fields.iter().filter(|f| !new.has_field(&f.name)) {
        ops.push(Operation::RemoveField {
            model: kind,
            db_table: old.db_table.clone(),
            field: field.clone(),
        });
    }
    for field in &new.fields {
        match old.field(&field.name) {
            None => ops.push(Operation::AddField {
                model: kind,
                db_table: new.db_table.clone(),
                field: field.clone(),
            }),
            Some(prev) if prev != field => ops.push(Operation::AlterField {
                model: kind,
                db_table: new.db_table.clone(),
                field: field.clone(),
            }),
            Some(_) => {}
        }
    }
}

/// A numbered, named list of operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub number: u32,
    pub name: String,
    pub operations: Vec<Operation>,
}

impl Migration {
    /// `0001_initial`, `0002_monkey_patching`, ...
    pub fn file_stem(&self) -> String {
        format!("{:04}_{}", self.number, self.name)
    }

    pub fn sql(&self) -> Vec<String> {
        self.operations.iter().flat_map(Operation::sql).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Ordered record of the migrations made so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationHistory {
    migrations: Vec<Migration>,
}

impl MigrationHistory {
    /// Starts a history whose `0001_initial` creates every model of `initial`.
    pub fn new(initial: &SchemaState) -> Self {
        let migration = Migration {
            number: 1,
            name: "initial".to_owned(),
            operations: autodetect(&SchemaState::empty(), initial),
        };
        Self {
            migrations: vec![migration],
        }
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    pub fn latest(&self) -> Option<&Migration> {
        self.migrations.last()
    }

    /// The state reached by replaying every migration.
    pub fn state(&self) -> SchemaState {
        let mut state = SchemaState::empty();
        for op in self.migrations.iter().flat_map(|m| &m.operations) {
            op.state_forwards(&mut state);
        }
        state
    }

    /// Records the changes needed to reach `target`, if there are any.
    ///
    /// Without an explicit `name`, one is derived from the operations.
    pub fn make_migration(&mut self, target: &SchemaState, name: Option<&str>) -> Option<&Migration> {
        let operations = autodetect(&self.state(), target);
        if operations.is_empty() {
            tracing::debug!("no schema changes detected");
            return None;
        }

        let name = match name {
            Some(n) => n.to_owned(),
            None if operations.len() == 1 => operations[0].name_fragment(),
            None => format!("{}_and_more", operations[0].name_fragment()),
        };
        let migration = Migration {
            number: self.migrations.len() as u32 + 1,
            name,
            operations,
        };
        tracing::info!(
            migration = %migration.file_stem(),
            operations = migration.operations.len(),
            "migration created"
        );
        self.migrations.push(migration);
        self.migrations.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaRegistry, Target};

    #[test]
    fn initial_creates_four_tables_in_order() {
        let history = MigrationHistory::new(&SchemaRegistry::new().state());
        let initial = history.latest().unwrap();
        assert_eq!(initial.file_stem(), "0001_initial");
        let kinds: Vec<_> = initial.operations.iter().map(Operation::model).collect();
        assert_eq!(kinds, EntityKind::ALL);
        assert!(initial.sql()[1].starts_with("CREATE TABLE \"ph_geography_province\""));
    }

    #[test]
    fn unchanged_registry_makes_nothing() {
        let reg = SchemaRegistry::new();
        let mut history = MigrationHistory::new(&reg.state());
        assert!(history.make_migration(&reg.state(), None).is_none());
        assert_eq!(history.migrations().len(), 1);
    }

    #[test]
    fn replayed_state_matches_registry() {
        let mut reg = SchemaRegistry::new();
        let mut history = MigrationHistory::new(&reg.state());
        reg.remove_field(Target::Base, &["population"]).unwrap();
        history.make_migration(&reg.state(), Some("drop_population"));
        assert_eq!(history.state(), reg.state());
        let m = history.latest().unwrap();
        assert_eq!(m.file_stem(), "0002_drop_population");
        assert_eq!(m.operations.len(), 4);
        assert_eq!(
            m.sql()[0],
            "ALTER TABLE \"ph_geography_region\" DROP COLUMN \"population\";"
        );
    }

    #[test]
    fn altered_default_is_detected() {
        let mut from = SchemaRegistry::new().state();
        let to = from.clone();
        from.model_mut(EntityKind::Region).unwrap().fields[3].default = Some(false.into());
        let ops = autodetect(&from, &to);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].describe(), "Alter field is_active on region");
    }

    #[test]
    fn deleted_models_drop_children_first() {
        let from = SchemaRegistry::new().state();
        let ops = autodetect(&from, &SchemaState::empty());
        let kinds: Vec<_> = ops.iter().map(Operation::model).collect();
        assert_eq!(
            kinds,
            [
                EntityKind::Barangay,
                EntityKind::Municipality,
                EntityKind::Province,
                EntityKind::Region
            ]
        );
    }
}
