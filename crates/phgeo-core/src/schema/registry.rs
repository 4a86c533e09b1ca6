// crates/phgeo-core/src/schema/registry.rs
use super::field::{validate_name, FieldDef, FieldKind};
use super::migration::SchemaState;
use super::EntityKind;
use crate::choices::ChoiceSet;
use crate::error::{GeoError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static STANDARD: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// The declared shape of one concrete model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub kind: EntityKind,
    pub db_table: String,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    /// Own declared fields, in declaration order. The implicit `id` primary
    /// key and reverse relations are not part of this list.
    pub fields: Vec<FieldDef>,
}

impl ModelDescriptor {
    fn compose(kind: EntityKind, base: &[FieldDef], own: Vec<FieldDef>) -> Self {
        let mut fields = base.to_vec();
        fields.extend(own);
        Self {
            kind,
            db_table: kind.db_table(),
            verbose_name: kind.name().to_owned(),
            verbose_name_plural: kind.verbose_name_plural().to_owned(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Detaches `name` from the own field list.
    fn detach(&mut self, name: &str) -> Option<FieldDef> {
        let pos = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(pos))
    }
}

/// Which declared shape a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The shared base template, and through it every concrete model.
    Base,
    Model(EntityKind),
}

impl From<EntityKind> for Target {
    fn from(kind: EntityKind) -> Self {
        Target::Model(kind)
    }
}

/// A field detached by [`SchemaRegistry::remove_field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedField {
    pub model: EntityKind,
    pub field: FieldDef,
}

/// Owner of the base template and the four concrete descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    base: Vec<FieldDef>,
    models: Vec<ModelDescriptor>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Builds the standard shapes.
    pub fn new() -> Self {
        let base = base_template();
        let models = EntityKind::ALL
            .into_iter()
            .map(|kind| ModelDescriptor::compose(kind, &base, own_fields(kind)))
            .collect();
        Self { base, models }
    }

    /// The pristine standard registry, shared process-wide and never mutated.
    pub fn standard() -> &'static SchemaRegistry {
        &STANDARD
    }

    pub fn base_fields(&self) -> &[FieldDef] {
        &self.base
    }

    pub fn descriptor(&self, kind: EntityKind) -> &ModelDescriptor {
        &self.models[kind.index()]
    }

    pub fn descriptors(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Snapshot of the current declared shapes.
    pub fn state(&self) -> SchemaState {
        SchemaState::new(self.models.clone())
    }

    /// Sorted names of every field of `kind`: declared fields, the implicit
    /// `id`, and the query names of relations pointing at it.
    pub fn field_names(&self, kind: EntityKind) -> Vec<String> {
        self.state().field_names(kind)
    }

    /// Adds `field` to one model, or to the template and every model.
    ///
    /// Fails without changing anything if a targeted model already declares
    /// a field with the same name.
    pub fn add_field(&mut self, target: impl Into<Target>, field: FieldDef) -> Result<()> {
        validate_name(&field.name)?;
        if field.name == "id" {
            return Err(GeoError::InvalidArgument(
                "'id' is reserved for the primary key".into(),
            ));
        }

        let kinds = self.targets(target.into());
        if let Some(clash) = kinds.iter().find(|k| self.descriptor(**k).has_field(&field.name)) {
            return Err(GeoError::InvalidArgument(format!(
                "{clash} already declares a field named '{}'",
                field.name
            )));
        }

        if kinds.len() == EntityKind::ALL.len() {
            self.base.push(field.clone());
        }
        for kind in kinds {
            tracing::debug!(model = %kind, field = %field.name, "adding field");
            self.models[kind.index()].fields.push(field.clone());
        }
        Ok(())
    }

    /// Removes the named fields from one model, or from every model through
    /// the base template.
    ///
    /// A concrete target fails with [`GeoError::FieldNotFound`] only when none
    /// of `names` is declared on it. The base target tries every model
    /// independently and fails with [`GeoError::FieldNotFoundInAny`] only when
    /// no model lost anything.
    pub fn remove_field(
        &mut self,
        target: impl Into<Target>,
        names: &[&str],
    ) -> Result<Vec<RemovedField>> {
        if names.is_empty() {
            return Err(GeoError::InvalidArgument(
                "remove_field needs at least one field name".into(),
            ));
        }
        for name in names {
            validate_name(name)?;
        }

        match target.into() {
            Target::Model(kind) => self.remove_from_model(kind, names),
            Target::Base => {
                let mut removed = Vec::new();
                for kind in EntityKind::ALL {
                    // A model without any of the names is not an error here.
                    if let Ok(mut r) = self.remove_from_model(kind, names) {
                        removed.append(&mut r);
                    }
                }
                if removed.is_empty() {
                    return Err(GeoError::FieldNotFoundInAny {
                        names: names.join(", "),
                    });
                }
                self.base.retain(|f| !names.contains(&f.name.as_str()));
                Ok(removed)
            }
        }
    }

    /// Dynamic entry point for callers holding untyped arguments (CLI input,
    /// config files). Every argument must be a JSON string; anything else is
    /// rejected before a single field is touched.
    #[cfg(feature = "json")]
    pub fn remove_field_values(
        &mut self,
        target: impl Into<Target>,
        names: &[serde_json::Value],
    ) -> Result<Vec<RemovedField>> {
        let mut strs = Vec::with_capacity(names.len());
        for value in names {
            match value.as_str() {
                Some(s) => strs.push(s),
                None => {
                    return Err(GeoError::InvalidArgument(format!(
                        "remove_field only supports string field names, got {value}"
                    )))
                }
            }
        }
        self.remove_field(target, &strs)
    }

    fn remove_from_model(&mut self, kind: EntityKind, names: &[&str]) -> Result<Vec<RemovedField>> {
        let model = &mut self.models[kind.index()];
        let removed: Vec<RemovedField> = names
            .iter()
            .filter_map(|name| model.detach(name))
            .map(|field| {
                tracing::debug!(model = %kind, field = %field.name, "removed field");
                RemovedField { model: kind, field }
            })
            .collect();

        if removed.is_empty() {
            return Err(GeoError::FieldNotFound {
                model: kind,
                names: names.join(", "),
            });
        }
        Ok(removed)
    }

    fn targets(&self, target: Target) -> Vec<EntityKind> {
        match target {
            Target::Base => EntityKind::ALL.to_vec(),
            Target::Model(kind) => vec![kind],
        }
    }
}

fn base_template() -> Vec<FieldDef> {
    vec![
        FieldDef::char("code", 10).unique().verbose_name("Code"),
        FieldDef::char("name", 100).verbose_name("Name"),
        FieldDef::positive_integer("population")
            .null()
            .verbose_name("Population"),
        FieldDef::boolean("is_active")
            .default(true)
            .verbose_name("Is Active"),
    ]
}

fn income_class() -> FieldDef {
    FieldDef::char("income_class", 1)
        .choices(ChoiceSet::IncomeClass)
        .blank()
        .verbose_name("Income Class")
}

fn own_fields(kind: EntityKind) -> Vec<FieldDef> {
    match kind {
        EntityKind::Region => vec![FieldDef::char("island_group", 1)
            .choices(ChoiceSet::IslandGroup)
            .verbose_name("Island Group")],
        EntityKind::Province => vec![
            FieldDef::foreign_key("region", EntityKind::Region, "provinces", "province")
                .verbose_name("Region"),
            income_class(),
        ],
        EntityKind::Municipality => vec![
            FieldDef::foreign_key(
                "province",
                EntityKind::Province,
                "municipalities",
                "municipality",
            )
            .verbose_name("Province"),
            FieldDef::boolean("is_city").verbose_name("Is City"),
            FieldDef::boolean("is_capital").verbose_name("Is Capital"),
            FieldDef::char("city_class", 1)
                .choices(ChoiceSet::CityClass)
                .blank()
                .verbose_name("City Class"),
            income_class(),
        ],
        EntityKind::Barangay => vec![
            FieldDef::foreign_key(
                "municipality",
                EntityKind::Municipality,
                "barangays",
                "barangays",
            )
            .verbose_name("Municipality"),
            FieldDef::boolean("is_urban").null().verbose_name("Is Urban"),
        ],
    }
}

/// Query name a relation field exposes on its target, if it is one.
pub(crate) fn reverse_name(field: &FieldDef, target: EntityKind) -> Option<&str> {
    match &field.kind {
        FieldKind::ForeignKey {
            to,
            related_query_name,
            ..
        } if *to == target => Some(related_query_name.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn standard_field_lists() {
        let reg = SchemaRegistry::new();
        assert_eq!(
            reg.field_names(EntityKind::Region),
            ["code", "id", "is_active", "island_group", "name", "population", "province"]
        );
        assert_eq!(
            reg.field_names(EntityKind::Province),
            ["code", "id", "income_class", "is_active", "municipality", "name", "population", "region"]
        );
        assert_eq!(
            reg.field_names(EntityKind::Municipality),
            [
                "barangays",
                "city_class",
                "code",
                "id",
                "income_class",
                "is_active",
                "is_capital",
                "is_city",
                "name",
                "population",
                "province"
            ]
        );
        assert_eq!(
            reg.field_names(EntityKind::Barangay),
            ["code", "id", "is_active", "is_urban", "municipality", "name", "population"]
        );
    }

    #[test]
    fn add_to_base_reaches_every_model() {
        let mut reg = SchemaRegistry::new();
        reg.add_field(Target::Base, FieldDef::boolean("flag").default(true))
            .unwrap();
        for kind in EntityKind::ALL {
            let f = reg.descriptor(kind).field("flag").expect("flag declared");
            assert_eq!(f.default, Some(true.into()));
        }
        assert!(reg.base_fields().iter().any(|f| f.name == "flag"));
    }

    #[test]
    fn add_to_one_model_leaves_others() {
        let mut reg = SchemaRegistry::new();
        reg.add_field(EntityKind::Barangay, FieldDef::boolean("specific").default(true))
            .unwrap();
        assert!(reg.descriptor(EntityKind::Barangay).has_field("specific"));
        assert!(!reg.descriptor(EntityKind::Region).has_field("specific"));
        assert!(!reg.base_fields().iter().any(|f| f.name == "specific"));
    }

    #[test]
    fn add_existing_name_is_rejected_atomically() {
        let mut reg = SchemaRegistry::new();
        reg.add_field(EntityKind::Region, FieldDef::boolean("flag"))
            .unwrap();
        let before = reg.clone();
        assert_matches!(
            reg.add_field(Target::Base, FieldDef::boolean("flag")),
            Err(GeoError::InvalidArgument(_))
        );
        assert_eq!(reg, before);
    }

    #[test]
    fn remove_from_base_hits_only_models_that_have_it() {
        let mut reg = SchemaRegistry::new();
        let removed = reg.remove_field(Target::Base, &["is_urban"]).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].model, EntityKind::Barangay);
    }

    #[test]
    fn remove_reports_not_found() {
        let mut reg = SchemaRegistry::new();
        assert_matches!(
            reg.remove_field(EntityKind::Barangay, &["_"]),
            Err(GeoError::FieldNotFound { model: EntityKind::Barangay, .. })
        );
        assert_matches!(
            reg.remove_field(Target::Base, &["_"]),
            Err(GeoError::FieldNotFoundInAny { names }) if names == "_"
        );
        // `id` is implicit, not a declared field.
        assert!(reg.remove_field(EntityKind::Region, &["id"]).is_err());
    }

    #[test]
    fn remove_partial_match_succeeds() {
        let mut reg = SchemaRegistry::new();
        let removed = reg
            .remove_field(EntityKind::Municipality, &["code", "nope"])
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert!(!reg.descriptor(EntityKind::Municipality).has_field("code"));
    }

    #[test]
    fn non_string_names_are_invalid() {
        let mut reg = SchemaRegistry::new();
        let before = reg.clone();
        let args = [serde_json::json!("code"), serde_json::json!(123)];
        assert_matches!(
            reg.remove_field_values(EntityKind::Barangay, &args),
            Err(GeoError::InvalidArgument(_))
        );
        assert_matches!(
            reg.remove_field_values(Target::Base, &args),
            Err(GeoError::InvalidArgument(_))
        );
        assert_eq!(reg, before);
    }

    #[test]
    fn standard_registry_is_pristine() {
        assert_eq!(SchemaRegistry::standard(), &SchemaRegistry::new());
    }
}
