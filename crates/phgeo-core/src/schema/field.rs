// crates/phgeo-core/src/schema/field.rs
use super::EntityKind;
use crate::choices::ChoiceSet;
use crate::error::{GeoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single stored value, as seen through a declared shape.
///
/// Externally tagged on purpose: snapshots go through bincode, which cannot
/// drive untagged enums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Scalar JSON values only; arrays and objects have no column type.
    #[cfg(feature = "json")]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Some(FieldValue::Null),
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n.as_i64().map(FieldValue::Int),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Bool(b) => (*b).into(),
            FieldValue::Int(i) => (*i).into(),
            FieldValue::Text(s) => s.clone().into(),
        }
    }

    pub(crate) fn sql_literal(&self) -> String {
        match self {
            FieldValue::Null => "NULL".to_owned(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnDelete {
    Cascade,
    Protect,
}

impl OnDelete {
    fn as_sql(self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Protect => "RESTRICT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Char {
        max_length: usize,
        choices: Option<ChoiceSet>,
    },
    PositiveInteger,
    Boolean,
    ForeignKey {
        to: EntityKind,
        on_delete: OnDelete,
        /// Accessor on the parent (`region.provinces`).
        related_name: String,
        /// Name the parent lists among its fields.
        related_query_name: String,
    },
}

/// One declared field of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub verbose_name: Option<String>,
    pub null: bool,
    pub blank: bool,
    pub unique: bool,
    pub default: Option<FieldValue>,
}

impl FieldDef {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            verbose_name: None,
            null: false,
            blank: false,
            unique: false,
            default: None,
        }
    }

    pub fn char(name: impl Into<String>, max_length: usize) -> Self {
        Self::new(
            name,
            FieldKind::Char {
                max_length,
                choices: None,
            },
        )
    }

    pub fn positive_integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::PositiveInteger)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn foreign_key(
        name: impl Into<String>,
        to: EntityKind,
        related_name: &str,
        related_query_name: &str,
    ) -> Self {
        Self::new(
            name,
            FieldKind::ForeignKey {
                to,
                on_delete: OnDelete::Cascade,
                related_name: related_name.to_owned(),
                related_query_name: related_query_name.to_owned(),
            },
        )
    }

    pub fn null(mut self) -> Self {
        self.null = true;
        self
    }

    pub fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn verbose_name(mut self, verbose_name: &str) -> Self {
        self.verbose_name = Some(verbose_name.to_owned());
        self
    }

    /// Only meaningful on `Char` fields; other kinds are returned unchanged.
    pub fn choices(mut self, set: ChoiceSet) -> Self {
        if let FieldKind::Char { choices, .. } = &mut self.kind {
            *choices = Some(set);
        }
        self
    }

    pub fn max_length(&self) -> Option<usize> {
        match self.kind {
            FieldKind::Char { max_length, .. } => Some(max_length),
            _ => None,
        }
    }

    pub fn choice_set(&self) -> Option<ChoiceSet> {
        match self.kind {
            FieldKind::Char { choices, .. } => choices,
            _ => None,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::ForeignKey { .. })
    }

    /// Storage column; foreign keys get the `_id` suffix.
    pub fn column(&self) -> String {
        if self.is_relation() {
            format!("{}_id", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Value a new row receives when the caller supplies none.
    pub fn initial_value(&self) -> Option<FieldValue> {
        match &self.default {
            Some(v) => Some(v.clone()),
            None if self.null => Some(FieldValue::Null),
            None => None,
        }
    }

    pub fn sql_type(&self) -> String {
        match &self.kind {
            FieldKind::Char { max_length, .. } => format!("varchar({max_length})"),
            FieldKind::PositiveInteger => "integer unsigned".to_owned(),
            FieldKind::Boolean => "bool".to_owned(),
            FieldKind::ForeignKey { .. } => "integer".to_owned(),
        }
    }

    /// Column definition as it appears in `CREATE TABLE` / `ADD COLUMN`.
    pub fn column_sql(&self) -> String {
        let mut sql = format!("\"{}\" {}", self.column(), self.sql_type());
        if let Some(default) = &self.default {
            sql.push_str(&format!(" DEFAULT {}", default.sql_literal()));
        }
        sql.push_str(if self.null { " NULL" } else { " NOT NULL" });
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        match &self.kind {
            FieldKind::PositiveInteger => {
                sql.push_str(&format!(" CHECK (\"{}\" >= 0)", self.name));
            }
            FieldKind::ForeignKey { to, on_delete, .. } => {
                sql.push_str(&format!(
                    " REFERENCES \"{}\" (\"id\") ON DELETE {}",
                    to.db_table(),
                    on_delete.as_sql()
                ));
            }
            _ => {}
        }
        sql
    }
}

/// Field names must be plain identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(GeoError::InvalidArgument(format!(
            "'{name}' is not a valid field name"
        )))
    }
}
