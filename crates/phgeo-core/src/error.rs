// crates/phgeo-core/src/error.rs
use crate::schema::EntityKind;
use thiserror::Error;

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors raised by the schema utilities, the record store and the loaders.
#[derive(Debug, Error)]
pub enum GeoError {
    /// None of the requested fields are declared on the targeted model.
    #[error("No attribute name found in model {model}: {names}")]
    FieldNotFound { model: EntityKind, names: String },

    /// A removal against the base template matched nothing on any model.
    #[error("No attribute name found in any model: {names}")]
    FieldNotFoundInAny { names: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Integrity(#[from] IntegrityViolation),

    /// A fixture step failed; the steps after it were not attempted.
    #[error("Failed to load fixture '{fixture}': {source}")]
    LoadFailure {
        fixture: String,
        #[source]
        source: Box<GeoError>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Persistence-level constraint failures reported by [`crate::GeoDb`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityViolation {
    #[error("UNIQUE constraint failed: {model}.{field} = '{value}'")]
    Duplicate {
        model: EntityKind,
        field: String,
        value: String,
    },

    #[error("FOREIGN KEY constraint failed: {model}.{field} references missing {target} '{reference}'")]
    MissingParent {
        model: EntityKind,
        field: String,
        target: EntityKind,
        reference: String,
    },

    #[error("NOT NULL constraint failed: {model}.{field}")]
    NotNull { model: EntityKind, field: String },

    #[error("{model}.{field} may not be blank")]
    Blank { model: EntityKind, field: String },

    #[error("{model}.{field} exceeds max_length={max_length} ({length} chars)")]
    TooLong {
        model: EntityKind,
        field: String,
        max_length: usize,
        length: usize,
    },

    #[error("CHECK constraint failed: {model}.{field} must not be negative")]
    Check { model: EntityKind, field: String },

    #[error("{model}.{field}: '{value}' is not a valid choice")]
    InvalidChoice {
        model: EntityKind,
        field: String,
        value: String,
    },
}

impl GeoError {
    /// Wraps `self` as the cause of a failed fixture step.
    pub fn in_fixture(self, fixture: impl Into<String>) -> Self {
        GeoError::LoadFailure {
            fixture: fixture.into(),
            source: Box::new(self),
        }
    }

    /// The integrity violation behind this error, looking through `LoadFailure`.
    pub fn integrity(&self) -> Option<&IntegrityViolation> {
        match self {
            GeoError::Integrity(v) => Some(v),
            GeoError::LoadFailure { source, .. } => source.integrity(),
            _ => None,
        }
    }
}
