use thiserror::Error;

use crate::model::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    ForeignKey,
    Check,
    Unique,
    Other,
}

/// Failures raised by the storage backend itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("constraint violated ({kind:?}): {message}")]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },

    #[error("statement failed: {0}")]
    Statement(String),

    #[error("column {index}: expected {expected}")]
    Decode { index: usize, expected: &'static str },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        use rusqlite::ffi;

        if let rusqlite::Error::SqliteFailure(code, msg) = &e {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                let kind = match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
                    ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        ConstraintKind::Unique
                    }
                    _ => ConstraintKind::Other,
                };
                return StoreError::Constraint {
                    kind,
                    message: msg.clone().unwrap_or_else(|| code.to_string()),
                };
            }
        }
        StoreError::Statement(e.to_string())
    }
}

/// The error every repository and report operation returns.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity} references a missing row: {message}")]
    Referential { entity: Entity, message: String },

    #[error("{entity} {key} not found")]
    NotFound { entity: Entity, key: String },

    #[error("{count} {entity} rows share the name {name:?}")]
    Ambiguous {
        entity: Entity,
        name: String,
        count: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RecordError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        RecordError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: Entity, key: impl ToString) -> Self {
        RecordError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Classifies a store failure raised while writing `entity`.
    /// A rejected foreign key becomes `Referential`; everything else stays a store error.
    pub fn from_write(entity: Entity, e: StoreError) -> Self {
        match e {
            StoreError::Constraint {
                kind: ConstraintKind::ForeignKey,
                message,
            } => RecordError::Referential { entity, message },
            other => RecordError::Store(other),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RecordError::Validation { .. } => "validation_failed",
            RecordError::Referential { .. } => "referential_violation",
            RecordError::NotFound { .. } => "not_found",
            RecordError::Ambiguous { .. } => "ambiguous_name",
            RecordError::Store(_) => "store_failed",
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;
