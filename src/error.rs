// ⚠️ Error Types
// Everything the roster can fail with is recoverable and local

use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    /// The proposed field set was rejected; prior state is unchanged
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    /// Lookup by identifier found nothing
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RosterError>;

impl RosterError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        RosterError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Validation errors carried by this error, empty for other kinds
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            RosterError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
