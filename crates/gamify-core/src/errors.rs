use thiserror::Error;

/// Coarse classification of [`GamifyError`] for callers that map errors to
/// exit codes or response statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamifyErrorKind {
    Validation,
    NotFound,
    Conflict,
    Authorization,
    InsufficientBalance,
    Database,
    Config,
}

/// Errors surfaced by every gamification operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GamifyError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Insufficient balance: required {required}, current {current}")]
    InsufficientBalance { required: i64, current: i64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl GamifyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn kind(&self) -> GamifyErrorKind {
        match self {
            Self::Validation(_) => GamifyErrorKind::Validation,
            Self::NotFound { .. } => GamifyErrorKind::NotFound,
            Self::Conflict(_) => GamifyErrorKind::Conflict,
            Self::Authorization(_) => GamifyErrorKind::Authorization,
            Self::InsufficientBalance { .. } => GamifyErrorKind::InsufficientBalance,
            Self::Database(_) => GamifyErrorKind::Database,
            Self::Config(_) => GamifyErrorKind::Config,
        }
    }
}

impl From<rusqlite::Error> for GamifyError {
    fn from(e: rusqlite::Error) -> Self {
        GamifyError::Database(e.to_string())
    }
}

pub type Result<T, E = GamifyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_reports_both_values() {
        let err = GamifyError::InsufficientBalance {
            required: 50,
            current: 40,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: required 50, current 40"
        );
        assert_eq!(err.kind(), GamifyErrorKind::InsufficientBalance);
    }

    #[test]
    fn sqlite_errors_map_to_database_kind() {
        let err: GamifyError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind(), GamifyErrorKind::Database);
    }
}
