use sea_orm::{DbErr, SqlErr};

/// Errors raised while wiring up the database (connecting, configuring, migrating)
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] DbErr),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_config::ConfigError),

    #[error("Migration error: {0}")]
    Migration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Detail message of a unique-constraint violation, if `err` is one.
///
/// Everything else (connectivity, syntax, foreign keys) returns `None` and is
/// left for the caller to treat as an internal failure.
pub fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => Some(detail),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_errors_are_not_unique_violations() {
        assert!(unique_violation(&DbErr::Custom("boom".into())).is_none());
        assert!(unique_violation(&DbErr::RecordNotFound("products".into())).is_none());
    }

    #[test]
    fn test_config_error_converts() {
        let err: DatabaseError = core_config::ConfigError::MissingEnvVar("DATABASE_URL".into()).into();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
