use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    /// No product matched the identifier, title or slug
    #[error("Product with id, title or slug \"{0}\" not found")]
    NotFound(String),

    /// Unique constraint on title or slug; carries the store's detail message
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProductError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ProductError::Conflict(_))
    }
}

/// Storage errors are classified exactly once, here.
impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        if let Some(detail) = database::unique_violation(&err) {
            tracing::warn!(%detail, "Unique constraint violated");
            return ProductError::Conflict(detail);
        }

        tracing::error!(error = %err, "Unexpected database error");
        ProductError::Internal("Unexpected error, check server logs".to_string())
    }
}

impl From<validator::ValidationErrors> for ProductError {
    fn from(err: validator::ValidationErrors) -> Self {
        ProductError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_term() {
        let err = ProductError::NotFound("mens_shirt".to_string());
        assert_eq!(
            err.to_string(),
            "Product with id, title or slug \"mens_shirt\" not found"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_generic_db_error_becomes_internal() {
        let err: ProductError = DbErr::Custom("connection reset".to_string()).into();
        assert!(matches!(err, ProductError::Internal(_)));
        assert!(!err.to_string().contains("connection reset"));
    }
}
