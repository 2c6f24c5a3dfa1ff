use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("Optimistic lock failed: {0}")]
    OptimisticLockFailed(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::AlreadyExists(_) => 409,
            Error::Unauthorized | Error::Jwt(_) => 401,
            Error::Forbidden => 403,
            Error::InvalidArgument(_) => 400,
            Error::InsufficientStock(_)
            | Error::InvalidTransition { .. }
            | Error::FailedPrecondition(_) => 422,
            Error::OptimisticLockFailed(_) => 409,
            Error::Unavailable(_) => 503,
            _ => 500,
        }
    }

    /// Translate a storage error from an insert/update that may have hit a
    /// unique index. Postgres reports unique violations as SQLSTATE 23505.
    pub fn from_unique_violation(err: sqlx::Error, what: &str) -> Error {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some("23505") {
                return Error::AlreadyExists(what.to_string());
            }
        }
        Error::Database(err)
    }

    /// Whether a caller-side retry can reasonably succeed without new input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::OptimisticLockFailed(_) | Error::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::NotFound("order".into()).status_code(), 404);
        assert_eq!(Error::AlreadyExists("sku".into()).status_code(), 409);
        assert_eq!(Error::Unauthorized.status_code(), 401);
        assert_eq!(Error::Forbidden.status_code(), 403);
        assert_eq!(Error::InvalidArgument("qty".into()).status_code(), 400);
        assert_eq!(Error::InsufficientStock("p1".into()).status_code(), 422);
        assert_eq!(
            Error::OptimisticLockFailed("order v3".into()).status_code(),
            409
        );
        assert_eq!(Error::Unavailable("inventory".into()).status_code(), 503);
        assert_eq!(Error::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_retryable() {
        assert!(Error::OptimisticLockFailed("v".into()).is_retryable());
        assert!(Error::Unavailable("bus".into()).is_retryable());
        assert!(!Error::NotFound("x".into()).is_retryable());
    }
}
