//! Mapping between the domain error taxonomy and gRPC statuses.

pub use tonic::{Code, Status};

use crate::error::Error;

/// Domain error → wire status. Internal detail never crosses the wire; it
/// is logged at the origin instead.
impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => Status::not_found(msg),
            Error::InvalidArgument(msg) => Status::invalid_argument(msg),
            Error::AlreadyExists(msg) => Status::already_exists(msg),
            Error::InsufficientStock(msg) => {
                Status::failed_precondition(format!("insufficient stock: {msg}"))
            }
            Error::InvalidTransition { from, to } => {
                Status::failed_precondition(format!("invalid transition from {from} to {to}"))
            }
            Error::FailedPrecondition(msg) => Status::failed_precondition(msg),
            Error::OptimisticLockFailed(msg) => Status::aborted(msg),
            Error::Unauthorized | Error::Jwt(_) => Status::unauthenticated("unauthenticated"),
            Error::Forbidden => Status::permission_denied("permission denied"),
            Error::Unavailable(msg) => Status::unavailable(msg),
            other => {
                tracing::error!("internal error crossing rpc boundary: {other}");
                Status::internal("internal error")
            }
        }
    }
}

/// Wire status → domain error, for callers of typed clients.
impl From<Status> for Error {
    fn from(status: Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::NotFound => Error::NotFound(message),
            Code::InvalidArgument => Error::InvalidArgument(message),
            Code::AlreadyExists => Error::AlreadyExists(message),
            Code::FailedPrecondition => Error::FailedPrecondition(message),
            Code::Aborted => Error::OptimisticLockFailed(message),
            Code::Unauthenticated => Error::Unauthorized,
            Code::PermissionDenied => Error::Forbidden,
            Code::Unavailable | Code::DeadlineExceeded | Code::ResourceExhausted => {
                Error::Unavailable(message)
            }
            _ => Error::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        let status = Status::from(Error::InsufficientStock("p1 at loc1".into()));
        assert_eq!(status.code(), Code::FailedPrecondition);

        let status = Status::from(Error::OptimisticLockFailed("order v3".into()));
        assert_eq!(status.code(), Code::Aborted);

        let status = Status::from(Error::NotFound("order".into()));
        assert_eq!(status.code(), Code::NotFound);

        let status = Status::from(Error::Forbidden);
        assert_eq!(status.code(), Code::PermissionDenied);

        let status = Status::from(Error::Internal("secret detail".into()));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "internal error");
    }

    #[test]
    fn test_status_back_to_error() {
        let err = Error::from(Status::aborted("stale version"));
        assert!(matches!(err, Error::OptimisticLockFailed(_)));

        let err = Error::from(Status::deadline_exceeded("slow"));
        assert!(matches!(err, Error::Unavailable(_)));

        let err = Error::from(Status::unauthenticated("nope"));
        assert!(matches!(err, Error::Unauthorized));
    }
}
