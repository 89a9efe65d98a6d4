use thiserror::Error;

/// The error kinds named in the core's error handling design: each variant
/// maps to exactly one of the kinds and carries enough context for the
/// caller to decide whether to retry, report, or surface the failure.
#[derive(Error, Debug)]
pub enum ShardNetError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("resource exhausted: {0}")]
    Resource(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ShardNetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_argument() {
        let err = ShardNetError::InvalidArgument("zero-byte source".to_string());
        assert_eq!(err.to_string(), "invalid argument: zero-byte source");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = ShardNetError::NotFound("shard abc123".to_string());
        assert_eq!(err.to_string(), "not found: shard abc123");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = ShardNetError::Unauthorized("Token not valid for hash".to_string());
        assert_eq!(err.to_string(), "unauthorized: Token not valid for hash");
    }

    #[test]
    fn test_error_display_cancelled() {
        let err = ShardNetError::Cancelled;
        assert_eq!(err.to_string(), "operation cancelled");
    }

    #[test]
    fn test_result_type_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(ShardNetError::Cancelled);
        assert!(result.is_err());
    }
}
