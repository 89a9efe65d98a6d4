use thiserror::Error;

/// Error kinds the bridge client can produce. Mirrors the kinds in
/// `shardnet_core::ShardNetError`, but keeps bridge-specific context
/// (status codes, endpoint names) that callers use to decide whether to
/// retry or surface the failure.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("bridge request timed out")]
    Timeout,

    #[error("bridge socket error: {0}")]
    SocketError(String),

    #[error("bridge returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("bridge response could not be parsed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request was cancelled")]
    Cancelled,

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl BridgeError {
    /// Whether this failure is worth retrying per the coordinator's
    /// retry policy: transport-level failures only, never an explicit
    /// 4xx rejection from the bridge.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Timeout | BridgeError::SocketError(_))
            || matches!(self, BridgeError::Http { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BridgeError::Timeout
        } else {
            BridgeError::SocketError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        assert!(BridgeError::Timeout.is_retryable());
    }

    #[test]
    fn test_client_error_is_not_retryable() {
        let err = BridgeError::Http { status: 404, body: "not found".into() };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = BridgeError::Http { status: 503, body: "busy".into() };
        assert!(err.is_retryable());
    }
}
