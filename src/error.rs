use thiserror::Error;

/// Failure taxonomy for the fetch and persistence layers.
///
/// Aggregation itself never fails; malformed records degrade out of individual
/// derived metrics instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Non-2xx response or network failure. Carries the server body text when
    /// one was returned.
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Response body was not JSON, or not shaped like a place collection.
    #[error("unexpected response payload: {0}")]
    Decode(String),

    /// Local key-value store failure. Recovered by the session (logged and
    /// ignored); surfaced only to direct store callers.
    #[error("local store error: {0}")]
    Persistence(#[from] std::io::Error),
}

/// Result type alias for tourism-scout operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Decode(_) => "decode",
            Self::Persistence(_) => "persistence",
        }
    }

    /// Fetch-layer errors end a refresh but keep prior data on screen;
    /// persistence errors never even end the operation that hit them.
    pub fn is_fetch_error(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_the_deadline() {
        let err = Error::Timeout { timeout_ms: 8000 };
        assert_eq!(err.to_string(), "request timed out after 8000ms");
        assert_eq!(err.category(), "timeout");
    }

    #[test]
    fn persistence_errors_are_not_fetch_errors() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!err.is_fetch_error());
        assert!(Error::Transport("500".into()).is_fetch_error());
    }
}
