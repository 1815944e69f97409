/// Maximum number of response-body characters kept in a `FetchError::Remote`.
pub const EXCERPT_CHARS: usize = 200;

/// Process-level error carrying the exit code the binary should return.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of a single remote request (observations or calendar).
///
/// These never abort the process: the pipeline contains them per indicator and
/// renders "no data" alongside the message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// Non-success HTTP status.
    #[error("request failed: {status} — {excerpt}")]
    Remote { status: u16, excerpt: String },

    /// Connection failure or timeout.
    #[error("request failed: {0}")]
    Transport(String),

    /// The body could not be decoded.
    #[error("failed to parse response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A required API key is absent.
    #[error("missing configuration: {0}")]
    MissingConfiguration(&'static str),
}

impl FetchError {
    /// Build a `Remote` error, truncating the body to `EXCERPT_CHARS` characters.
    pub fn remote(status: u16, body: &str) -> Self {
        Self::Remote {
            status,
            excerpt: body.chars().take(EXCERPT_CHARS).collect(),
        }
    }

    /// Whether this is one of the remote-side failures (status, transport, body).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            FetchError::Remote { .. } | FetchError::Transport(_) | FetchError::Decode(_)
        )
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        let code = if err.is_remote() { 4 } else { 2 };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_truncates_body() {
        let body = "x".repeat(1000);
        let FetchError::Remote { status, excerpt } = FetchError::remote(500, &body) else {
            panic!("expected remote error");
        };
        assert_eq!(status, 500);
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn missing_configuration_maps_to_usage_exit_code() {
        let err: AppError = FetchError::MissingConfiguration("FRED_API_KEY").into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("FRED_API_KEY"));
    }

    #[test]
    fn remote_side_failures_map_to_data_exit_code() {
        for err in [
            FetchError::remote(503, "unavailable"),
            FetchError::Transport("timed out".to_string()),
            FetchError::Decode("bad json".to_string()),
        ] {
            assert!(err.is_remote());
            assert_eq!(AppError::from(err).exit_code(), 4);
        }
        let err = FetchError::InvalidRequest("empty series id".to_string());
        assert!(!err.is_remote());
        assert_eq!(AppError::from(err).exit_code(), 2);
    }
}
