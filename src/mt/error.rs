/// Error types for the Machine Translation module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// Missing credential or invalid option
    ConfigError(String),
    /// Target language name is empty or contains control characters
    InvalidLanguage(String),
    /// Transport-level failure talking to the completion service
    NetworkError(String),
    /// The completion service answered with a non-success status
    TranslationError(String),
    /// The completion service answered, but the body cannot be used
    ResponseError(String),
    /// General error with context
    Other(String),
}

impl std::fmt::Display for MtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            MtError::InvalidLanguage(msg) => write!(f, "Invalid language: {}", msg),
            MtError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            MtError::TranslationError(msg) => write!(f, "Translation error: {}", msg),
            MtError::ResponseError(msg) => write!(f, "Malformed response: {}", msg),
            MtError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for MtError {}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MtError::ResponseError(err.to_string())
        } else {
            MtError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MtError {
    fn from(err: serde_json::Error) -> Self {
        MtError::ResponseError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
