//! Configuration error types.

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use toolbridge_error::ConfigError;
///
/// let err = ConfigError::for_key("mcp.server_url", "relative URL");
/// assert_eq!(err.key.as_deref(), Some("mcp.server_url"));
/// assert!(err.to_string().contains("relative URL"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {}{} at line {} in {}", key.as_ref().map(|k| format!("[{k}] ")).unwrap_or_default(), message, line, file)]
pub struct ConfigError {
    /// Settings key the error refers to, if any
    pub key: Option<String>,
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            key: None,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a ConfigError attributed to a specific settings key.
    #[track_caller]
    pub fn for_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            key: Some(key.into()),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
