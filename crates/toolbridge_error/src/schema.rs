//! Schema normalization diagnostics.

/// A node of an upstream tool schema that had to be replaced by a safe default.
///
/// These never abort normalization; they are collected and logged.
///
/// # Examples
///
/// ```
/// use toolbridge_error::SchemaError;
///
/// let err = SchemaError::new("properties.query", "no type, properties or items");
/// assert_eq!(err.path, "properties.query");
/// assert!(err.to_string().contains("properties.query"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Schema Error at '{}': {} (line {} in {})", path, message, line, file)]
pub struct SchemaError {
    /// Dotted path of the offending node, `$` for the root
    pub path: String,
    /// What was wrong with the node
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl SchemaError {
    /// Create a new SchemaError at the current location.
    #[track_caller]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            path: path.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
