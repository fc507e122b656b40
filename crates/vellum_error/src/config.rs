//! Configuration error types.

/// Configuration error with source location.
///
/// Errors about one configured store carry its name in `store`, and the message is
/// prefixed with it.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Store entry the error is about, if any
    pub store: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum_error::ConfigError;
    ///
    /// let err = ConfigError::new("log level 'loud' is not a filter");
    /// assert!(err.store.is_none());
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            store: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create an error about the store entry called `store`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum_error::ConfigError;
    ///
    /// let err = ConfigError::for_store("documents", "needs 'endpoint'");
    /// assert_eq!(err.store.as_deref(), Some("documents"));
    /// assert_eq!(err.message, "store 'documents': needs 'endpoint'");
    /// ```
    #[track_caller]
    pub fn for_store(store: impl Into<String>, message: impl std::fmt::Display) -> Self {
        let store = store.into();
        let location = std::panic::Location::caller();
        Self {
            message: format!("store '{}': {}", store, message),
            store: Some(store),
            line: location.line(),
            file: location.file(),
        }
    }
}
