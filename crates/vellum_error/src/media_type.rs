//! Media type parse errors.

/// A string that is not a syntactically valid media type.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Invalid media type '{}': {} at line {} in {}", input, reason, line, file)]
pub struct MediaTypeError {
    /// The rejected input
    pub input: String,
    /// Why it was rejected
    pub reason: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl MediaTypeError {
    /// Create a new MediaTypeError at the current location.
    #[track_caller]
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            input: input.into(),
            reason: reason.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
