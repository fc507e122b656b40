//! Rendition error types.

/// Kinds of rendition errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RenditionErrorKind {
    /// Converter failed while producing output
    #[display("Conversion failed: {}", _0)]
    ConversionFailed(String),
    /// Converter produced no stream
    #[display("Converter produced no output for {}", _0)]
    NoOutput(String),
    /// Rule cannot be registered
    #[display("Invalid rendition rule: {}", _0)]
    InvalidRule(String),
}

/// Rendition error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rendition Error: {} at line {} in {}", kind, line, file)]
pub struct RenditionError {
    kind: RenditionErrorKind,
    line: u32,
    file: &'static str,
}

impl RenditionError {
    /// Create a new rendition error with caller location tracking.
    #[track_caller]
    pub fn new(kind: RenditionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RenditionErrorKind {
        &self.kind
    }
}
