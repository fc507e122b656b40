//! Top-level error wrapper types.

use crate::{ConfigError, MediaTypeError, RegistryError, RenditionError, StorageError};

/// Every error a Vellum crate can surface.
///
/// # Examples
///
/// ```
/// use vellum_error::{ConfigError, VellumError};
///
/// let err: VellumError = ConfigError::new("missing bucket").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VellumErrorKind {
    /// Storage backend error
    #[from(StorageError)]
    Storage(StorageError),
    /// Store registry error
    #[from(RegistryError)]
    Registry(RegistryError),
    /// Rendition error
    #[from(RenditionError)]
    Rendition(RenditionError),
    /// Media type parse error
    #[from(MediaTypeError)]
    MediaType(MediaTypeError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Vellum error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vellum Error: {}", _0)]
pub struct VellumError(Box<VellumErrorKind>);

impl VellumError {
    /// Create a new error from a kind.
    pub fn new(kind: VellumErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VellumErrorKind {
        &self.0
    }

    /// Transient backend failure that the caller may retry.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            VellumErrorKind::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to VellumErrorKind
impl<T> From<T> for VellumError
where
    T: Into<VellumErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vellum operations.
pub type VellumResult<T> = std::result::Result<T, VellumError>;
