//! Store registry error types.

/// Kinds of registry errors.
///
/// These are startup-time configuration failures; a registry that produced one
/// must not be published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RegistryErrorKind {
    /// An entity type already has a store
    #[display("Entity type '{}' is already owned by store '{}'", entity_type, existing)]
    DuplicateStore {
        /// Entity type being registered twice
        entity_type: String,
        /// Name of the store that already owns it
        existing: String,
    },
    /// A store with this name or path already exists
    #[display("Duplicate store name or path: {}", _0)]
    DuplicateStoreName(String),
    /// No store matched the lookup
    #[display("Store not found: {}", _0)]
    StoreNotFound(String),
    /// Store definition is unusable
    #[display("Invalid store: {}", _0)]
    InvalidStore(String),
}

/// Registry error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Registry Error: {} at line {} in {}", kind, line, file)]
pub struct RegistryError {
    kind: RegistryErrorKind,
    line: u32,
    file: &'static str,
}

impl RegistryError {
    /// Create a new registry error with caller location tracking.
    #[track_caller]
    pub fn new(kind: RegistryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RegistryErrorKind {
        &self.kind
    }
}
