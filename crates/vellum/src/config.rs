//! Startup configuration.
//!
//! Configuration belongs to the wiring layer: it names stores and their backends,
//! and the application turns each entry into a [`StoreHandle`] for one of its entity
//! types. Nothing below the facade reads configuration.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};
use vellum_core::ContentEntity;
use vellum_error::{ConfigError, VellumResult};
use vellum_registry::StoreHandle;
use vellum_storage::{
    BackendKind, FileSystemStorage, IndexedStorage, IndexedStorageConfig, MemoryStorage,
    ObjectStorage, ObjectStorageConfig, ResourceBackend,
};

/// Log output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    #[display("text")]
    #[serde(alias = "fmt")]
    Text,
    /// One JSON object per event
    #[display("json")]
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_renditions() -> bool {
    true
}

/// One `[stores.<name>]` entry.
///
/// Which fields are required depends on `backend`:
///
/// - `filesystem`: `path`
/// - `memory`: none
/// - `object`: `endpoint`, `bucket`; optional `prefix`, `timeout_secs`
/// - `indexed`: `endpoint`, `index`; optional `timeout_secs`, `chunk_bytes`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Storage medium
    pub backend: BackendKind,
    /// Base directory of a filesystem store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Base URL of an object or indexed store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Object storage bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Object key prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Search index name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Request timeout for HTTP backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Bytes per chunk document in an indexed store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_bytes: Option<usize>,
    /// REST path override; defaults to the pluralised entity type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_path: Option<String>,
    /// Whether renditions may be computed for this store
    #[serde(default = "default_renditions")]
    pub renditions: bool,
}

impl StoreConfig {
    /// Configuration for a store of the given kind with every optional field unset.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            path: None,
            endpoint: None,
            bucket: None,
            prefix: None,
            index: None,
            timeout_secs: None,
            chunk_bytes: None,
            rest_path: None,
            renditions: default_renditions(),
        }
    }

    /// Check the fields `backend` needs without touching the medium.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or blank field.
    pub fn check(&self, name: &str) -> Result<(), ConfigError> {
        match self.backend {
            BackendKind::Filesystem => {
                if self.path.as_ref().is_none_or(|p| p.as_os_str().is_empty()) {
                    return Err(missing(name, "path"));
                }
            }
            BackendKind::Memory => {}
            BackendKind::ObjectStorage => {
                required(name, "endpoint", &self.endpoint)?;
                required(name, "bucket", &self.bucket)?;
            }
            BackendKind::IndexedStorage => {
                required(name, "endpoint", &self.endpoint)?;
                required(name, "index", &self.index)?;
            }
        }
        if self.rest_path.as_ref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ConfigError::for_store(name, "blank rest_path"));
        }
        Ok(())
    }

    /// Construct the backend this entry describes.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or the backend cannot be
    /// created (for example an unwritable filesystem path).
    #[instrument(skip(self), fields(backend = %self.backend))]
    pub fn build_backend(&self, name: &str) -> Result<Arc<dyn ResourceBackend>, ConfigError> {
        self.check(name)?;
        let failed = |e: vellum_error::StorageError| {
            ConfigError::for_store(name, e.kind())
        };

        let backend: Arc<dyn ResourceBackend> = match self.backend {
            BackendKind::Filesystem => {
                let path = self.path.clone().unwrap_or_default();
                Arc::new(FileSystemStorage::new(path).map_err(failed)?)
            }
            BackendKind::Memory => Arc::new(MemoryStorage::new()),
            BackendKind::ObjectStorage => {
                let mut builder = ObjectStorageConfig::builder();
                builder
                    .endpoint(self.endpoint.clone().unwrap_or_default())
                    .bucket(self.bucket.clone().unwrap_or_default());
                if let Some(prefix) = &self.prefix {
                    builder.prefix(prefix.clone());
                }
                if let Some(timeout_secs) = self.timeout_secs {
                    builder.timeout_secs(timeout_secs);
                }
                let config = builder
                    .build()
                    .map_err(|e| ConfigError::for_store(name, e))?;
                Arc::new(ObjectStorage::new(config).map_err(failed)?)
            }
            BackendKind::IndexedStorage => {
                let mut builder = IndexedStorageConfig::builder();
                builder
                    .endpoint(self.endpoint.clone().unwrap_or_default())
                    .index(self.index.clone().unwrap_or_default());
                if let Some(timeout_secs) = self.timeout_secs {
                    builder.timeout_secs(timeout_secs);
                }
                if let Some(chunk_bytes) = self.chunk_bytes {
                    builder.chunk_bytes(chunk_bytes);
                }
                let config = builder
                    .build()
                    .map_err(|e| ConfigError::for_store(name, e))?;
                Arc::new(IndexedStorage::new(config).map_err(failed)?)
            }
        };

        debug!(store = name, "Built store backend");
        Ok(backend)
    }

    /// Store handle for entity type `T` backed by this entry.
    ///
    /// # Errors
    ///
    /// See [`StoreConfig::build_backend`].
    pub fn handle_for<T: ContentEntity>(&self, name: &str) -> Result<StoreHandle, ConfigError> {
        let mut handle = StoreHandle::for_entity::<T>(name, self.build_backend(name)?)
            .with_renditions(self.renditions);
        if let Some(rest_path) = &self.rest_path {
            handle = handle.with_path(rest_path.clone());
        }
        Ok(handle)
    }
}

fn missing(store: &str, field: &str) -> ConfigError {
    ConfigError::for_store(store, format!("needs '{}'", field))
}

fn required(store: &str, field: &str, value: &Option<String>) -> Result<(), ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(missing(store, field)),
    }
}

/// Top-level configuration.
///
/// ```toml
/// [logging]
/// level = "info,vellum_resolver=debug"
/// format = "json"
///
/// [stores.documents]
/// backend = "filesystem"
/// path = "/var/lib/vellum/documents"
///
/// [stores.archive]
/// backend = "object"
/// endpoint = "http://localhost:9000"
/// bucket = "archive"
/// renditions = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct VellumConfig {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Stores by name
    #[serde(default)]
    pub stores: BTreeMap<String, StoreConfig>,
}

impl VellumConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> VellumResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (vellum.toml shipped with the crate)
    /// 2. User config in home directory (~/.config/vellum/vellum.toml)
    /// 3. User config in current directory (./vellum.toml)
    ///
    /// User config files are optional and skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the merged result
    /// fails [`VellumConfig::validate`].
    #[instrument]
    pub fn load() -> VellumResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../vellum.toml");

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Toml,
        ));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/vellum/vellum.toml");
            builder = builder.add_source(config::File::from(home_config).required(false));
        }

        builder = builder.add_source(config::File::with_name("vellum").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could not be wired unambiguously.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank store name, a store missing a field its
    /// backend needs, or two stores claiming the same REST path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut rest_paths: HashMap<&str, &str> = HashMap::new();
        for (name, store) in &self.stores {
            if name.trim().is_empty() {
                return Err(ConfigError::new("store names must not be blank"));
            }
            store.check(name)?;
            if let Some(path) = store.rest_path.as_deref() {
                if let Some(other) = rest_paths.insert(path, name.as_str()) {
                    return Err(ConfigError::new(format!(
                        "stores '{}' and '{}' share rest_path '{}'",
                        other, name, path
                    )));
                }
            }
        }
        Ok(())
    }

    /// Entry for the store called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such store is configured.
    pub fn store(&self, name: &str) -> Result<&StoreConfig, ConfigError> {
        self.stores
            .get(name)
            .ok_or_else(|| ConfigError::new(format!("no store named '{}' is configured", name)))
    }
}
