//! Pluggable resource backends for Vellum.
//!
//! A [`ResourceBackend`] maps content ids to bytes. It knows nothing about entities or
//! media types; those belong to the registry and the resolver. Every backend offers
//! the same contract:
//!
//! - **Streaming reads**: [`ResourceBackend::get_resource`] hands back a [`Resource`]
//!   whose body is a chunked [`ContentStream`](vellum_core::ContentStream)
//! - **Atomic overwrite**: a concurrent reader sees either the old or the new bytes
//!   for an id, never a mix
//! - **Idempotent delete**: deleting an unknown id succeeds
//! - **Failure split**: unknown ids are `NotFound`; I/O and network failures are
//!   `Unavailable` and safe to retry
//!
//! # Backends
//!
//! - [`FileSystemStorage`] - sharded directory tree, temp file + rename
//! - [`MemoryStorage`] - copy-on-write map, for tests and ephemeral stores
//! - [`ObjectStorage`] - S3-style path addressed HTTP object store
//! - [`IndexedStorage`] - search-cluster document per content id
//!
//! # Example
//!
//! ```rust
//! use vellum_core::{collect_stream, stream_from_bytes};
//! use vellum_storage::{FileSystemStorage, ResourceBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/vellum")?;
//!
//! let stored = storage.set_resource(None, stream_from_bytes(b"hello".to_vec())).await?;
//! let resource = storage.get_resource(&stored.content_id).await?;
//! assert_eq!(resource.into_bytes().await?, b"hello");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod filesystem;
mod http;
mod indexed;
mod memory;
mod object;

pub use backend::{BackendKind, Resource, ResourceBackend, StoredContent, validate_content_id};
pub use filesystem::FileSystemStorage;
pub use indexed::{IndexedStorage, IndexedStorageConfig, IndexedStorageConfigBuilder};
pub use memory::MemoryStorage;
pub use object::{ObjectStorage, ObjectStorageConfig, ObjectStorageConfigBuilder};
pub use vellum_error::{StorageError, StorageErrorKind, StorageResult};
