//! Error types for the Vellum content store.
//!
//! This crate provides the foundation error types used throughout the Vellum workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Backend library errors (I/O, HTTP, JSON) are folded into these kinds before they
//! leave the crate that produced them.
//!
//! # Examples
//!
//! ```
//! use vellum_error::{StorageError, StorageErrorKind, VellumResult};
//!
//! fn fetch() -> VellumResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::Unavailable("connection refused".into())))?
//! }
//!
//! let err = fetch().unwrap_err();
//! assert!(err.is_retryable());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod media_type;
mod registry;
mod rendition;
mod storage;

pub use config::ConfigError;
pub use error::{VellumError, VellumErrorKind, VellumResult};
pub use media_type::MediaTypeError;
pub use registry::{RegistryError, RegistryErrorKind};
pub use rendition::{RenditionError, RenditionErrorKind};
pub use storage::{StorageError, StorageErrorKind, StorageResult};
