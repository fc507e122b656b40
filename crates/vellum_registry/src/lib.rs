//! Store registry for the Vellum content store.
//!
//! A [`StoreHandle`] binds one entity type to the [`ResourceBackend`] that owns its
//! bytes. Handles are registered once at startup through [`StoreRegistryBuilder`],
//! which rejects ambiguous configurations, and published as an immutable
//! [`StoreRegistry`] that request handlers share without locking.
//!
//! [`ResourceBackend`]: vellum_storage::ResourceBackend

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod handle;
mod reference;
mod registry;

pub use handle::{Capability, StoreHandle, default_store_path};
pub use reference::ContentReference;
pub use registry::{StoreRegistry, StoreRegistryBuilder};
pub use vellum_error::{RegistryError, RegistryErrorKind};
