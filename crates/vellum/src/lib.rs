//! Vellum - content storage with media-type resolution.
//!
//! Vellum associates binary content with entity records and serves it through a
//! uniform store abstraction, independent of where the bytes live. Given a
//! content-bearing entity and a ranked list of acceptable media types, the
//! [`Resolver`] picks the resource to stream back, computing a rendition when the
//! stored format is not what the caller asked for.
//!
//! # Features
//!
//! - **Pluggable backends**: filesystem, memory, object storage and indexed storage
//! - **Accept-style resolution**: specificity and quality ordering with wildcard
//!   inclusion
//! - **Renditions**: per-store conversion rules, consulted in registration order
//! - **Typed content schemas**: nested single, array and collection properties,
//!   declared once per entity type
//!
//! # Architecture
//!
//! - `vellum_error` - Error types
//! - `vellum_core` - Media types, content ids, descriptors and schemas
//! - `vellum_storage` - Resource backends
//! - `vellum_rendition` - Rendition rules and registry
//! - `vellum_registry` - Store handles and registry
//! - `vellum_resolver` - Resolution engine
//!
//! This crate re-exports everything and adds configuration loading and logging
//! setup for applications wiring the stores at startup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod logging;

pub use config::{LogFormat, LoggingConfig, StoreConfig, VellumConfig};
pub use logging::init_logging;

pub use vellum_core::*;
pub use vellum_error::*;
pub use vellum_registry::{
    Capability, ContentReference, StoreHandle, StoreRegistry, StoreRegistryBuilder,
    default_store_path,
};
pub use vellum_rendition::{
    FnRenderer, PlainTextToHtml, Renderer, RenditionRegistry, RenditionRegistryBuilder,
    RenditionRule,
};
pub use vellum_resolver::{PlanOrigin, Resolution, ResourcePlan, Resolver};
pub use vellum_storage::{
    BackendKind, FileSystemStorage, IndexedStorage, IndexedStorageConfig,
    IndexedStorageConfigBuilder, MemoryStorage, ObjectStorage, ObjectStorageConfig,
    ObjectStorageConfigBuilder, Resource, ResourceBackend, StoredContent, validate_content_id,
};
