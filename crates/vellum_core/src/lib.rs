//! Core data types for the Vellum content store.
//!
//! This crate provides the value types shared by every other Vellum crate:
//!
//! - [`MediaType`] - parsed media types with wildcard inclusion and Accept-style ordering
//! - [`ContentId`] - stable identifier of stored bytes
//! - [`ContentDescriptor`] - the content-bearing view of an entity or nested property
//! - [`ContentSubject`] / [`ContentEntity`] - the capability an entity implements instead
//!   of being scanned for annotated fields
//! - [`ContentSchema`] / [`SchemaCache`] - declared content-bearing fields, resolved once
//!   per entity type
//! - [`ContentStream`] - the chunked byte stream every backend and renderer speaks

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod content_id;
mod descriptor;
mod media_type;
mod schema;
mod stream;

pub use content_id::ContentId;
pub use descriptor::ContentDescriptor;
pub use media_type::{MediaType, parse_accept, sort_by_specificity_and_quality};
pub use schema::{
    Cardinality, ContentEntity, ContentField, ContentSchema, ContentSubject, DescriptorEntry,
    EntityType, PropertyValue, SchemaCache,
};
pub use stream::{CHUNK_SIZE, ContentStream, collect_stream, stream_from_bytes};
