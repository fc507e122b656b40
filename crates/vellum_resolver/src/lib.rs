//! Content resolution engine.
//!
//! Given a content-bearing subject and a caller's acceptable media types, the
//! [`Resolver`] picks the single resource to stream back: the stored bytes when their
//! type is acceptable, otherwise a rendition computed on demand.
//!
//! # Scan order
//!
//! Candidates are sorted by specificity, then quality, keeping caller order for
//! ties. Each candidate is tried for a direct match first and a rendition second
//! before moving to the next one, so a rendition for a preferred type beats a
//! direct match for a less preferred one.
//!
//! # Outcomes
//!
//! - [`Resolution::Resolved`] with a [`ResourcePlan`]
//! - [`Resolution::NotApplicable`] when the subject carries no content
//! - [`Resolution::NotFound`] when nothing stored or renderable satisfies the request
//! - `Err` with `StorageErrorKind::Unavailable` when a backend failed
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vellum_core::{ContentDescriptor, ContentEntity, ContentSubject, MediaType, stream_from_bytes};
//! use vellum_registry::{StoreHandle, StoreRegistry};
//! use vellum_rendition::RenditionRegistry;
//! use vellum_resolver::{Resolution, Resolver};
//! use vellum_storage::MemoryStorage;
//!
//! #[derive(Default)]
//! struct Note {
//!     content: ContentDescriptor,
//! }
//!
//! impl ContentSubject for Note {
//!     fn descriptor(&self) -> Option<ContentDescriptor> {
//!         Some(self.content.clone())
//!     }
//! }
//!
//! impl ContentEntity for Note {}
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut stores = StoreRegistry::builder();
//! stores.register(StoreHandle::for_entity::<Note>("notes", Arc::new(MemoryStorage::new())))?;
//! let resolver = Resolver::new(Arc::new(stores.build()), Arc::new(RenditionRegistry::empty()));
//!
//! let mut note = Note::default();
//! let store = Arc::clone(resolver.stores().lookup::<Note>()?);
//! resolver
//!     .store_content(&store, &mut note.content, MediaType::text_plain(), stream_from_bytes(b"hi".to_vec()))
//!     .await?;
//!
//! let accept = vec!["text/*".parse::<MediaType>()?];
//! match resolver.resolve_entity(&note, &accept).await? {
//!     Resolution::Resolved(plan) => assert_eq!(plan.into_bytes().await?, b"hi"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod plan;
mod resolver;

pub use plan::{PlanOrigin, Resolution, ResourcePlan};
pub use resolver::Resolver;
