//! Renditions: on-demand conversion of stored content into another media type.
//!
//! A [`RenditionRule`] pairs a consumed media type pattern with the patterns it can
//! produce and a [`Renderer`] that does the work. Rules are grouped per store in a
//! [`RenditionRegistry`], built once through [`RenditionRegistryBuilder`] and read
//! concurrently afterwards.
//!
//! # Example
//!
//! ```
//! use vellum_core::MediaType;
//! use vellum_rendition::{PlainTextToHtml, RenditionRegistryBuilder};
//!
//! let registry = RenditionRegistryBuilder::new()
//!     .register("notes", PlainTextToHtml::rule())
//!     .build();
//!
//! let plain: MediaType = "text/plain".parse().unwrap();
//! let html: MediaType = "text/html".parse().unwrap();
//! assert!(registry.find_rule("notes", &plain, &html).is_some());
//! assert!(registry.find_rule("other", &plain, &html).is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builtin;
mod registry;
mod renderer;
mod rule;

pub use builtin::PlainTextToHtml;
pub use registry::{RenditionRegistry, RenditionRegistryBuilder};
pub use renderer::{FnRenderer, Renderer};
pub use rule::RenditionRule;
pub use vellum_error::{RenditionError, RenditionErrorKind};
