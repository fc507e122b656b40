//! The resolution engine.

use crate::{PlanOrigin, Resolution, ResourcePlan};
use std::sync::Arc;
use vellum_core::{
    ContentDescriptor, ContentEntity, ContentId, ContentStream, ContentSubject, EntityType,
    MediaType, PropertyValue, sort_by_specificity_and_quality,
};
use vellum_error::{StorageError, StorageErrorKind, StorageResult};
use vellum_registry::{StoreHandle, StoreRegistry};
use vellum_rendition::{RenditionRegistry, RenditionRule};
use vellum_storage::{Resource, StoredContent};

/// Stateless resolver over published store and rendition registries.
///
/// Cheap to clone and safe to share; no lock is held across backend or renderer
/// calls.
#[derive(Debug, Clone)]
pub struct Resolver {
    stores: Arc<StoreRegistry>,
    renditions: Arc<RenditionRegistry>,
}

/// Result of opening stored bytes for one candidate.
enum Opened {
    Resource(Resource),
    Missing,
}

impl Resolver {
    /// Create a resolver over published registries.
    pub fn new(stores: Arc<StoreRegistry>, renditions: Arc<RenditionRegistry>) -> Self {
        Self { stores, renditions }
    }

    /// Store registry this resolver reads.
    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    /// Rendition registry this resolver reads.
    pub fn renditions(&self) -> &RenditionRegistry {
        &self.renditions
    }

    /// Resolve `subject` against `accept` using `store`.
    ///
    /// # Errors
    ///
    /// Returns an `Unavailable` storage error if the backend fails for a reason
    /// other than missing content. Renderer failures never surface here; the
    /// candidate is skipped instead.
    #[tracing::instrument(skip(self, store, subject, accept), fields(store = %store.name()))]
    pub async fn resolve(
        &self,
        store: &StoreHandle,
        subject: &dyn ContentSubject,
        accept: &[MediaType],
    ) -> StorageResult<Resolution> {
        let Some(descriptor) = subject.descriptor() else {
            tracing::debug!("Subject carries no content");
            return Ok(Resolution::NotApplicable);
        };
        let Some(stored_type) = descriptor.media_type() else {
            tracing::debug!("Content has no declared media type");
            return Ok(Resolution::NotApplicable);
        };
        let Some(content_id) = descriptor.content_id() else {
            tracing::debug!("No content stored yet");
            return Ok(Resolution::NotFound);
        };

        let mut candidates = accept.to_vec();
        sort_by_specificity_and_quality(&mut candidates);

        for candidate in &candidates {
            if candidate.quality() <= 0.0 {
                tracing::debug!(candidate = %candidate, "Skipping unacceptable candidate");
                continue;
            }

            if candidate.includes(stored_type) {
                tracing::debug!(candidate = %candidate, stored = %stored_type, "Direct match");
                return match self.open(store, content_id).await? {
                    Opened::Resource(resource) => {
                        let length = resource.length();
                        Ok(Resolution::Resolved(ResourcePlan::new(
                            content_id.clone(),
                            stored_type.without_quality(),
                            PlanOrigin::Stored,
                            length,
                            resource.into_stream(),
                        )))
                    }
                    Opened::Missing => Ok(Resolution::NotFound),
                };
            }

            if !store.supports_renditions() {
                continue;
            }
            let Some(rule) = self.renditions.find_rule(store.name(), stored_type, candidate)
            else {
                continue;
            };

            let source = match self.open(store, content_id).await? {
                Opened::Resource(resource) => resource.into_stream(),
                Opened::Missing => return Ok(Resolution::NotFound),
            };
            if let Some(plan) = Self::render(rule, source, content_id, stored_type, candidate).await
            {
                return Ok(Resolution::Resolved(plan));
            }
        }

        tracing::debug!(candidates = candidates.len(), "No candidate satisfied");
        Ok(Resolution::NotFound)
    }

    /// Resolve an entity's own content using the store that owns its type.
    ///
    /// A type with no store is `NotApplicable`.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub async fn resolve_entity<T: ContentEntity>(
        &self,
        entity: &T,
        accept: &[MediaType],
    ) -> StorageResult<Resolution> {
        match self.stores.lookup::<T>() {
            Ok(store) => self.resolve(store, entity, accept).await,
            Err(e) => {
                tracing::debug!(error = %e, "No store for entity type");
                Ok(Resolution::NotApplicable)
            }
        }
    }

    /// Resolve the content of a declared property of `entity`.
    ///
    /// For array and collection properties `content_id` selects the element; for a
    /// single property it must match when given. The store owning the property's
    /// element type serves the bytes.
    ///
    /// - An undeclared property, or one whose type has no store, is `NotApplicable`
    /// - An unset property or an unmatched element is `NotFound`
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    #[tracing::instrument(skip(self, entity, content_id, accept), fields(entity_type = EntityType::of::<T>().simple_name()))]
    pub async fn resolve_property<T: ContentEntity>(
        &self,
        entity: &T,
        property: &str,
        content_id: Option<&ContentId>,
        accept: &[MediaType],
    ) -> StorageResult<Resolution> {
        let schema = self.stores.schemas().schema_of::<T>();
        let Some(field) = schema.get(property).cloned() else {
            tracing::debug!("Property is not a declared content field");
            return Ok(Resolution::NotApplicable);
        };
        let store = match self.stores.lookup_by_entity_type(&field.element()) {
            Ok(store) => store,
            Err(e) => {
                tracing::debug!(error = %e, "No store for property type");
                return Ok(Resolution::NotApplicable);
            }
        };

        let Some(value) = entity.property(property) else {
            return Ok(Resolution::NotFound);
        };
        let element = match (value, content_id) {
            (PropertyValue::Single(element), None) => Some(element),
            (value, Some(wanted)) => value.elements().into_iter().find(|element| {
                element
                    .descriptor()
                    .is_some_and(|d| d.content_id() == Some(wanted))
            }),
            (PropertyValue::Many(_), None) => None,
        };

        match element {
            Some(element) => self.resolve(store, element, accept).await,
            None => {
                tracing::debug!("No property element matches");
                Ok(Resolution::NotFound)
            }
        }
    }

    /// Write `body` to `store` and record the write on `descriptor`.
    ///
    /// The first write assigns the content id; later writes replace the bytes under
    /// the same id.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or `ContentIdMismatch` if the backend stored the
    /// bytes under an id other than the one on record. `descriptor` is unchanged in
    /// either case.
    #[tracing::instrument(skip(self, store, descriptor, body), fields(store = %store.name(), media_type = %media_type))]
    pub async fn store_content(
        &self,
        store: &StoreHandle,
        descriptor: &mut ContentDescriptor,
        media_type: MediaType,
        body: ContentStream,
    ) -> StorageResult<StoredContent> {
        let stored = store
            .backend()
            .set_resource(descriptor.content_id(), body)
            .await?;
        if !descriptor.record_write(stored.content_id.clone(), media_type, stored.length) {
            return Err(StorageError::new(StorageErrorKind::ContentIdMismatch {
                recorded: descriptor
                    .content_id()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                returned: stored.content_id.to_string(),
            }));
        }
        tracing::info!(content_id = %stored.content_id, length = stored.length, "Content stored");
        Ok(stored)
    }

    /// Delete the bytes behind `descriptor` and clear its type and length.
    ///
    /// The content id is kept so a later write reuses it. Unsetting content that was
    /// never stored is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend error; `descriptor` is unchanged in that case.
    #[tracing::instrument(skip(self, store, descriptor), fields(store = %store.name()))]
    pub async fn unset_content(
        &self,
        store: &StoreHandle,
        descriptor: &mut ContentDescriptor,
    ) -> StorageResult<()> {
        if let Some(content_id) = descriptor.content_id() {
            store.backend().delete_resource(content_id).await?;
            tracing::info!(content_id = %content_id, "Content unset");
        }
        descriptor.clear_content();
        Ok(())
    }

    /// Open stored bytes, folding missing content into [`Opened::Missing`] and any
    /// other failure into `Unavailable`.
    async fn open(&self, store: &StoreHandle, content_id: &ContentId) -> StorageResult<Opened> {
        match store.backend().get_resource(content_id).await {
            Ok(resource) => Ok(Opened::Resource(resource)),
            Err(e) if e.is_not_found() => {
                tracing::debug!(content_id = %content_id, "Stored bytes are missing");
                Ok(Opened::Missing)
            }
            Err(e) => match e.kind() {
                StorageErrorKind::InvalidContentId(_) => {
                    tracing::debug!(content_id = %content_id, "Content id unusable by backend");
                    Ok(Opened::Missing)
                }
                StorageErrorKind::Unavailable(_) => Err(e),
                _ => {
                    tracing::warn!(content_id = %content_id, error = %e, "Backend read failed");
                    Err(StorageError::new(StorageErrorKind::Unavailable(e.to_string())))
                }
            },
        }
    }

    async fn render(
        rule: &RenditionRule,
        source: ContentStream,
        content_id: &ContentId,
        stored_type: &MediaType,
        candidate: &MediaType,
    ) -> Option<ResourcePlan> {
        let target = rule.target_for(candidate);
        match rule.render(source, &target).await {
            Ok(body) => {
                tracing::debug!(target = %target, "Rendition produced");
                Some(ResourcePlan::new(
                    content_id.clone(),
                    target,
                    PlanOrigin::Rendition {
                        source: stored_type.without_quality(),
                    },
                    None,
                    body,
                ))
            }
            Err(e) => {
                tracing::warn!(target = %target, error = %e, "Rendition failed, trying next candidate");
                None
            }
        }
    }
}
