//! Startup-built store registry.

use crate::{Capability, ContentReference, StoreHandle};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use vellum_core::{ContentEntity, ContentSubject, DescriptorEntry, EntityType, SchemaCache};
use vellum_error::{RegistryError, RegistryErrorKind};

/// Collects store handles during startup.
///
/// Every check happens at registration, so a built registry is never ambiguous.
#[derive(Debug, Default)]
pub struct StoreRegistryBuilder {
    stores: Vec<Arc<StoreHandle>>,
    schemas: SchemaCache,
}

impl StoreRegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store.
    ///
    /// # Errors
    ///
    /// - `InvalidStore` if the name or path is blank
    /// - `DuplicateStore` if the entity type already has a store
    /// - `DuplicateStoreName` if the name or REST path is taken
    #[tracing::instrument(
        skip(self, handle),
        fields(store = %handle.name(), entity_type = handle.entity_type().simple_name())
    )]
    pub fn register(&mut self, handle: StoreHandle) -> Result<&mut Self, RegistryError> {
        if handle.name().trim().is_empty() || handle.path().trim().is_empty() {
            return Err(RegistryError::new(RegistryErrorKind::InvalidStore(format!(
                "store for {} needs a name and a path",
                handle.entity_type()
            ))));
        }

        for existing in &self.stores {
            if existing.entity_type() == handle.entity_type() {
                return Err(RegistryError::new(RegistryErrorKind::DuplicateStore {
                    entity_type: handle.entity_type().to_string(),
                    existing: existing.name().to_string(),
                }));
            }
            if existing.name() == handle.name() {
                return Err(RegistryError::new(RegistryErrorKind::DuplicateStoreName(
                    handle.name().to_string(),
                )));
            }
            if existing.path() == handle.path() {
                return Err(RegistryError::new(RegistryErrorKind::DuplicateStoreName(
                    format!("path '{}'", handle.path()),
                )));
            }
        }

        self.schemas.insert(handle.entity_type(), handle.schema_fn());
        tracing::info!(path = %handle.path(), backend = %handle.backend().kind(), "Registered store");
        self.stores.push(Arc::new(handle));
        Ok(self)
    }

    /// Publish the registry.
    pub fn build(self) -> StoreRegistry {
        let mut by_type = HashMap::new();
        let mut by_name = HashMap::new();
        let mut by_path = HashMap::new();
        for (index, store) in self.stores.iter().enumerate() {
            by_type.insert(store.entity_type().id(), index);
            by_name.insert(store.name().to_string(), index);
            by_path.insert(store.path().to_string(), index);
        }
        tracing::info!(
            stores = self.stores.len(),
            schemas = self.schemas.len(),
            "Store registry ready"
        );
        StoreRegistry {
            stores: self.stores,
            by_type,
            by_name,
            by_path,
            schemas: self.schemas,
        }
    }
}

/// Immutable map from entity types, names and paths to store handles.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: Vec<Arc<StoreHandle>>,
    by_type: HashMap<TypeId, usize>,
    by_name: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
    schemas: SchemaCache,
}

impl StoreRegistry {
    /// Create a builder.
    pub fn builder() -> StoreRegistryBuilder {
        StoreRegistryBuilder::new()
    }

    /// Store owning `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns `StoreNotFound` if no store owns the type.
    pub fn lookup_by_entity_type(
        &self,
        entity_type: &EntityType,
    ) -> Result<&Arc<StoreHandle>, RegistryError> {
        self.by_type
            .get(&entity_type.id())
            .map(|&index| &self.stores[index])
            .ok_or_else(|| {
                RegistryError::new(RegistryErrorKind::StoreNotFound(format!(
                    "entity type {}",
                    entity_type
                )))
            })
    }

    /// Store owning `T`.
    ///
    /// # Errors
    ///
    /// Returns `StoreNotFound` if no store owns the type.
    pub fn lookup<T: ContentEntity>(&self) -> Result<&Arc<StoreHandle>, RegistryError> {
        self.lookup_by_entity_type(&EntityType::of::<T>())
    }

    /// Store registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `StoreNotFound` if no store has the name.
    pub fn lookup_by_name(&self, name: &str) -> Result<&Arc<StoreHandle>, RegistryError> {
        self.by_name
            .get(name)
            .map(|&index| &self.stores[index])
            .ok_or_else(|| RegistryError::new(RegistryErrorKind::StoreNotFound(name.to_string())))
    }

    /// Store exposed under REST path `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreNotFound` if no store has the path.
    pub fn lookup_by_path(&self, path: &str) -> Result<&Arc<StoreHandle>, RegistryError> {
        self.by_path
            .get(path)
            .map(|&index| &self.stores[index])
            .ok_or_else(|| {
                RegistryError::new(RegistryErrorKind::StoreNotFound(format!("path '{}'", path)))
            })
    }

    /// Stores offering `capability`, in registration order.
    pub fn all_stores(&self, capability: Capability) -> Vec<&Arc<StoreHandle>> {
        self.stores
            .iter()
            .filter(|store| store.supports(capability))
            .collect()
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// No stores registered.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Content schemas of every registered type and the types they reach.
    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// Content references of `entity` and of its content-bearing properties.
    ///
    /// Descriptors without a content id, or whose type has no store, are skipped.
    /// `T` need not have a store of its own; its declared schema is used when it
    /// is not cached.
    pub fn content_references<T: ContentEntity>(&self, entity: &T) -> Vec<ContentReference> {
        self.references_from(self.schemas.collect_entity_descriptors(entity))
    }

    /// [`StoreRegistry::content_references`] for a type-erased subject.
    pub fn content_references_of(
        &self,
        entity_type: EntityType,
        subject: &dyn ContentSubject,
    ) -> Vec<ContentReference> {
        self.references_from(self.schemas.collect_descriptors(entity_type, subject))
    }

    fn references_from(&self, entries: Vec<DescriptorEntry>) -> Vec<ContentReference> {
        entries
            .into_iter()
            .filter_map(|entry| {
                let content_id = entry.descriptor.content_id()?.clone();
                let store = match self.lookup_by_entity_type(&entry.entity_type) {
                    Ok(store) => store,
                    Err(_) => {
                        tracing::debug!(
                            entity_type = entry.entity_type.simple_name(),
                            "No store owns content-bearing type"
                        );
                        return None;
                    }
                };
                Some(ContentReference {
                    property: entry.path,
                    store: store.name().to_string(),
                    content_id,
                    media_type: entry.descriptor.media_type().cloned(),
                })
            })
            .collect()
    }
}
