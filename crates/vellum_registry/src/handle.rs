//! Store handles.

use std::fmt;
use std::sync::Arc;
use vellum_core::{ContentEntity, ContentSchema, EntityType};
use vellum_storage::ResourceBackend;

/// Operations a store can be asked for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, derive_more::Display,
)]
pub enum Capability {
    /// Plain byte storage; every store has it
    #[display("storage")]
    Storage,
    /// On-demand renditions of stored content
    #[display("rendition")]
    Rendition,
}

/// Registry entry binding an entity type to its backend.
#[derive(Clone)]
pub struct StoreHandle {
    name: String,
    path: String,
    entity_type: EntityType,
    schema: fn() -> ContentSchema,
    backend: Arc<dyn ResourceBackend>,
    renditions: bool,
}

impl StoreHandle {
    /// Store for entity type `T`, with renditions enabled and the default REST path.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use vellum_core::{ContentEntity, ContentSubject};
    /// use vellum_registry::StoreHandle;
    /// use vellum_storage::MemoryStorage;
    ///
    /// struct Category;
    /// impl ContentSubject for Category {}
    /// impl ContentEntity for Category {}
    ///
    /// let handle = StoreHandle::for_entity::<Category>("categories", Arc::new(MemoryStorage::new()));
    /// assert_eq!(handle.path(), "categories");
    /// ```
    pub fn for_entity<T: ContentEntity>(
        name: impl Into<String>,
        backend: Arc<dyn ResourceBackend>,
    ) -> Self {
        let entity_type = EntityType::of::<T>();
        Self {
            name: name.into(),
            path: default_store_path(entity_type.simple_name()),
            entity_type,
            schema: T::schema,
            backend,
            renditions: true,
        }
    }

    /// Override the REST path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Enable or disable renditions for this store.
    pub fn with_renditions(mut self, enabled: bool) -> Self {
        self.renditions = enabled;
        self
    }

    /// Logical store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// REST path segment.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Entity type owned by this store.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Backend holding the bytes.
    pub fn backend(&self) -> &Arc<dyn ResourceBackend> {
        &self.backend
    }

    /// Renditions may be computed for this store's content.
    pub fn supports_renditions(&self) -> bool {
        self.renditions
    }

    /// Whether the store offers `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Storage => true,
            Capability::Rendition => self.renditions,
        }
    }

    pub(crate) fn schema_fn(&self) -> fn() -> ContentSchema {
        self.schema
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("entity_type", &self.entity_type.simple_name())
            .field("backend", &self.backend.kind())
            .field("renditions", &self.renditions)
            .finish()
    }
}

/// REST path for an entity type name: uncapitalised and pluralised.
///
/// ```
/// use vellum_registry::default_store_path;
///
/// assert_eq!(default_store_path("Document"), "documents");
/// assert_eq!(default_store_path("Category"), "categories");
/// assert_eq!(default_store_path("Box"), "boxes");
/// assert_eq!(default_store_path("BlogPost"), "blogPosts");
/// ```
pub fn default_store_path(simple_name: &str) -> String {
    let mut chars = simple_name.chars();
    let name = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    pluralize(&name)
}

fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        return format!("{}es", word);
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last();
        if before_y.is_some_and(|c| !"aeiouAEIOU".contains(c)) {
            return format!("{}ies", stem);
        }
    }
    format!("{}s", word)
}
