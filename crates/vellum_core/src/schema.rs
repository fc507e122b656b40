//! Content capability traits and declared content schemas.
//!
//! Entities opt in to content handling by implementing [`ContentSubject`] (what the
//! resolver calls per request) and [`ContentEntity`] (the static schema, read once
//! when a store is registered). Nested content lives in declared fields with a
//! [`Cardinality`], so descriptor extraction walks a cached [`ContentSchema`] rather
//! than inspecting the value's structure on every request.

use crate::ContentDescriptor;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Runtime tag for a Rust entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
}

impl EntityType {
    /// Tag for `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Underlying type id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without module path or generic arguments, e.g. `Document`.
    pub fn simple_name(&self) -> &'static str {
        let without_generics = self.name.split('<').next().unwrap_or(self.name);
        without_generics
            .rsplit("::")
            .next()
            .unwrap_or(without_generics)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How many content-bearing values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Cardinality {
    /// Exactly zero or one value
    #[display("single")]
    Single,
    /// Fixed-size array of values
    #[display("array")]
    Array,
    /// Growable collection of values
    #[display("collection")]
    Collection,
}

/// A value of a content-bearing property.
pub enum PropertyValue<'a> {
    /// Single nested subject
    Single(&'a dyn ContentSubject),
    /// Elements of an array or collection
    Many(Vec<&'a dyn ContentSubject>),
}

impl<'a> PropertyValue<'a> {
    /// All subjects held by the property.
    pub fn elements(&self) -> Vec<&'a dyn ContentSubject> {
        match self {
            PropertyValue::Single(subject) => vec![*subject],
            PropertyValue::Many(subjects) => subjects.clone(),
        }
    }
}

/// Per-request capability: expose a content descriptor and nested properties.
///
/// Returning `None` from [`ContentSubject::descriptor`] declares that this value does
/// not carry content at all; the resolver answers "not applicable" for it.
pub trait ContentSubject: Send + Sync {
    /// This value's own content descriptor, if its type carries content.
    fn descriptor(&self) -> Option<ContentDescriptor> {
        None
    }

    /// Value of a declared content-bearing field. `None` when the field is unset.
    fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
        let _ = name;
        None
    }
}

/// Static capability: declare which fields hold nested content.
pub trait ContentEntity: ContentSubject + 'static {
    /// Declared content-bearing fields. Read once per type and cached.
    fn schema() -> ContentSchema
    where
        Self: Sized,
    {
        ContentSchema::new()
    }
}

/// One declared content-bearing field.
#[derive(Clone)]
pub struct ContentField {
    name: &'static str,
    cardinality: Cardinality,
    element: EntityType,
    element_schema: fn() -> ContentSchema,
}

impl ContentField {
    /// Field holding at most one `T`.
    pub fn single<T: ContentEntity>(name: &'static str) -> Self {
        Self::with_cardinality::<T>(name, Cardinality::Single)
    }

    /// Field holding an array of `T`.
    pub fn array<T: ContentEntity>(name: &'static str) -> Self {
        Self::with_cardinality::<T>(name, Cardinality::Array)
    }

    /// Field holding a collection of `T`.
    pub fn collection<T: ContentEntity>(name: &'static str) -> Self {
        Self::with_cardinality::<T>(name, Cardinality::Collection)
    }

    fn with_cardinality<T: ContentEntity>(name: &'static str, cardinality: Cardinality) -> Self {
        Self {
            name,
            cardinality,
            element: EntityType::of::<T>(),
            element_schema: T::schema,
        }
    }

    /// Field name as passed to [`ContentSubject::property`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared cardinality.
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Entity type of each element.
    pub fn element(&self) -> EntityType {
        self.element
    }
}

impl fmt::Debug for ContentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentField")
            .field("name", &self.name)
            .field("cardinality", &self.cardinality)
            .field("element", &self.element.simple_name())
            .finish()
    }
}

/// Declared content-bearing fields of one entity type.
///
/// # Examples
///
/// ```
/// use vellum_core::{Cardinality, ContentEntity, ContentField, ContentSchema, ContentSubject};
///
/// struct Page;
/// impl ContentSubject for Page {}
/// impl ContentEntity for Page {}
///
/// struct Book;
/// impl ContentSubject for Book {}
/// impl ContentEntity for Book {
///     fn schema() -> ContentSchema {
///         ContentSchema::new()
///             .field(ContentField::single::<Page>("cover"))
///             .field(ContentField::collection::<Page>("pages"))
///     }
/// }
///
/// let schema = Book::schema();
/// assert_eq!(schema.get("pages").unwrap().cardinality(), Cardinality::Collection);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContentSchema {
    fields: Vec<ContentField>,
}

impl ContentSchema {
    /// Schema with no content-bearing fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn field(mut self, field: ContentField) -> Self {
        self.fields.push(field);
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[ContentField] {
        &self.fields
    }

    /// Look a field up by name.
    pub fn get(&self, name: &str) -> Option<&ContentField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// No content-bearing fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A descriptor found while walking a subject, with the property path that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorEntry {
    /// Field names from the root subject; empty for the root itself
    pub path: Vec<&'static str>,
    /// Entity type of the subject that owns the descriptor
    pub entity_type: EntityType,
    /// The descriptor
    pub descriptor: ContentDescriptor,
}

/// Schemas resolved once per entity type, including every type reachable through
/// declared fields.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    schemas: HashMap<TypeId, Arc<ContentSchema>>,
}

impl SchemaCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache `T`'s schema and the schemas of all types it reaches.
    pub fn insert_entity<T: ContentEntity>(&mut self) {
        self.insert(EntityType::of::<T>(), T::schema);
    }

    /// Cache a schema and, recursively, those of its field element types.
    ///
    /// Types already cached are skipped, which also terminates self-referential
    /// schemas.
    pub fn insert(&mut self, entity_type: EntityType, schema: fn() -> ContentSchema) {
        if self.schemas.contains_key(&entity_type.id()) {
            return;
        }
        let schema = Arc::new(schema());
        tracing::debug!(
            entity_type = entity_type.simple_name(),
            fields = schema.fields().len(),
            "Caching content schema"
        );
        self.schemas.insert(entity_type.id(), Arc::clone(&schema));
        for field in schema.fields() {
            self.insert(field.element, field.element_schema);
        }
    }

    /// Cached schema for a type.
    pub fn get(&self, entity_type: &EntityType) -> Option<&Arc<ContentSchema>> {
        self.schemas.get(&entity_type.id())
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Nothing cached.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schema of `T`, from the cache when present, otherwise read from the type.
    pub fn schema_of<T: ContentEntity>(&self) -> Arc<ContentSchema> {
        self.schema_or(&EntityType::of::<T>(), T::schema)
    }

    fn schema_or(&self, entity_type: &EntityType, declared: fn() -> ContentSchema) -> Arc<ContentSchema> {
        match self.get(entity_type) {
            Some(schema) => Arc::clone(schema),
            None => Arc::new(declared()),
        }
    }

    /// Every descriptor reachable from `subject`, root first, fields in declaration
    /// order, elements in their stored order.
    ///
    /// A root type missing from the cache contributes only its own descriptor; use
    /// [`SchemaCache::collect_entity_descriptors`] when the type is known.
    pub fn collect_descriptors(
        &self,
        entity_type: EntityType,
        subject: &dyn ContentSubject,
    ) -> Vec<DescriptorEntry> {
        let schema = self.get(&entity_type).cloned();
        let mut entries = Vec::new();
        let mut path = Vec::new();
        self.walk(entity_type, schema, subject, &mut path, &mut entries);
        entries
    }

    /// [`SchemaCache::collect_descriptors`] for a typed entity.
    ///
    /// Types missing from the cache, the root included, fall back to their declared
    /// schema, so a parent without a store of its own still reaches nested content.
    pub fn collect_entity_descriptors<T: ContentEntity>(&self, entity: &T) -> Vec<DescriptorEntry> {
        let mut entries = Vec::new();
        let mut path = Vec::new();
        self.walk(
            EntityType::of::<T>(),
            Some(self.schema_of::<T>()),
            entity,
            &mut path,
            &mut entries,
        );
        entries
    }

    fn walk(
        &self,
        entity_type: EntityType,
        schema: Option<Arc<ContentSchema>>,
        subject: &dyn ContentSubject,
        path: &mut Vec<&'static str>,
        entries: &mut Vec<DescriptorEntry>,
    ) {
        if let Some(descriptor) = subject.descriptor() {
            entries.push(DescriptorEntry {
                path: path.clone(),
                entity_type,
                descriptor,
            });
        }

        let Some(schema) = schema else {
            return;
        };
        for field in schema.fields() {
            let Some(value) = subject.property(field.name) else {
                continue;
            };
            let element_schema = self.schema_or(&field.element, field.element_schema);
            path.push(field.name);
            for element in value.elements() {
                self.walk(
                    field.element,
                    Some(Arc::clone(&element_schema)),
                    element,
                    path,
                    entries,
                );
            }
            path.pop();
        }
    }
}
