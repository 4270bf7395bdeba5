//! Type descriptors and their builder.

use super::{Constructor, FieldDescriptor, TypeInfo};
use crate::marker::Marker;
use crate::types::TypeKey;
use std::sync::Arc;

/// A declaratively built description of a candidate persistable type.
///
/// Descriptors are immutable once built and shared via `Arc`, so a parent
/// can be referenced by any number of subtypes.
///
/// # Example
///
/// ```rust
/// use polystore_core::{FieldDescriptor, Marker, TypeDescriptor};
///
/// let photographer = TypeDescriptor::builder("pickr::Photographer")
///     .marker(Marker::Entity)
///     .marker(Marker::table("photographers"))
///     .default_constructor()
///     .field(FieldDescriptor::new("id", "u32").id())
///     .field(FieldDescriptor::new("name", "String"))
///     .build();
///
/// assert_eq!(photographer.declared_fields().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    key: TypeKey,
    markers: Vec<Marker>,
    constructors: Vec<Constructor>,
    fields: Vec<FieldDescriptor>,
    parent: Option<Arc<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Starts building a descriptor for the type named `name`.
    pub fn builder(name: impl Into<TypeKey>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(name.into())
    }

    /// Returns the parent descriptor, if any.
    #[must_use]
    pub fn parent_descriptor(&self) -> Option<&Arc<TypeDescriptor>> {
        self.parent.as_ref()
    }

    /// Fields declared directly on this type.
    #[must_use]
    pub fn declared_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

impl TypeInfo for TypeDescriptor {
    fn key(&self) -> &TypeKey {
        &self.key
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }

    fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    fn declared_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    fn parent(&self) -> Option<&dyn TypeInfo> {
        self.parent.as_deref().map(|p| p as &dyn TypeInfo)
    }
}

/// Builder for [`TypeDescriptor`].
#[derive(Debug, Clone)]
pub struct TypeDescriptorBuilder {
    key: TypeKey,
    markers: Vec<Marker>,
    constructors: Vec<Constructor>,
    fields: Vec<FieldDescriptor>,
    parent: Option<Arc<TypeDescriptor>>,
}

impl TypeDescriptorBuilder {
    fn new(key: TypeKey) -> Self {
        Self {
            key,
            markers: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            parent: None,
        }
    }

    /// Adds a type-level marker.
    #[must_use]
    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Marks the type as an entity.
    #[must_use]
    pub fn entity(self) -> Self {
        self.marker(Marker::Entity)
    }

    /// Names the backing table.
    #[must_use]
    pub fn table(self, name: impl Into<String>) -> Self {
        self.marker(Marker::table(name))
    }

    /// Adds a constructor.
    #[must_use]
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Adds a public, zero-argument constructor.
    #[must_use]
    pub fn default_constructor(self) -> Self {
        self.constructor(Constructor::default_public())
    }

    /// Declares a field on this type.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the immediate ancestor.
    #[must_use]
    pub fn extends(mut self, parent: Arc<TypeDescriptor>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Finishes the descriptor, stamping each field with its declaring type.
    #[must_use]
    pub fn build(self) -> Arc<TypeDescriptor> {
        let key = self.key;
        let fields = self
            .fields
            .into_iter()
            .map(|mut f| {
                f.declared_by = Some(key.clone());
                f
            })
            .collect();

        Arc::new(TypeDescriptor {
            key,
            markers: self.markers,
            constructors: self.constructors,
            fields,
            parent: self.parent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_stamps_declaring_type() {
        let ty = TypeDescriptor::builder("Photo")
            .field(FieldDescriptor::new("id", "u64").id())
            .field(FieldDescriptor::new("caption", "String"))
            .build();

        for field in ty.declared_fields() {
            assert_eq!(field.declared_by.as_ref(), Some(ty.key()));
        }
    }

    #[test]
    fn parent_is_exposed_through_type_info() {
        let base = TypeDescriptor::builder("Base").build();
        let leaf = TypeDescriptor::builder("Leaf").extends(base.clone()).build();

        let info: &dyn TypeInfo = &*leaf;
        assert_eq!(info.parent().map(|p| p.name()), Some("Base"));
        assert!(info.parent().and_then(|p| p.parent()).is_none());
    }

    #[test]
    fn root_has_no_parent() {
        let root = TypeDescriptor::builder("Root").build();
        assert!(root.parent_descriptor().is_none());
        assert!(TypeInfo::parent(&*root).is_none());
    }
}
