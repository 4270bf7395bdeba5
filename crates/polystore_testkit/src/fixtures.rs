//! Fixture types and helpers.
//!
//! The fixtures model a small photo-sharing application ("pickr") whose
//! entities are spread over several persistence units.

use polystore_core::{
    Constructor, EntityMetadata, EntityValidator, FieldDescriptor, Marker, MetadataMap,
    SchemaDelegate, SchemaManager, SchemaManagerRegistry, TypeDescriptor, TypeInfo,
    ValidationRegistry, Visibility,
};
use std::sync::Arc;

/// Persistence units used by the fixtures.
pub const PICKR_UNITS: [&str; 3] = ["piccandra", "picmysql", "picongo"];

/// Creates a validator over its own, empty registry.
pub fn fresh_validator() -> EntityValidator {
    EntityValidator::new().with_registry(Arc::new(ValidationRegistry::new()))
}

/// A valid entity: entity and table markers, default constructor and a
/// single `id` key.
pub fn photographer() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Photographer")
        .entity()
        .table("photographers")
        .default_constructor()
        .field(FieldDescriptor::new("id", "u32").id())
        .field(FieldDescriptor::new("name", "String"))
        .build()
}

/// An entity missing its table marker.
pub fn photo_without_table() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Photo")
        .entity()
        .default_constructor()
        .field(FieldDescriptor::new("id", "String").id())
        .field(FieldDescriptor::new("caption", "String"))
        .build()
}

/// A mapped superclass carrying audit columns.
pub fn audited() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Audited")
        .marker(Marker::MappedSuperclass)
        .field(FieldDescriptor::new("created_at", "u64").column("created"))
        .field(FieldDescriptor::new("updated_at", "u64").column("updated"))
        .build()
}

/// A valid entity inheriting audit fields, with an embedded key.
pub fn album() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Album")
        .entity()
        .marker(Marker::Table {
            name: "albums".into(),
            schema: Some("Pickr".into()),
        })
        .default_constructor()
        .constructor(Constructor::new(Visibility::Public, ["String", "String"]))
        .field(FieldDescriptor::new("key", "AlbumKey").embedded_id())
        .field(FieldDescriptor::new("title", "String"))
        .field(FieldDescriptor::new("cover", "Vec<u8>").transient())
        .extends(audited())
        .build()
}

/// An entity with only a non-public no-arg constructor.
pub fn sealed_entity() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Sealed")
        .entity()
        .table("sealed")
        .constructor(Constructor::new(Visibility::Private, Vec::<String>::new()))
        .field(FieldDescriptor::new("id", "u64").id())
        .build()
}

/// An entity whose only key field carries both key markers.
pub fn conflicting_key_entity() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Tag")
        .entity()
        .table("tags")
        .default_constructor()
        .field(FieldDescriptor::new("key", "TagKey").id().embedded_id())
        .build()
}

/// An entity with two separate key fields.
pub fn two_key_entity() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Comment")
        .entity()
        .table("comments")
        .default_constructor()
        .field(FieldDescriptor::new("id", "u64").id())
        .field(FieldDescriptor::new("slug", "String").id())
        .build()
}

/// An entity with no key field.
pub fn keyless_entity() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Like")
        .entity()
        .table("likes")
        .default_constructor()
        .field(FieldDescriptor::new("count", "u64"))
        .build()
}

/// A type without any markers.
pub fn plain_type() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("pickr::Thumbnail")
        .table("thumbnails")
        .default_constructor()
        .field(FieldDescriptor::new("id", "u64").id())
        .build()
}

/// A `Root -> Mid -> Leaf` chain where only `Mid` carries an inclusion
/// marker. Returns `(root, mid, leaf)`.
pub fn three_level_chain() -> (Arc<TypeDescriptor>, Arc<TypeDescriptor>, Arc<TypeDescriptor>) {
    let root = TypeDescriptor::builder("chain::Root")
        .field(FieldDescriptor::new("root_note", "String"))
        .build();
    let mid = TypeDescriptor::builder("chain::Mid")
        .marker(Marker::inheritance())
        .field(FieldDescriptor::new("id", "u64").id())
        .field(FieldDescriptor::new("kind", "String"))
        .extends(Arc::clone(&root))
        .build();
    let leaf = TypeDescriptor::builder("chain::Leaf")
        .entity()
        .table("leaves")
        .default_constructor()
        .field(FieldDescriptor::new("payload", "Vec<u8>"))
        .extends(Arc::clone(&mid))
        .build();
    (root, mid, leaf)
}

/// Binds every given type to `unit`.
pub fn metadata_for(types: &[&TypeDescriptor], unit: &str) -> MetadataMap {
    let map = MetadataMap::new();
    for ty in types {
        map.bind(ty.key().clone(), EntityMetadata::new(unit));
    }
    map
}

/// Builds a schema delegate where every type in `types` is bound to
/// `unit`, served by `manager`.
pub fn schema_delegate(
    types: &[&TypeDescriptor],
    unit: &str,
    manager: Arc<dyn SchemaManager>,
) -> SchemaDelegate {
    let managers = SchemaManagerRegistry::new();
    managers.register(unit, manager);
    SchemaDelegate::new(Arc::new(metadata_for(types, unit)), Arc::new(managers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_linked() {
        let (root, mid, leaf) = three_level_chain();
        assert_eq!(leaf.parent().map(|p| p.name()), Some(mid.name()));
        assert_eq!(mid.parent().map(|p| p.name()), Some(root.name()));
        assert!(root.parent().is_none());
    }

    #[test]
    fn fixture_names_are_qualified() {
        assert_eq!(photographer().key().simple_name(), "Photographer");
        assert_eq!(photo_without_table().key().simple_name(), "Photo");
    }
}
