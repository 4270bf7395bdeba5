//! Marker vocabulary and the annotation inspector.
//!
//! Markers are the declarative replacement for runtime annotations: each
//! type and field carries an explicit list of them, built once when the
//! descriptor is registered.

use crate::descriptor::{FieldDescriptor, TypeInfo};
use serde::{Deserialize, Serialize};

/// How an inheritance root maps its subtypes onto backend storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceStrategy {
    /// All subtypes share one table.
    #[default]
    SingleTable,
    /// Each subtype joins against its parent table.
    Joined,
    /// Each concrete subtype owns a full table.
    TablePerClass,
}

/// A marker attached to a type or field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marker {
    /// Declares the type persistable.
    Entity,
    /// Names the backing table, collection or column family.
    Table {
        /// Backing object name. Empty means "use the entity name".
        #[serde(default)]
        name: String,
        /// Optional keyspace, database or schema qualifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<String>,
    },
    /// Ancestor whose fields are mapped into every entity subtype.
    MappedSuperclass,
    /// Root of a persistent inheritance hierarchy.
    Inheritance {
        /// Storage strategy for subtypes.
        #[serde(default)]
        strategy: InheritanceStrategy,
    },
    /// Primary key field.
    Id,
    /// Embedded (composite) key field.
    EmbeddedId,
    /// Overrides the stored column name of a field.
    Column {
        /// Stored column name.
        name: String,
    },
    /// Field excluded from the persistent shape.
    Transient,
}

impl Marker {
    /// Returns the payload-free discriminant of this marker.
    #[must_use]
    pub const fn kind(&self) -> MarkerKind {
        match self {
            Self::Entity => MarkerKind::Entity,
            Self::Table { .. } => MarkerKind::Table,
            Self::MappedSuperclass => MarkerKind::MappedSuperclass,
            Self::Inheritance { .. } => MarkerKind::Inheritance,
            Self::Id => MarkerKind::Id,
            Self::EmbeddedId => MarkerKind::EmbeddedId,
            Self::Column { .. } => MarkerKind::Column,
            Self::Transient => MarkerKind::Transient,
        }
    }

    /// Creates a table marker without a schema qualifier.
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            schema: None,
        }
    }

    /// Creates a single-table inheritance marker.
    #[must_use]
    pub const fn inheritance() -> Self {
        Self::Inheritance {
            strategy: InheritanceStrategy::SingleTable,
        }
    }
}

/// Discriminant of [`Marker`], used for set membership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// See [`Marker::Entity`].
    Entity,
    /// See [`Marker::Table`].
    Table,
    /// See [`Marker::MappedSuperclass`].
    MappedSuperclass,
    /// See [`Marker::Inheritance`].
    Inheritance,
    /// See [`Marker::Id`].
    Id,
    /// See [`Marker::EmbeddedId`].
    EmbeddedId,
    /// See [`Marker::Column`].
    Column,
    /// See [`Marker::Transient`].
    Transient,
}

/// Answers whether types and fields carry given markers.
///
/// Stateless. Absence of a marker is not an error here; callers decide
/// what it means.
pub struct AnnotationInspector;

impl AnnotationInspector {
    /// Returns true if `ty` carries at least one marker of the given kinds.
    pub fn has_any(ty: &dyn TypeInfo, kinds: &[MarkerKind]) -> bool {
        contains_any(ty.markers(), kinds)
    }

    /// Returns true if `ty` carries a marker of `kind`.
    pub fn has(ty: &dyn TypeInfo, kind: MarkerKind) -> bool {
        Self::has_any(ty, &[kind])
    }

    /// Returns the first marker of `kind` on `ty`, if any.
    pub fn find(ty: &dyn TypeInfo, kind: MarkerKind) -> Option<&Marker> {
        ty.markers().iter().find(|m| m.kind() == kind)
    }

    /// Returns true if `field` carries at least one marker of the given kinds.
    #[must_use]
    pub fn field_has_any(field: &FieldDescriptor, kinds: &[MarkerKind]) -> bool {
        contains_any(&field.markers, kinds)
    }

    /// Returns true if `field` carries a marker of `kind`.
    #[must_use]
    pub fn field_has(field: &FieldDescriptor, kind: MarkerKind) -> bool {
        Self::field_has_any(field, &[kind])
    }
}

fn contains_any(markers: &[Marker], kinds: &[MarkerKind]) -> bool {
    markers.iter().any(|m| kinds.contains(&m.kind()))
}
