//! Field descriptors.

use crate::marker::{Marker, MarkerKind};
use crate::types::TypeKey;
use serde::{Deserialize, Serialize};

/// A field declared on a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as declared.
    pub name: String,
    /// Declared type name.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Markers on the field.
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// The type that declared this field. Filled in when the owning
    /// descriptor is built.
    #[serde(skip)]
    pub declared_by: Option<TypeKey>,
}

impl FieldDescriptor {
    /// Creates an unmarked field.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            markers: Vec::new(),
            declared_by: None,
        }
    }

    /// Adds a marker.
    #[must_use]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Marks the field as the primary key.
    #[must_use]
    pub fn id(self) -> Self {
        self.with_marker(Marker::Id)
    }

    /// Marks the field as an embedded key.
    #[must_use]
    pub fn embedded_id(self) -> Self {
        self.with_marker(Marker::EmbeddedId)
    }

    /// Marks the field transient.
    #[must_use]
    pub fn transient(self) -> Self {
        self.with_marker(Marker::Transient)
    }

    /// Overrides the stored column name.
    #[must_use]
    pub fn column(self, name: impl Into<String>) -> Self {
        self.with_marker(Marker::Column { name: name.into() })
    }

    /// Name used in the backend: the column override if present, else the
    /// field name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        self.markers
            .iter()
            .find_map(|m| match m {
                Marker::Column { name } if !name.is_empty() => Some(name.as_str()),
                _ => None,
            })
            .unwrap_or(&self.name)
    }

    /// Returns true if the field carries a marker of `kind`.
    #[must_use]
    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.iter().any(|m| m.kind() == kind)
    }
}
