//! The persistent shape of a validated entity.

use crate::descriptor::FieldDescriptor;
use crate::types::TypeKey;

/// Which key marker an identifier field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// Primary key (`Marker::Id`).
    Primary,
    /// Embedded composite key (`Marker::EmbeddedId`).
    Embedded,
}

/// The field carrying an entity's key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierField {
    /// The key field.
    pub field: FieldDescriptor,
    /// Which key marker it carries.
    pub kind: IdentifierKind,
}

impl IdentifierField {
    /// The key field's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.field.name
    }
}

/// Everything the persistence layer needs to know about a valid entity.
///
/// Built once, on first successful validation, and shared through the
/// validation registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityShape {
    /// Identity of the entity type.
    pub key: TypeKey,
    /// Unqualified entity name.
    pub entity_name: String,
    /// Backing table, collection or column family.
    pub table: String,
    /// Optional keyspace or schema qualifier.
    pub schema: Option<String>,
    /// The key field.
    pub identifier: IdentifierField,
    /// Effective persistent fields, leaf first.
    pub fields: Vec<FieldDescriptor>,
}

impl EntityShape {
    /// Looks up a persistent field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Stored column names, in field order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldDescriptor::column_name).collect()
    }

    /// Table name qualified by schema, when one is set.
    #[must_use]
    pub fn qualified_table(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }
}
