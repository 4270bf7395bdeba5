//! Error types for Polystore core.

use crate::types::{PersistenceUnit, TypeKey};
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for schema manager calls.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// The structural rule an entity definition violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractRule {
    /// The type must carry the entity marker.
    EntityMarker,
    /// The type must carry the table marker.
    TableMarker,
    /// The type must expose a public zero-argument constructor.
    DefaultConstructor,
    /// A field may not carry both the primary and embedded key markers.
    ExclusiveIdentifierMarkers,
    /// The type must declare an identifier field.
    IdentifierPresent,
    /// The type must declare exactly one identifier field.
    SingleIdentifier,
}

impl fmt::Display for ContractRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EntityMarker => "entity marker required",
            Self::TableMarker => "table marker required",
            Self::DefaultConstructor => "default constructor required",
            Self::ExclusiveIdentifierMarkers => "id and embedded id are exclusive",
            Self::IdentifierPresent => "identifier field required",
            Self::SingleIdentifier => "single identifier field required",
        };
        f.write_str(s)
    }
}

/// A type failed the entity contract.
///
/// Every variant is fatal for the offending type. Nothing is recorded in
/// the validation registry when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityDefinitionError {
    /// Missing entity marker.
    #[error("{type_name} is not marked as an entity")]
    NotAnEntity {
        /// The offending type.
        type_name: String,
    },

    /// Missing table marker.
    #[error("{type_name} must be marked with a table")]
    MissingTableMarker {
        /// The offending type.
        type_name: String,
    },

    /// No public zero-argument constructor.
    #[error("{type_name} must have a public no-argument constructor")]
    NoDefaultConstructor {
        /// The offending type.
        type_name: String,
    },

    /// A field carries both key markers.
    #[error("{type_name} must mark field '{field}' as either id or embedded id, not both")]
    ConflictingIdentifierMarkers {
        /// The offending type.
        type_name: String,
        /// The field carrying both markers.
        field: String,
    },

    /// No identifier field.
    #[error("{type_name} must have an id field")]
    NoIdentifierField {
        /// The offending type.
        type_name: String,
    },

    /// More than one identifier field.
    #[error("{type_name} can only have one id field, found {fields:?}")]
    MultipleIdentifierFields {
        /// The offending type.
        type_name: String,
        /// Every identifier candidate, leaf first.
        fields: Vec<String>,
    },
}

impl EntityDefinitionError {
    /// The name of the offending type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::NotAnEntity { type_name }
            | Self::MissingTableMarker { type_name }
            | Self::NoDefaultConstructor { type_name }
            | Self::ConflictingIdentifierMarkers { type_name, .. }
            | Self::NoIdentifierField { type_name }
            | Self::MultipleIdentifierFields { type_name, .. } => type_name,
        }
    }

    /// The rule that was violated.
    #[must_use]
    pub fn rule(&self) -> ContractRule {
        match self {
            Self::NotAnEntity { .. } => ContractRule::EntityMarker,
            Self::MissingTableMarker { .. } => ContractRule::TableMarker,
            Self::NoDefaultConstructor { .. } => ContractRule::DefaultConstructor,
            Self::ConflictingIdentifierMarkers { .. } => ContractRule::ExclusiveIdentifierMarkers,
            Self::NoIdentifierField { .. } => ContractRule::IdentifierPresent,
            Self::MultipleIdentifierFields { .. } => ContractRule::SingleIdentifier,
        }
    }
}

/// Errors raised while linking a type catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two declarations share a name.
    #[error("type {0} is declared more than once")]
    DuplicateType(TypeKey),

    /// A declaration extends a type that is not in the catalog.
    #[error("type {ty} extends unknown type {parent}")]
    UnknownParent {
        /// The declaring type.
        ty: TypeKey,
        /// The missing parent.
        parent: TypeKey,
    },

    /// A declaration is its own ancestor.
    #[error("type {0} is part of a cyclic hierarchy")]
    CyclicHierarchy(TypeKey),
}

/// Errors reported by schema managers and their factory.
///
/// These never escape a schema check; they are downgraded to
/// [`SchemaCheck::Unavailable`](crate::schema::SchemaCheck::Unavailable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No client is configured for the persistence unit.
    #[error("no schema manager for persistence unit {0}")]
    UnknownPersistenceUnit(PersistenceUnit),

    /// The backend could not answer.
    #[error("schema backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl SchemaError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Errors that can occur in Polystore core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A type failed the entity contract.
    #[error("invalid entity definition: {0}")]
    Definition(#[from] EntityDefinitionError),

    /// A type catalog could not be linked.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Declarations could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
