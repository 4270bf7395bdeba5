//! # Polystore Core
//!
//! Entity contract validation for the Polystore persistence layer.
//!
//! This crate provides:
//! - Declarative type and field descriptors (no runtime reflection)
//! - Marker inspection and ancestor-chain field collection
//! - Entity contract validation with a process-wide, append-only registry
//! - Advisory backend schema checks through pluggable schema managers
//! - JSON type catalogs for registration-time descriptor loading
//!
//! Data marshaling, query translation and connection management live in
//! the backend crates; this crate only decides whether a type is a legally
//! shaped entity and what its persistent shape is.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
mod config;
pub mod descriptor;
pub mod diagnostics;
mod error;
pub mod hierarchy;
pub mod marker;
pub mod schema;
mod types;
pub mod validator;

pub use catalog::{CatalogReport, TypeCatalog, TypeDeclaration};
pub use config::{ShadowPolicy, ValidatorConfig};
pub use descriptor::{
    Constructor, FieldDescriptor, TypeDescriptor, TypeDescriptorBuilder, TypeInfo, Visibility,
};
pub use diagnostics::{Diagnostic, DiagnosticFeed, DiagnosticLevel, DiagnosticsSink, TracingSink};
pub use error::{
    CatalogError, ContractRule, CoreError, CoreResult, EntityDefinitionError, SchemaError,
    SchemaResult,
};
pub use hierarchy::{FieldHierarchyCollector, InclusionPolicy};
pub use marker::{AnnotationInspector, InheritanceStrategy, Marker, MarkerKind};
pub use schema::{
    EntityMetadata, MetadataMap, MetadataResolver, SchemaCheck, SchemaDelegate, SchemaManager,
    SchemaManagerFactory, SchemaManagerRegistry,
};
pub use types::{PersistenceUnit, TypeKey};
pub use validator::{EntityShape, EntityValidator, IdentifierField, IdentifierKind, ValidationRegistry};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
