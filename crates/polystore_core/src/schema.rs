//! Advisory backend schema checks.
//!
//! After a type has been validated structurally, a caller may ask the
//! backend bound to the type's persistence unit whether its live schema
//! still matches. A mismatch never fails anything here: it is returned as
//! a [`SchemaCheck`] and reported as a warning, and the consequence is left
//! to whichever operation touches the backend next.
//!
//! Schema managers may perform network I/O. Timeouts and retries belong to
//! them, not to this module.

use crate::descriptor::TypeInfo;
use crate::diagnostics::{Diagnostic, DiagnosticsSink, TracingSink};
use crate::error::{SchemaError, SchemaResult};
use crate::types::{PersistenceUnit, TypeKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Persistence metadata resolved for an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    /// The persistence unit the entity is bound to.
    pub persistence_unit: PersistenceUnit,
}

impl EntityMetadata {
    /// Metadata binding an entity to `unit`.
    pub fn new(unit: impl Into<PersistenceUnit>) -> Self {
        Self {
            persistence_unit: unit.into(),
        }
    }
}

/// Resolves persistence metadata for a type.
pub trait MetadataResolver: Send + Sync {
    /// Returns the type's metadata, or `None` if it is not bound to any
    /// persistence unit.
    fn resolve(&self, ty: &dyn TypeInfo) -> Option<EntityMetadata>;
}

/// Backend-specific schema verification.
pub trait SchemaManager: Send + Sync {
    /// Returns whether the live schema matches `ty`'s expected shape.
    fn validate_entity(&self, ty: &dyn TypeInfo) -> SchemaResult<bool>;
}

/// Hands out the schema manager for a persistence unit.
pub trait SchemaManagerFactory: Send + Sync {
    /// Returns the schema manager serving `unit`.
    fn for_persistence_unit(&self, unit: &PersistenceUnit) -> SchemaResult<Arc<dyn SchemaManager>>;
}

/// Outcome of a schema check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaCheck {
    /// No metadata, or no delegate configured; nothing was checked.
    Skipped,
    /// The live schema matches.
    Matches {
        /// The consulted persistence unit.
        persistence_unit: PersistenceUnit,
    },
    /// The live schema does not match.
    Mismatch {
        /// The consulted persistence unit.
        persistence_unit: PersistenceUnit,
    },
    /// The schema manager could not be obtained or did not answer.
    Unavailable {
        /// The persistence unit that was asked.
        persistence_unit: PersistenceUnit,
        /// Why the check could not run.
        reason: String,
    },
}

impl SchemaCheck {
    /// Returns true for [`SchemaCheck::Mismatch`].
    #[must_use]
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }

    /// Returns true unless the backend reported a mismatch or could not
    /// be reached.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Skipped | Self::Matches { .. })
    }
}

/// Runs best-effort schema checks against the backend serving a type.
#[derive(Clone)]
pub struct SchemaDelegate {
    resolver: Arc<dyn MetadataResolver>,
    factory: Arc<dyn SchemaManagerFactory>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl SchemaDelegate {
    /// Creates a delegate reporting through `tracing`.
    pub fn new(resolver: Arc<dyn MetadataResolver>, factory: Arc<dyn SchemaManagerFactory>) -> Self {
        Self {
            resolver,
            factory,
            sink: Arc::new(TracingSink),
        }
    }

    /// Reports mismatches to `sink` instead.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Checks `ty` against its backend. Never fails.
    pub fn check_schema(&self, ty: &dyn TypeInfo) -> SchemaCheck {
        let Some(metadata) = self.resolver.resolve(ty) else {
            tracing::trace!(type_name = %ty.key(), "no persistence metadata, schema check skipped");
            return SchemaCheck::Skipped;
        };
        let unit = metadata.persistence_unit;

        let outcome = self
            .factory
            .for_persistence_unit(&unit)
            .and_then(|manager| manager.validate_entity(ty));

        match outcome {
            Ok(true) => SchemaCheck::Matches {
                persistence_unit: unit,
            },
            Ok(false) => {
                self.sink.emit(&Diagnostic::SchemaMismatch {
                    type_name: ty.name().to_string(),
                    persistence_unit: unit.clone(),
                });
                SchemaCheck::Mismatch {
                    persistence_unit: unit,
                }
            }
            Err(err) => {
                let reason = err.to_string();
                self.sink.emit(&Diagnostic::SchemaUnavailable {
                    type_name: ty.name().to_string(),
                    persistence_unit: unit.clone(),
                    reason: reason.clone(),
                });
                SchemaCheck::Unavailable {
                    persistence_unit: unit,
                    reason,
                }
            }
        }
    }
}

/// Metadata resolver backed by an in-memory binding table.
///
/// Populated at bootstrap, once persistence units are known.
#[derive(Debug, Default)]
pub struct MetadataMap {
    bindings: RwLock<HashMap<TypeKey, EntityMetadata>>,
}

impl MetadataMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to `metadata`, returning any previous binding.
    pub fn bind(&self, key: impl Into<TypeKey>, metadata: EntityMetadata) -> Option<EntityMetadata> {
        self.bindings.write().insert(key.into(), metadata)
    }

    /// Number of bound types.
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

impl MetadataResolver for MetadataMap {
    fn resolve(&self, ty: &dyn TypeInfo) -> Option<EntityMetadata> {
        self.bindings.read().get(ty.key()).cloned()
    }
}

/// Schema manager factory backed by a table of per-unit managers.
#[derive(Default)]
pub struct SchemaManagerRegistry {
    managers: RwLock<HashMap<PersistenceUnit, Arc<dyn SchemaManager>>>,
}

impl SchemaManagerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the manager serving `unit`, replacing any previous one.
    pub fn register(&self, unit: impl Into<PersistenceUnit>, manager: Arc<dyn SchemaManager>) {
        self.managers.write().insert(unit.into(), manager);
    }

    /// Registered persistence units, in no particular order.
    pub fn units(&self) -> Vec<PersistenceUnit> {
        self.managers.read().keys().cloned().collect()
    }
}

impl SchemaManagerFactory for SchemaManagerRegistry {
    fn for_persistence_unit(&self, unit: &PersistenceUnit) -> SchemaResult<Arc<dyn SchemaManager>> {
        self.managers
            .read()
            .get(unit)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownPersistenceUnit(unit.clone()))
    }
}
