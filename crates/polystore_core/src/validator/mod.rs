//! Entity contract validation.
//!
//! A type is a legal persistable entity when, in order:
//! 1. it carries the entity marker,
//! 2. it carries a table marker,
//! 3. it exposes a public zero-argument constructor,
//! 4. no persistent field carries both key markers,
//! 5. exactly one persistent field carries a key marker.
//!
//! The first violated rule is reported; later rules are not evaluated.
//! Types that pass are recorded in a [`ValidationRegistry`] and never
//! evaluated again. Failed types leave no trace and are re-evaluated from
//! scratch on the next call.

mod registry;
mod shape;

pub use registry::ValidationRegistry;
pub use shape::{EntityShape, IdentifierField, IdentifierKind};

use crate::config::{ShadowPolicy, ValidatorConfig};
use crate::descriptor::{Constructor, FieldDescriptor, TypeInfo};
use crate::diagnostics::{Diagnostic, DiagnosticsSink, TracingSink};
use crate::error::EntityDefinitionError;
use crate::hierarchy::{FieldHierarchyCollector, InclusionPolicy};
use crate::marker::{AnnotationInspector, Marker, MarkerKind};
use crate::schema::{SchemaCheck, SchemaDelegate};
use std::collections::HashSet;
use std::sync::Arc;

/// Validates candidate entity types and memoizes their persistent shape.
///
/// # Example
///
/// ```rust
/// use polystore_core::{EntityValidator, FieldDescriptor, TypeDescriptor, ValidationRegistry};
/// use std::sync::Arc;
///
/// let photographer = TypeDescriptor::builder("pickr::Photographer")
///     .entity()
///     .table("photographers")
///     .default_constructor()
///     .field(FieldDescriptor::new("id", "u32").id())
///     .build();
///
/// let validator = EntityValidator::new().with_registry(Arc::new(ValidationRegistry::new()));
/// validator.validate(&*photographer)?;
///
/// let shape = validator.shape(&*photographer)?;
/// assert_eq!(shape.table, "photographers");
/// assert_eq!(shape.identifier.name(), "id");
/// # Ok::<(), polystore_core::EntityDefinitionError>(())
/// ```
pub struct EntityValidator {
    registry: Arc<ValidationRegistry>,
    config: ValidatorConfig,
    policy: InclusionPolicy,
    sink: Arc<dyn DiagnosticsSink>,
    schema: Option<SchemaDelegate>,
}

impl EntityValidator {
    /// Creates a validator over the process-wide registry with default
    /// configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Creates a validator over the process-wide registry.
    ///
    /// The registry memoizes verdicts, not configurations: a type already
    /// registered by another validator is accepted without re-evaluation,
    /// even if `config` would reject it. Pair non-default configurations
    /// with their own registry via [`EntityValidator::with_registry`].
    #[must_use]
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            registry: ValidationRegistry::global(),
            policy: config.inclusion_policy(),
            config,
            sink: Arc::new(TracingSink),
            schema: None,
        }
    }

    /// Uses `registry` instead of the process-wide one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ValidationRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Sends diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Enables backend schema checks through `delegate`.
    #[must_use]
    pub fn with_schema_delegate(mut self, delegate: SchemaDelegate) -> Self {
        self.schema = Some(delegate);
        self
    }

    /// The registry this validator records into.
    #[must_use]
    pub fn registry(&self) -> &Arc<ValidationRegistry> {
        &self.registry
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Checks that `ty` is a legally shaped entity.
    ///
    /// Idempotent: once a type has passed, later calls return immediately
    /// without reading anything but its key.
    pub fn validate(&self, ty: &dyn TypeInfo) -> Result<(), EntityDefinitionError> {
        self.shape(ty).map(|_| ())
    }

    /// Validates `ty` if needed and returns its persistent shape.
    pub fn shape(&self, ty: &dyn TypeInfo) -> Result<Arc<EntityShape>, EntityDefinitionError> {
        if let Some(shape) = self.registry.get(ty.key()) {
            tracing::trace!(type_name = %ty.key(), "entity type already validated");
            return Ok(shape);
        }

        self.sink.emit(&Diagnostic::Validating {
            type_name: ty.name().to_string(),
        });

        let shape = evaluate(ty, &self.policy, &self.config)?;
        let shape = self.registry.insert(shape);

        self.sink.emit(&Diagnostic::Registered {
            type_name: ty.name().to_string(),
        });
        Ok(shape)
    }

    /// Returns true if `ty` has already passed validation.
    pub fn is_validated(&self, ty: &dyn TypeInfo) -> bool {
        self.registry.contains(ty.key())
    }

    /// Asks the backend whether its live schema still matches `ty`.
    ///
    /// Advisory only: the result never affects the registry. Without a
    /// configured schema delegate the check is skipped.
    pub fn validate_entity(&self, ty: &dyn TypeInfo) -> SchemaCheck {
        match &self.schema {
            Some(delegate) => delegate.check_schema(ty),
            None => SchemaCheck::Skipped,
        }
    }
}

impl Default for EntityValidator {
    fn default() -> Self {
        Self::new()
    }
}

// Runs the structural rules in order, first failure wins.
fn evaluate(
    ty: &dyn TypeInfo,
    policy: &InclusionPolicy,
    config: &ValidatorConfig,
) -> Result<EntityShape, EntityDefinitionError> {
    let type_name = ty.name().to_string();

    if !AnnotationInspector::has(ty, MarkerKind::Entity) {
        return Err(EntityDefinitionError::NotAnEntity { type_name });
    }

    let Some(Marker::Table { name, schema }) = AnnotationInspector::find(ty, MarkerKind::Table)
    else {
        return Err(EntityDefinitionError::MissingTableMarker { type_name });
    };

    if !ty.constructors().iter().any(Constructor::is_default) {
        return Err(EntityDefinitionError::NoDefaultConstructor { type_name });
    }

    let collected = FieldHierarchyCollector::collect(ty, policy);

    // Shadowed declarations are still checked for conflicting markers.
    if let Some(field) = collected
        .iter()
        .find(|f| f.has_marker(MarkerKind::Id) && f.has_marker(MarkerKind::EmbeddedId))
    {
        return Err(EntityDefinitionError::ConflictingIdentifierMarkers {
            type_name,
            field: field.name.clone(),
        });
    }

    let effective = effective_fields(collected, config.shadow_policy);

    let mut identifiers = Vec::new();
    for field in &effective {
        let primary = field.has_marker(MarkerKind::Id);
        let embedded = field.has_marker(MarkerKind::EmbeddedId);

        if primary {
            identifiers.push(((*field).clone(), IdentifierKind::Primary));
        } else if embedded {
            identifiers.push(((*field).clone(), IdentifierKind::Embedded));
        }
    }

    let (field, kind) = match identifiers.len() {
        0 => return Err(EntityDefinitionError::NoIdentifierField { type_name }),
        1 => identifiers.remove(0),
        _ => {
            return Err(EntityDefinitionError::MultipleIdentifierFields {
                type_name,
                fields: identifiers.into_iter().map(|(f, _)| f.name).collect(),
            })
        }
    };

    let entity_name = ty.key().simple_name().to_string();
    let table = if name.is_empty() {
        entity_name.clone()
    } else {
        name.clone()
    };
    let fields = effective
        .into_iter()
        .filter(|f| !(config.exclude_transient && f.has_marker(MarkerKind::Transient)))
        .cloned()
        .collect();

    Ok(EntityShape {
        key: ty.key().clone(),
        entity_name,
        table,
        schema: schema.clone(),
        identifier: IdentifierField { field, kind },
        fields,
    })
}

// Drops ancestor declarations shadowed by a more-derived field of the same
// name. Input is leaf first, so the first occurrence is the most derived.
fn effective_fields(
    collected: Vec<&FieldDescriptor>,
    policy: ShadowPolicy,
) -> Vec<&FieldDescriptor> {
    match policy {
        ShadowPolicy::AllDeclarations => collected,
        ShadowPolicy::MostDerived => {
            let mut seen = HashSet::new();
            collected
                .into_iter()
                .filter(|f| seen.insert(f.name.as_str()))
                .collect()
        }
    }
}
