//! Validator configuration.

use crate::hierarchy::InclusionPolicy;
use crate::marker::MarkerKind;

/// How redeclared (shadowed) fields are treated when looking for the
/// identifier and building the persistent shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShadowPolicy {
    /// Only the most-derived declaration of a field name counts.
    #[default]
    MostDerived,
    /// Every declaration counts, including shadowed ancestor ones.
    AllDeclarations,
}

/// Configuration for an [`EntityValidator`](crate::EntityValidator).
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Ancestor markers admitting an ancestor's fields into the shape.
    pub inclusion_markers: Vec<MarkerKind>,

    /// Treatment of redeclared fields.
    pub shadow_policy: ShadowPolicy,

    /// Whether transient fields are left out of the persistent shape.
    pub exclude_transient: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            inclusion_markers: vec![MarkerKind::MappedSuperclass, MarkerKind::Inheritance],
            shadow_policy: ShadowPolicy::MostDerived,
            exclude_transient: true,
        }
    }
}

impl ValidatorConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ancestor inclusion markers.
    #[must_use]
    pub fn inclusion_markers(mut self, markers: impl IntoIterator<Item = MarkerKind>) -> Self {
        self.inclusion_markers = markers.into_iter().collect();
        self
    }

    /// Sets the shadowed-field policy.
    #[must_use]
    pub const fn shadow_policy(mut self, policy: ShadowPolicy) -> Self {
        self.shadow_policy = policy;
        self
    }

    /// Sets whether transient fields are excluded from the shape.
    #[must_use]
    pub const fn exclude_transient(mut self, value: bool) -> Self {
        self.exclude_transient = value;
        self
    }

    /// The inclusion policy derived from this configuration.
    #[must_use]
    pub fn inclusion_policy(&self) -> InclusionPolicy {
        InclusionPolicy::new(self.inclusion_markers.iter().copied())
    }
}
