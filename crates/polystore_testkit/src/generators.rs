//! Property-based test generators using proptest.
//!
//! Candidates are generated together with the rule they are expected to
//! break, so properties can compare the validator against a plain oracle.

use polystore_core::{
    ContractRule, FieldDescriptor, Marker, TypeDescriptor, TypeDescriptorBuilder,
};
use proptest::prelude::*;
use std::sync::Arc;

/// Key markers placed on a generated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMarking {
    /// No key marker.
    None,
    /// Primary key marker only.
    Id,
    /// Embedded key marker only.
    EmbeddedId,
    /// Both markers.
    Both,
}

impl KeyMarking {
    fn apply(self, field: FieldDescriptor) -> FieldDescriptor {
        match self {
            Self::None => field,
            Self::Id => field.id(),
            Self::EmbeddedId => field.embedded_id(),
            Self::Both => field.id().embedded_id(),
        }
    }
}

/// A generated entity candidate.
#[derive(Debug, Clone)]
pub struct EntityCandidate {
    /// Qualified type name.
    pub name: String,
    /// Whether the entity marker is present.
    pub entity: bool,
    /// Whether the table marker is present.
    pub table: bool,
    /// Whether a public no-arg constructor is present.
    pub default_constructor: bool,
    /// Key marking of each field, in declaration order. Field names are
    /// unique.
    pub fields: Vec<KeyMarking>,
}

impl EntityCandidate {
    /// Builds the descriptor.
    pub fn descriptor(&self) -> Arc<TypeDescriptor> {
        let mut builder: TypeDescriptorBuilder = TypeDescriptor::builder(self.name.as_str());
        if self.entity {
            builder = builder.entity();
        }
        if self.table {
            builder = builder.table(self.name.to_lowercase());
        }
        if self.default_constructor {
            builder = builder.default_constructor();
        }
        for (i, marking) in self.fields.iter().enumerate() {
            builder = builder.field(marking.apply(FieldDescriptor::new(format!("f{i}"), "u64")));
        }
        builder.build()
    }

    /// The rule the validator must report, or `None` if it must pass.
    pub fn expected_violation(&self) -> Option<ContractRule> {
        if !self.entity {
            return Some(ContractRule::EntityMarker);
        }
        if !self.table {
            return Some(ContractRule::TableMarker);
        }
        if !self.default_constructor {
            return Some(ContractRule::DefaultConstructor);
        }
        let mut keys = 0;
        for marking in &self.fields {
            match marking {
                KeyMarking::Both => return Some(ContractRule::ExclusiveIdentifierMarkers),
                KeyMarking::Id | KeyMarking::EmbeddedId => keys += 1,
                KeyMarking::None => {}
            }
        }
        match keys {
            0 => Some(ContractRule::IdentifierPresent),
            1 => None,
            _ => Some(ContractRule::SingleIdentifier),
        }
    }
}

/// Strategy for qualified type names.
pub fn type_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}::[A-Z][a-zA-Z0-9]{0,15}").expect("Invalid regex")
}

/// Strategy for field key markings, weighted towards unmarked fields.
pub fn key_marking_strategy() -> impl Strategy<Value = KeyMarking> {
    prop_oneof![
        6 => Just(KeyMarking::None),
        2 => Just(KeyMarking::Id),
        1 => Just(KeyMarking::EmbeddedId),
        1 => Just(KeyMarking::Both),
    ]
}

/// Strategy for entity candidates.
pub fn entity_candidate_strategy() -> impl Strategy<Value = EntityCandidate> {
    (
        type_name_strategy(),
        prop::bool::weighted(0.9),
        prop::bool::weighted(0.9),
        prop::bool::weighted(0.9),
        prop::collection::vec(key_marking_strategy(), 0..6),
    )
        .prop_map(|(name, entity, table, default_constructor, fields)| EntityCandidate {
            name,
            entity,
            table,
            default_constructor,
            fields,
        })
}

/// A generated ancestor chain. Level 0 is the leaf.
#[derive(Debug, Clone)]
pub struct ChainPlan {
    /// Per level: whether it carries an inclusion marker, and how many
    /// fields it declares.
    pub levels: Vec<(bool, usize)>,
}

impl ChainPlan {
    /// Builds the chain and returns its leaf.
    pub fn leaf(&self) -> Arc<TypeDescriptor> {
        let mut parent: Option<Arc<TypeDescriptor>> = None;
        for (depth, (included, field_count)) in self.levels.iter().enumerate().rev() {
            let mut builder = TypeDescriptor::builder(format!("chain::L{depth}"));
            if *included {
                builder = builder.marker(Marker::MappedSuperclass);
            }
            for i in 0..*field_count {
                builder = builder.field(FieldDescriptor::new(format!("l{depth}_f{i}"), "u64"));
            }
            if let Some(p) = parent.take() {
                builder = builder.extends(p);
            }
            parent = Some(builder.build());
        }
        parent.expect("chain has at least one level")
    }

    /// Number of fields the collector must return under the default policy.
    pub fn expected_field_count(&self) -> usize {
        self.levels
            .iter()
            .enumerate()
            .filter(|(depth, (included, _))| *depth == 0 || *included)
            .map(|(_, (_, count))| count)
            .sum()
    }
}

/// Strategy for ancestor chains of one to six levels.
pub fn chain_strategy() -> impl Strategy<Value = ChainPlan> {
    prop::collection::vec((any::<bool>(), 0usize..4), 1..7).prop_map(|levels| ChainPlan { levels })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polystore_core::TypeInfo;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn candidate_fields_have_unique_names(candidate in entity_candidate_strategy()) {
            let ty = candidate.descriptor();
            let mut names: Vec<&str> = ty.declared_fields().iter().map(|f| f.name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), candidate.fields.len());
        }

        #[test]
        fn chain_depth_matches_plan(chain in chain_strategy()) {
            let leaf = chain.leaf();
            let mut depth = 1;
            let mut current = leaf.parent();
            while let Some(level) = current {
                depth += 1;
                current = level.parent();
            }
            prop_assert_eq!(depth, chain.levels.len());
        }
    }
}
