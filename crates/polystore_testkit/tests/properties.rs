//! Property tests comparing the validator against a plain oracle.

use polystore_core::{FieldHierarchyCollector, InclusionPolicy};
use polystore_testkit::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn first_violated_rule_is_reported(candidate in entity_candidate_strategy()) {
        let validator = fresh_validator();
        let ty = candidate.descriptor();

        match (validator.validate(&*ty), candidate.expected_violation()) {
            (Ok(()), None) => prop_assert!(validator.is_validated(&*ty)),
            (Err(err), Some(rule)) => {
                prop_assert_eq!(err.rule(), rule);
                prop_assert!(!validator.is_validated(&*ty));
            }
            (outcome, expected) => {
                prop_assert!(false, "got {:?}, expected {:?}", outcome, expected);
            }
        }
    }

    #[test]
    fn validation_is_idempotent(candidate in entity_candidate_strategy()) {
        let validator = fresh_validator();
        let counted = CountingType::new(candidate.descriptor());

        let first = validator.validate(&counted);
        let reads = counted.constructor_reads();
        let second = validator.validate(&counted);
        prop_assert_eq!(&first, &second);

        if first.is_ok() {
            prop_assert_eq!(counted.constructor_reads(), reads);
        }
    }

    #[test]
    fn collector_honors_inclusion_markers(chain in chain_strategy()) {
        let leaf = chain.leaf();
        let fields = FieldHierarchyCollector::collect(&*leaf, &InclusionPolicy::default());
        prop_assert_eq!(fields.len(), chain.expected_field_count());
    }
}
