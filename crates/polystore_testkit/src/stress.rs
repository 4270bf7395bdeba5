//! Stress helpers for concurrent validation.
//!
//! Many threads validating the same unregistered types may each evaluate
//! the rules; the registry must still end up with exactly one shape per
//! type and every caller must see success.

use polystore_core::{EntityValidator, TypeDescriptor};
use std::sync::Arc;
use std::thread;

/// Result of a stress test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressTestResult {
    /// Total validations performed.
    pub total_ops: usize,
    /// Validations that succeeded.
    pub successful_ops: usize,
    /// Validations that failed.
    pub failed_ops: usize,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize) -> Self {
        Self {
            total_ops: successful + failed,
            successful_ops: successful,
            failed_ops: failed,
        }
    }

    /// Returns true if every validation succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed_ops == 0
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Validations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 8,
        }
    }
}

/// Validates `types` round-robin from several threads at once.
pub fn stress_concurrent_validation(
    validator: Arc<EntityValidator>,
    types: Vec<Arc<TypeDescriptor>>,
    config: &StressConfig,
) -> StressTestResult {
    if types.is_empty() {
        return StressTestResult::new(0, 0);
    }
    let types = Arc::new(types);

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let validator = Arc::clone(&validator);
            let types = Arc::clone(&types);
            let operations = config.operations;
            thread::spawn(move || {
                let mut ok = 0usize;
                let mut failed = 0usize;
                for i in 0..operations {
                    let ty = &types[(t + i) % types.len()];
                    match validator.validate(&**ty) {
                        Ok(()) => ok += 1,
                        Err(_) => failed += 1,
                    }
                }
                (ok, failed)
            })
        })
        .collect();

    let mut successful = 0;
    let mut failed = 0;
    for handle in handles {
        let (ok, err) = handle.join().expect("stress thread panicked");
        successful += ok;
        failed += err;
    }

    StressTestResult::new(successful, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{album, fresh_validator, keyless_entity, photographer};

    #[test]
    fn concurrent_validation_registers_once() {
        let validator = Arc::new(fresh_validator());
        let config = StressConfig {
            operations: 200,
            threads: 4,
        };

        let result =
            stress_concurrent_validation(Arc::clone(&validator), vec![photographer(), album()], &config);

        assert_eq!(result.total_ops, 800);
        assert!(result.all_succeeded());
        assert_eq!(validator.registry().len(), 2);
    }

    #[test]
    fn invalid_types_fail_every_time() {
        let validator = Arc::new(fresh_validator());
        let config = StressConfig {
            operations: 50,
            threads: 3,
        };

        let result =
            stress_concurrent_validation(Arc::clone(&validator), vec![keyless_entity()], &config);

        assert_eq!(result, StressTestResult::new(0, 150));
        assert!(validator.registry().is_empty());
    }

    #[test]
    fn no_types_is_a_no_op() {
        let result = stress_concurrent_validation(
            Arc::new(fresh_validator()),
            Vec::new(),
            &StressConfig::default(),
        );
        assert_eq!(result.total_ops, 0);
    }
}
