//! Process-wide registry of validated entity types.

use super::shape::EntityShape;
use crate::types::TypeKey;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<ValidationRegistry>> = OnceLock::new();

/// Set of types that passed every structural rule, with their shapes.
///
/// Append-only: entries live until the registry is dropped. Lookups and
/// inserts are lock-free across keys; two callers racing to register the
/// same type both compute its shape and the first insert wins.
#[derive(Debug, Default)]
pub struct ValidationRegistry {
    entries: DashMap<TypeKey, Arc<EntityShape>>,
}

impl ValidationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every validator in the process.
    pub fn global() -> Arc<ValidationRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Returns the registered shape for `key`.
    pub fn get(&self, key: &TypeKey) -> Option<Arc<EntityShape>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns true if `key` has been registered.
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Registers a shape, keeping any shape registered first.
    ///
    /// Returns the shape now held by the registry.
    pub fn insert(&self, shape: EntityShape) -> Arc<EntityShape> {
        let entry = self
            .entries
            .entry(shape.key.clone())
            .or_insert_with(|| Arc::new(shape));
        Arc::clone(entry.value())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered type keys, in no particular order.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}
