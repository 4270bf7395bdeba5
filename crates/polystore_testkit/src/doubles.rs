//! Test doubles for validator collaborators.

use parking_lot::Mutex;
use polystore_core::{
    Constructor, Diagnostic, DiagnosticLevel, DiagnosticsSink, FieldDescriptor, Marker,
    SchemaManager, SchemaResult, TypeDescriptor, TypeInfo, TypeKey,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Wraps a descriptor and counts how often the validator reads it.
///
/// Only reads on the wrapped (leaf) type are counted; ancestors are
/// reached through the inner descriptor.
pub struct CountingType {
    inner: Arc<TypeDescriptor>,
    marker_reads: AtomicUsize,
    constructor_reads: AtomicUsize,
    field_reads: AtomicUsize,
}

impl CountingType {
    /// Wraps `inner`.
    pub fn new(inner: Arc<TypeDescriptor>) -> Self {
        Self {
            inner,
            marker_reads: AtomicUsize::new(0),
            constructor_reads: AtomicUsize::new(0),
            field_reads: AtomicUsize::new(0),
        }
    }

    /// Times `markers()` was called.
    pub fn marker_reads(&self) -> usize {
        self.marker_reads.load(Ordering::SeqCst)
    }

    /// Times `constructors()` was called.
    pub fn constructor_reads(&self) -> usize {
        self.constructor_reads.load(Ordering::SeqCst)
    }

    /// Times `declared_fields()` was called.
    pub fn field_reads(&self) -> usize {
        self.field_reads.load(Ordering::SeqCst)
    }
}

impl TypeInfo for CountingType {
    fn key(&self) -> &TypeKey {
        self.inner.key()
    }

    fn markers(&self) -> &[Marker] {
        self.marker_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.markers()
    }

    fn constructors(&self) -> &[Constructor] {
        self.constructor_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.constructors()
    }

    fn declared_fields(&self) -> &[FieldDescriptor] {
        self.field_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.declared_fields()
    }

    fn parent(&self) -> Option<&dyn TypeInfo> {
        self.inner.parent()
    }
}

/// A diagnostics sink that keeps every event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    /// Recorded warnings.
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .iter()
            .filter(|d| d.level() == DiagnosticLevel::Warn)
            .cloned()
            .collect()
    }

    /// Recorded events about `type_name`.
    pub fn for_type(&self, type_name: &str) -> Vec<Diagnostic> {
        self.events
            .lock()
            .iter()
            .filter(|d| d.type_name() == type_name)
            .cloned()
            .collect()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.events.lock().push(diagnostic.clone());
    }
}

/// A schema manager returning a scripted answer.
pub struct StaticSchemaManager {
    answer: SchemaResult<bool>,
    calls: AtomicUsize,
}

impl StaticSchemaManager {
    /// Always reports `matches`.
    pub fn answering(matches: bool) -> Self {
        Self::new(Ok(matches))
    }

    /// Always returns `answer`.
    pub fn new(answer: SchemaResult<bool>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    /// Times the manager was consulted.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SchemaManager for StaticSchemaManager {
    fn validate_entity(&self, _ty: &dyn TypeInfo) -> SchemaResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}
