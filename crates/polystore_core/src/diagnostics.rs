//! Diagnostics emitted while validating and checking entity types.
//!
//! Validation reports through a [`DiagnosticsSink`] instead of logging
//! directly, so callers can observe mismatches as events. The default
//! [`TracingSink`] forwards to `tracing`; [`DiagnosticFeed`] distributes
//! events to channel subscribers.
//!
//! # Usage
//!
//! ```rust
//! use polystore_core::{Diagnostic, DiagnosticFeed, DiagnosticsSink};
//!
//! let feed = DiagnosticFeed::new();
//! let rx = feed.subscribe();
//!
//! feed.emit(&Diagnostic::Validating { type_name: "pickr::Photo".into() });
//! assert!(matches!(rx.recv().unwrap(), Diagnostic::Validating { .. }));
//! ```

use crate::types::PersistenceUnit;
use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Trace-level detail.
    Debug,
    /// Something later operations will trip over.
    Warn,
}

/// A single diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Structural rules are being evaluated for a type.
    Validating {
        /// The type under validation.
        type_name: String,
    },
    /// A type passed every rule and entered the registry.
    Registered {
        /// The registered type.
        type_name: String,
    },
    /// The live schema no longer matches the entity.
    SchemaMismatch {
        /// The checked type.
        type_name: String,
        /// The persistence unit whose backend was consulted.
        persistence_unit: PersistenceUnit,
    },
    /// The schema manager could not be consulted.
    SchemaUnavailable {
        /// The checked type.
        type_name: String,
        /// The persistence unit whose backend was consulted.
        persistence_unit: PersistenceUnit,
        /// Why the check could not run.
        reason: String,
    },
}

impl Diagnostic {
    /// Returns the severity of this event.
    #[must_use]
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            Self::Validating { .. } | Self::Registered { .. } => DiagnosticLevel::Debug,
            Self::SchemaMismatch { .. } | Self::SchemaUnavailable { .. } => DiagnosticLevel::Warn,
        }
    }

    /// Returns the type the event is about.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Validating { type_name }
            | Self::Registered { type_name }
            | Self::SchemaMismatch { type_name, .. }
            | Self::SchemaUnavailable { type_name, .. } => type_name,
        }
    }
}

/// Receives diagnostics.
pub trait DiagnosticsSink: Send + Sync {
    /// Handles one event. Must not block for long.
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::Validating { type_name } => {
                tracing::debug!(type_name = %type_name, "validating entity type");
            }
            Diagnostic::Registered { type_name } => {
                tracing::debug!(type_name = %type_name, "entity type registered");
            }
            Diagnostic::SchemaMismatch {
                type_name,
                persistence_unit,
            } => {
                tracing::warn!(
                    type_name = %type_name,
                    persistence_unit = %persistence_unit,
                    "schema validation failed, any operation on this type will fail"
                );
            }
            Diagnostic::SchemaUnavailable {
                type_name,
                persistence_unit,
                reason,
            } => {
                tracing::warn!(
                    type_name = %type_name,
                    persistence_unit = %persistence_unit,
                    reason = %reason,
                    "schema could not be checked"
                );
            }
        }
    }
}

/// A sink that distributes diagnostics to channel subscribers.
///
/// The feed:
/// - Preserves emission order
/// - Supports multiple subscribers
/// - Keeps a bounded history for late readers
pub struct DiagnosticFeed {
    /// Subscribers (senders).
    subscribers: RwLock<Vec<Sender<Diagnostic>>>,
    /// Recent events.
    history: RwLock<Vec<Diagnostic>>,
    /// Maximum history size.
    max_history: usize,
}

impl DiagnosticFeed {
    /// Creates a new feed.
    pub fn new() -> Self {
        Self::with_max_history(1024)
    }

    /// Creates a feed with a specific history limit.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
            max_history,
        }
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> Receiver<Diagnostic> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Returns a copy of the retained history, oldest first.
    pub fn history(&self) -> Vec<Diagnostic> {
        self.history.read().clone()
    }

    /// Returns retained events at or above `level`.
    pub fn at_level(&self, level: DiagnosticLevel) -> Vec<Diagnostic> {
        self.history
            .read()
            .iter()
            .filter(|d| d.level() >= level)
            .cloned()
            .collect()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for DiagnosticFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsSink for DiagnosticFeed {
    fn emit(&self, diagnostic: &Diagnostic) {
        {
            let mut history = self.history.write();
            history.push(diagnostic.clone());
            if history.len() > self.max_history {
                let to_remove = history.len() - self.max_history;
                history.drain(0..to_remove);
            }
        }

        // Drop subscribers whose receiver is gone
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(diagnostic.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn mismatch(name: &str) -> Diagnostic {
        Diagnostic::SchemaMismatch {
            type_name: name.into(),
            persistence_unit: PersistenceUnit::new("piccandra"),
        }
    }

    #[test]
    fn emit_and_receive() {
        let feed = DiagnosticFeed::new();
        let rx = feed.subscribe();

        feed.emit(&mismatch("Photographer"));

        let received = rx.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(received, mismatch("Photographer"));
    }

    #[test]
    fn subscriber_cleanup() {
        let feed = DiagnosticFeed::new();
        let rx = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 1);

        drop(rx);
        feed.emit(&mismatch("Photographer"));
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn history_is_bounded() {
        let feed = DiagnosticFeed::with_max_history(3);
        for i in 0..5 {
            feed.emit(&Diagnostic::Validating {
                type_name: format!("T{i}"),
            });
        }

        let names: Vec<String> = feed
            .history()
            .iter()
            .map(|d| d.type_name().to_string())
            .collect();
        assert_eq!(names, vec!["T2", "T3", "T4"]);
    }

    #[test]
    fn filter_by_level() {
        let feed = DiagnosticFeed::new();
        feed.emit(&Diagnostic::Validating {
            type_name: "Photo".into(),
        });
        feed.emit(&mismatch("Photo"));

        let warnings = feed.at_level(DiagnosticLevel::Warn);
        assert_eq!(warnings, vec![mismatch("Photo")]);
    }

    #[test]
    fn threaded_emit() {
        let feed = Arc::new(DiagnosticFeed::new());
        let rx = feed.subscribe();

        let feed_clone = Arc::clone(&feed);
        let handle = thread::spawn(move || {
            feed_clone.emit(&mismatch("Album"));
        });

        let received = rx.recv_timeout(Duration::from_millis(500)).unwrap();
        assert_eq!(received.type_name(), "Album");
        handle.join().unwrap();
    }

    #[test]
    fn tracing_sink_accepts_every_event() {
        let sink = TracingSink;
        sink.emit(&Diagnostic::Registered {
            type_name: "Photo".into(),
        });
        sink.emit(&Diagnostic::SchemaUnavailable {
            type_name: "Photo".into(),
            persistence_unit: PersistenceUnit::new("picmysql"),
            reason: "connection refused".into(),
        });
    }
}
