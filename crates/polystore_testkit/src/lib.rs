//! # Polystore Testkit
//!
//! Test utilities for Polystore.
//!
//! This crate provides:
//! - Fixture types from the photo-sharing sample domain
//! - Test doubles: call-counting types, recording sinks, scripted schema
//!   managers
//! - Property-based test generators using proptest
//! - Concurrent validation stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use polystore_testkit::prelude::*;
//!
//! #[test]
//! fn photographer_is_valid() {
//!     let validator = fresh_validator();
//!     validator.validate(&*photographer()).unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod doubles;
pub mod fixtures;
pub mod generators;
pub mod stress;

use tracing_subscriber::EnvFilter;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::doubles::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::init_test_logging;
    pub use crate::stress::*;
}

pub use doubles::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;

/// Installs a test-friendly `tracing` subscriber.
///
/// Honors `RUST_LOG`, defaulting to `debug` for the polystore crates.
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("polystore_core=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
