//! Declarative type and field descriptors.
//!
//! Descriptors replace runtime reflection: a type's markers, constructors,
//! declared fields and parent are stated once, up front, and every
//! component reads them through the [`TypeInfo`] seam.

mod field;
mod ty;

pub use field::FieldDescriptor;
pub use ty::{TypeDescriptor, TypeDescriptorBuilder};

use crate::marker::Marker;
use crate::types::TypeKey;
use serde::{Deserialize, Serialize};

/// Introspection surface of a candidate persistable type.
///
/// Implemented by [`TypeDescriptor`]; test doubles wrap it to observe
/// which parts of a type the validator actually reads.
pub trait TypeInfo: Send + Sync {
    /// Stable identity of the type.
    fn key(&self) -> &TypeKey;

    /// Markers declared directly on the type.
    fn markers(&self) -> &[Marker];

    /// Constructors the type exposes.
    fn constructors(&self) -> &[Constructor];

    /// Fields declared directly on the type, in declaration order.
    fn declared_fields(&self) -> &[FieldDescriptor];

    /// Immediate ancestor, or `None` at the hierarchy root.
    fn parent(&self) -> Option<&dyn TypeInfo>;

    /// Qualified type name, used in diagnostics and errors.
    fn name(&self) -> &str {
        self.key().as_str()
    }
}

/// Constructor visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Callable by any caller.
    #[default]
    Public,
    /// Callable within the defining crate only.
    Crate,
    /// Callable within the defining module only.
    Private,
}

/// A constructor signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constructor {
    /// Who may call it.
    #[serde(default)]
    pub visibility: Visibility,
    /// Parameter type names, in order.
    #[serde(default)]
    pub params: Vec<String>,
}

impl Constructor {
    /// A public, zero-argument constructor.
    #[must_use]
    pub fn default_public() -> Self {
        Self::default()
    }

    /// Creates a constructor with the given visibility and parameters.
    pub fn new<I, S>(visibility: Visibility, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            visibility,
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true for a public constructor taking no arguments.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.visibility == Visibility::Public && self.params.is_empty()
    }
}
