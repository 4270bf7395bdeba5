//! Declarative type catalogs.
//!
//! A catalog is the registration-time source of type descriptors: a JSON
//! document listing every candidate type with its markers, constructors,
//! fields and parent. Loading links `extends` references into parent
//! pointers so the rest of the crate never resolves names again.
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "pickr::Audited", "markers": [{ "kind": "mapped_superclass" }],
//!       "fields": [{ "name": "created", "type": "u64" }] },
//!     { "name": "pickr::Photographer", "extends": "pickr::Audited",
//!       "markers": [{ "kind": "entity" }, { "kind": "table", "name": "photographers" }],
//!       "constructors": [{}],
//!       "fields": [{ "name": "id", "type": "u32", "markers": [{ "kind": "id" }] }] }
//!   ]
//! }
//! ```

use crate::descriptor::{Constructor, FieldDescriptor, TypeDescriptor, TypeInfo};
use crate::error::{CatalogError, CoreResult, EntityDefinitionError};
use crate::marker::{AnnotationInspector, Marker, MarkerKind};
use crate::types::TypeKey;
use crate::validator::EntityValidator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// One type as written in a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    /// Qualified type name.
    pub name: TypeKey,
    /// Immediate ancestor, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<TypeKey>,
    /// Type-level markers.
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// Exposed constructors.
    #[serde(default)]
    pub constructors: Vec<Constructor>,
    /// Declared fields.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    types: Vec<TypeDeclaration>,
}

/// Outcome of validating every entity in a catalog.
#[derive(Debug, Default)]
pub struct CatalogReport {
    /// Entities that passed, in catalog order.
    pub registered: Vec<TypeKey>,
    /// Entities that failed, with the violated rule.
    pub rejected: Vec<EntityDefinitionError>,
}

impl CatalogReport {
    /// Returns true if every entity passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// A linked set of type descriptors.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: BTreeMap<TypeKey, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    /// Links `declarations` into descriptors.
    pub fn from_declarations(declarations: Vec<TypeDeclaration>) -> Result<Self, CatalogError> {
        let mut pending = HashMap::with_capacity(declarations.len());
        for decl in declarations {
            if pending.contains_key(&decl.name) {
                return Err(CatalogError::DuplicateType(decl.name));
            }
            pending.insert(decl.name.clone(), decl);
        }

        let mut linked = BTreeMap::new();
        let mut visiting = HashSet::new();
        for decl in pending.values() {
            link(decl, &pending, &mut linked, &mut visiting)?;
        }

        Ok(Self { types: linked })
    }

    /// Parses and links a JSON catalog document.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Ok(Self::from_declarations(doc.types)?)
    }

    /// Reads, parses and links a JSON catalog file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            types = catalog.len(),
            "type catalog loaded"
        );
        Ok(catalog)
    }

    /// Looks up a descriptor by name.
    pub fn get(&self, key: &TypeKey) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(key)
    }

    /// Descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values()
    }

    /// Descriptors carrying the entity marker, in name order.
    pub fn entities(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types
            .values()
            .filter(|ty| {
                let ty: &TypeDescriptor = ty;
                AnnotationInspector::has(ty, MarkerKind::Entity)
            })
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Validates every entity, collecting failures instead of stopping.
    ///
    /// Whether a rejected entity aborts startup is the caller's decision.
    pub fn validate_entities(&self, validator: &EntityValidator) -> CatalogReport {
        let mut report = CatalogReport::default();
        for ty in self.entities() {
            match validator.validate(&**ty) {
                Ok(()) => report.registered.push(ty.key().clone()),
                Err(err) => {
                    tracing::debug!(type_name = %ty.key(), error = %err, "entity rejected");
                    report.rejected.push(err);
                }
            }
        }
        report
    }
}

fn link(
    decl: &TypeDeclaration,
    pending: &HashMap<TypeKey, TypeDeclaration>,
    linked: &mut BTreeMap<TypeKey, Arc<TypeDescriptor>>,
    visiting: &mut HashSet<TypeKey>,
) -> Result<Arc<TypeDescriptor>, CatalogError> {
    let key = &decl.name;
    if let Some(done) = linked.get(key) {
        return Ok(Arc::clone(done));
    }
    if !visiting.insert(key.clone()) {
        return Err(CatalogError::CyclicHierarchy(key.clone()));
    }

    let mut builder = TypeDescriptor::builder(decl.name.clone());
    if let Some(parent_key) = &decl.extends {
        let Some(parent_decl) = pending.get(parent_key) else {
            return Err(CatalogError::UnknownParent {
                ty: key.clone(),
                parent: parent_key.clone(),
            });
        };
        let parent = link(parent_decl, pending, linked, visiting)?;
        builder = builder.extends(parent);
    }
    for marker in &decl.markers {
        builder = builder.marker(marker.clone());
    }
    for ctor in &decl.constructors {
        builder = builder.constructor(ctor.clone());
    }
    for field in &decl.fields {
        builder = builder.field(field.clone());
    }

    let descriptor = builder.build();
    visiting.remove(key);
    linked.insert(key.clone(), Arc::clone(&descriptor));
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ValidationRegistry;
    use std::io::Write;

    const PICKR: &str = r#"{
        "types": [
            { "name": "pickr::Photographer", "extends": "pickr::Audited",
              "markers": [{ "kind": "entity" }, { "kind": "table", "name": "photographers" }],
              "constructors": [{}],
              "fields": [
                { "name": "id", "type": "u32", "markers": [{ "kind": "id" }] },
                { "name": "name", "type": "String" }
              ] },
            { "name": "pickr::Audited", "markers": [{ "kind": "mapped_superclass" }],
              "fields": [{ "name": "created", "type": "u64" }] },
            { "name": "pickr::Photo",
              "markers": [{ "kind": "entity" }],
              "constructors": [{}],
              "fields": [{ "name": "id", "type": "u64", "markers": [{ "kind": "id" }] }] }
        ]
    }"#;

    #[test]
    fn links_parents_regardless_of_order() {
        let catalog = TypeCatalog::from_json(PICKR).unwrap();
        assert_eq!(catalog.len(), 3);

        let photographer = catalog.get(&TypeKey::new("pickr::Photographer")).unwrap();
        let parent = photographer.parent_descriptor().unwrap();
        assert_eq!(parent.key(), &TypeKey::new("pickr::Audited"));
        assert!(Arc::ptr_eq(
            parent,
            catalog.get(&TypeKey::new("pickr::Audited")).unwrap()
        ));
    }

    #[test]
    fn validate_entities_collects_rejections() {
        let catalog = TypeCatalog::from_json(PICKR).unwrap();
        let validator = EntityValidator::new().with_registry(Arc::new(ValidationRegistry::new()));

        let report = catalog.validate_entities(&validator);
        assert_eq!(report.registered, vec![TypeKey::new("pickr::Photographer")]);
        assert_eq!(report.rejected.len(), 1);
        assert!(matches!(
            report.rejected[0],
            EntityDefinitionError::MissingTableMarker { .. }
        ));
        assert!(!report.is_clean());

        let shape = validator
            .shape(&**catalog.get(&TypeKey::new("pickr::Photographer")).unwrap())
            .unwrap();
        let names: Vec<&str> = shape.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "created"]);
    }

    #[test]
    fn rejects_duplicates() {
        let decl = TypeDeclaration {
            name: TypeKey::new("A"),
            extends: None,
            markers: vec![],
            constructors: vec![],
            fields: vec![],
        };
        let err = TypeCatalog::from_declarations(vec![decl.clone(), decl]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateType(TypeKey::new("A")));
    }

    #[test]
    fn rejects_unknown_parent() {
        let json = r#"{ "types": [ { "name": "A", "extends": "Missing" } ] }"#;
        let err = TypeCatalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("Missing"));
        assert!(matches!(
            err,
            crate::error::CoreError::Catalog(CatalogError::UnknownParent { ref ty, ref parent })
                if ty.as_str() == "A" && parent.as_str() == "Missing"
        ));
    }

    #[test]
    fn unknown_grandparent_names_the_declaring_type() {
        let declarations = vec![
            TypeDeclaration {
                name: TypeKey::new("Leaf"),
                extends: Some(TypeKey::new("Mid")),
                markers: Vec::new(),
                constructors: Vec::new(),
                fields: Vec::new(),
            },
            TypeDeclaration {
                name: TypeKey::new("Mid"),
                extends: Some(TypeKey::new("Gone")),
                markers: Vec::new(),
                constructors: Vec::new(),
                fields: Vec::new(),
            },
        ];
        let err = TypeCatalog::from_declarations(declarations).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownParent {
                ty: TypeKey::new("Mid"),
                parent: TypeKey::new("Gone"),
            }
        );
    }

    #[test]
    fn rejects_cycles() {
        let json = r#"{ "types": [
            { "name": "A", "extends": "B" },
            { "name": "B", "extends": "A" }
        ] }"#;
        let err = TypeCatalog::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Catalog(CatalogError::CyclicHierarchy(_))
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = TypeCatalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PICKR.as_bytes()).unwrap();

        let catalog = TypeCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.entities().count(), 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TypeCatalog::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Io(_)));
    }
}
