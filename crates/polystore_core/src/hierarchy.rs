//! Field collection across a type's ancestor chain.
//!
//! A type's persistent shape is its own declared fields plus the fields of
//! those ancestors admitted by an [`InclusionPolicy`]. The walk goes from
//! the leaf towards the root and never deduplicates: a field redeclared by
//! a descendant appears once per declaring level.

use crate::descriptor::{FieldDescriptor, TypeInfo};
use crate::marker::{AnnotationInspector, MarkerKind};
use crate::types::TypeKey;

/// Decides whether an ancestor's declared fields join the leaf's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionPolicy {
    markers: Vec<MarkerKind>,
}

impl InclusionPolicy {
    /// Creates a policy admitting ancestors that carry any of `markers`.
    pub fn new(markers: impl IntoIterator<Item = MarkerKind>) -> Self {
        Self {
            markers: markers.into_iter().collect(),
        }
    }

    /// Admits mapped-superclass and inheritance-root ancestors.
    #[must_use]
    pub fn persistent_ancestors() -> Self {
        Self::new([MarkerKind::MappedSuperclass, MarkerKind::Inheritance])
    }

    /// Admits only the leaf type itself.
    #[must_use]
    pub fn leaf_only() -> Self {
        Self::new([])
    }

    /// The inclusion markers.
    #[must_use]
    pub fn markers(&self) -> &[MarkerKind] {
        &self.markers
    }

    /// Returns true if `level`, found `depth` steps above the leaf,
    /// contributes its fields. The leaf (depth 0) always does.
    pub fn includes(&self, level: &dyn TypeInfo, depth: usize) -> bool {
        depth == 0 || AnnotationInspector::has_any(level, &self.markers)
    }
}

impl Default for InclusionPolicy {
    fn default() -> Self {
        Self::persistent_ancestors()
    }
}

/// Walks ancestor chains and gathers candidate persistent fields.
pub struct FieldHierarchyCollector;

impl FieldHierarchyCollector {
    /// Returns `leaf` followed by each ancestor up to the root.
    pub fn lineage(leaf: &dyn TypeInfo) -> Vec<&dyn TypeInfo> {
        let mut chain = Vec::new();
        let mut current = Some(leaf);
        while let Some(level) = current {
            chain.push(level);
            current = level.parent();
        }
        chain
    }

    /// Collects the fields forming `leaf`'s candidate persistent shape,
    /// in leaf-to-root discovery order.
    pub fn collect<'a>(leaf: &'a dyn TypeInfo, policy: &InclusionPolicy) -> Vec<&'a FieldDescriptor> {
        let mut fields = Vec::new();
        for (depth, level) in Self::lineage(leaf).into_iter().enumerate() {
            if policy.includes(level, depth) {
                fields.extend(level.declared_fields());
            }
        }
        fields
    }

    /// Returns true if `ty` is `ancestor` or descends from it.
    pub fn descends_from(ty: &dyn TypeInfo, ancestor: &TypeKey) -> bool {
        Self::lineage(ty).iter().any(|level| level.key() == ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::marker::Marker;

    fn names(fields: &[&FieldDescriptor]) -> Vec<String> {
        fields.iter().map(|f| f.name.clone()).collect()
    }

    fn chain() -> std::sync::Arc<TypeDescriptor> {
        let root = TypeDescriptor::builder("Root")
            .field(FieldDescriptor::new("audit", "String"))
            .build();
        let mid = TypeDescriptor::builder("Mid")
            .marker(Marker::MappedSuperclass)
            .field(FieldDescriptor::new("created", "u64"))
            .extends(root)
            .build();
        TypeDescriptor::builder("Leaf")
            .field(FieldDescriptor::new("id", "u64").id())
            .field(FieldDescriptor::new("title", "String"))
            .extends(mid)
            .build()
    }

    #[test]
    fn includes_marked_ancestors_only() {
        let leaf = chain();
        let fields = FieldHierarchyCollector::collect(&*leaf, &InclusionPolicy::default());
        assert_eq!(names(&fields), vec!["id", "title", "created"]);
    }

    #[test]
    fn skipped_level_does_not_stop_the_walk() {
        let top = TypeDescriptor::builder("Top")
            .marker(Marker::inheritance())
            .field(FieldDescriptor::new("kind", "String"))
            .build();
        let plain = TypeDescriptor::builder("Plain")
            .field(FieldDescriptor::new("scratch", "String"))
            .extends(top)
            .build();
        let leaf = TypeDescriptor::builder("Leaf")
            .field(FieldDescriptor::new("id", "u64"))
            .extends(plain)
            .build();

        let fields = FieldHierarchyCollector::collect(&*leaf, &InclusionPolicy::default());
        assert_eq!(names(&fields), vec!["id", "kind"]);
    }

    #[test]
    fn leaf_is_included_without_markers() {
        let leaf = chain();
        let fields = FieldHierarchyCollector::collect(&*leaf, &InclusionPolicy::leaf_only());
        assert_eq!(names(&fields), vec!["id", "title"]);
    }

    #[test]
    fn redeclared_fields_are_kept() {
        let base = TypeDescriptor::builder("Base")
            .marker(Marker::MappedSuperclass)
            .field(FieldDescriptor::new("id", "u64").id())
            .build();
        let leaf = TypeDescriptor::builder("Leaf")
            .field(FieldDescriptor::new("id", "u64").id())
            .extends(base)
            .build();

        let fields = FieldHierarchyCollector::collect(&*leaf, &InclusionPolicy::default());
        assert_eq!(names(&fields), vec!["id", "id"]);
        assert_eq!(fields[0].declared_by, Some(TypeKey::new("Leaf")));
        assert_eq!(fields[1].declared_by, Some(TypeKey::new("Base")));
    }

    #[test]
    fn lineage_and_descent() {
        let leaf = chain();
        let lineage: Vec<&str> = FieldHierarchyCollector::lineage(&*leaf)
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(lineage, vec!["Leaf", "Mid", "Root"]);

        assert!(FieldHierarchyCollector::descends_from(&*leaf, &TypeKey::new("Root")));
        assert!(FieldHierarchyCollector::descends_from(&*leaf, &TypeKey::new("Leaf")));
        assert!(!FieldHierarchyCollector::descends_from(&*leaf, &TypeKey::new("Other")));
    }
}
