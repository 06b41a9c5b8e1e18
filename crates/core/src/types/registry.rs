//! Ordered field registry attached to each record type.

use std::sync::Arc;

use indexmap::IndexMap;

use super::field::FieldSpec;

/// The merged, inherited collection of field specs for a record type.
///
/// Order is declaration order: inherited fields first, in the position they
/// had in the base, then new fields. Replacing a field keeps its position.
/// Only the declaration step can add fields; once attached to a record type
/// the registry is read-only.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, Arc<FieldSpec>>,
}

impl FieldRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, returning the spec it replaced.
    pub(crate) fn insert(
        &mut self,
        name: impl Into<String>,
        spec: Arc<FieldSpec>,
    ) -> Option<Arc<FieldSpec>> {
        self.fields.insert(name.into(), spec)
    }

    /// Copy every field of `other` in, overwriting same-named entries.
    pub(crate) fn merge(&mut self, other: &FieldRegistry) {
        for (name, spec) in &other.fields {
            self.fields.insert(name.clone(), Arc::clone(spec));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FieldSpec>> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec.as_ref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Names of the fields without any default policy.
    pub fn required_fields(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, spec)| spec.is_required())
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(types: &str) -> Arc<FieldSpec> {
        Arc::new(FieldSpec::required(types).unwrap())
    }

    #[test]
    fn test_empty_registry() {
        let registry = FieldRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("anything"));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut registry = FieldRegistry::new();
        registry.insert("a", spec("int"));
        registry.insert("b", spec("str"));
        let replaced = registry.insert("a", spec("float"));

        assert!(replaced.is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(registry.get("a").unwrap().admits(&crate::Value::Float(1.0)));
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = FieldRegistry::new();
        base.insert("id", spec("int"));
        base.insert("name", spec("str"));

        let mut other = FieldRegistry::new();
        other.insert("name", spec("bytes"));
        other.insert("extra", spec("list"));

        base.merge(&other);
        assert_eq!(base.names().collect::<Vec<_>>(), vec!["id", "name", "extra"]);
        assert!(base.get("name").unwrap().admits(&crate::Value::Bytes(vec![])));
    }

    #[test]
    fn test_required_fields() {
        let mut registry = FieldRegistry::new();
        registry.insert("title", spec("str"));
        registry.insert(
            "tags",
            Arc::new(FieldSpec::builder("list").optional().build().unwrap()),
        );
        assert_eq!(registry.required_fields(), vec!["title"]);
    }
}
