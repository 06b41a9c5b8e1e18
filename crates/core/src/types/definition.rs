//! Record type declarations.
//!
//! A [`RecordType`] is declared once through [`RecordTypeBuilder`], which
//! merges the field registries of its base types with its own fields and,
//! when asked to, promotes plain type annotations to required fields. The
//! resulting registry is frozen behind an `Arc` and shared by every record
//! the type constructs.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::errors::{DeclarationError, RecordError, ValidationReport};
use super::field::FieldSpec;
use super::record::Record;
use super::registry::FieldRegistry;
use super::schema::{TypeSpec, TypeTag};
use super::validation;
use crate::value::{Mapping, Value};

/// A plain type annotation on a record type.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Names a type (or a union of types); may still fail to resolve.
    Type(TypeSpec),
    /// Something that is not a type at all, kept as its rendering.
    Opaque(String),
}

impl Annotation {
    fn to_field(&self) -> Result<FieldSpec, DeclarationError> {
        match self {
            Self::Type(spec) => FieldSpec::required(spec.clone()),
            Self::Opaque(text) => Err(DeclarationError::UnknownType(text.clone())),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(spec) => write!(f, "{spec}"),
            Self::Opaque(text) => write!(f, "{text}"),
        }
    }
}

impl From<TypeSpec> for Annotation {
    fn from(spec: TypeSpec) -> Self {
        Self::Type(spec)
    }
}

impl From<TypeTag> for Annotation {
    fn from(tag: TypeTag) -> Self {
        Self::Type(tag.into())
    }
}

impl From<&str> for Annotation {
    fn from(name: &str) -> Self {
        Self::Type(name.into())
    }
}

/// A declared record type: its name, bases, frozen field registry and the
/// non-field attributes of its body.
#[derive(Debug)]
pub struct RecordType {
    name: String,
    description: Option<String>,
    bases: Vec<Arc<RecordType>>,
    registry: Arc<FieldRegistry>,
    attributes: Mapping,
    annotations: IndexMap<String, Annotation>,
    annotations_as_fields: bool,
}

impl RecordType {
    /// Start declaring a record type.
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            description: None,
            bases: Vec::new(),
            annotations_as_fields: false,
            fields: IndexMap::new(),
            attributes: Mapping::new(),
            annotations: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Base types, in the order they were listed.
    pub fn bases(&self) -> &[Arc<RecordType>] {
        &self.bases
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn registry(&self) -> Arc<FieldRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.registry.get(name).map(|spec| spec.as_ref())
    }

    /// A non-field attribute declared in the body of this type.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &Mapping {
        &self.attributes
    }

    /// Annotations declared on this type itself.
    pub fn annotations(&self) -> &IndexMap<String, Annotation> {
        &self.annotations
    }

    pub fn annotations_as_fields(&self) -> bool {
        self.annotations_as_fields
    }

    /// Validate a mapping and construct a record from it.
    pub fn instantiate(self: &Arc<Self>, input: Mapping) -> Result<Record, RecordError> {
        let values = validation::validate(&self.registry, input).inspect_err(|e| {
            debug!(record_type = %self.name, field = e.field(), "rejected input: {e}");
        })?;
        debug!(record_type = %self.name, keys = values.len(), "constructed record");
        Ok(Record::new(Arc::clone(self), values))
    }

    /// Construct from several mappings; later sources override earlier keys.
    pub fn instantiate_merged<I>(self: &Arc<Self>, sources: I) -> Result<Record, RecordError>
    where
        I: IntoIterator<Item = Mapping>,
    {
        self.instantiate(validation::merge_sources(sources))
    }

    /// Construct from key/value pairs.
    pub fn instantiate_pairs<K, V, I>(self: &Arc<Self>, pairs: I) -> Result<Record, RecordError>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.instantiate(crate::value::mapping(pairs))
    }

    /// Check a mapping against every field without constructing a record.
    pub fn check(&self, input: &Mapping) -> ValidationReport {
        validation::check(&self.registry, input)
    }
}

/// Declaration step for a [`RecordType`].
///
/// Bases are listed most significant first: when two bases declare the same
/// field, the one listed first wins. The type's own fields override every
/// inherited one.
#[derive(Debug, Clone)]
pub struct RecordTypeBuilder {
    name: String,
    description: Option<String>,
    bases: Vec<Arc<RecordType>>,
    annotations_as_fields: bool,
    fields: IndexMap<String, FieldSpec>,
    attributes: Mapping,
    annotations: IndexMap<String, Annotation>,
}

impl RecordTypeBuilder {
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Inherit the fields of a base type.
    pub fn extends(mut self, base: &Arc<RecordType>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Promote plain type annotations to required fields.
    pub fn annotations_as_fields(mut self, enabled: bool) -> Self {
        self.annotations_as_fields = enabled;
        self
    }

    /// Declare a field. A name holds either a field or an attribute, so this
    /// replaces an attribute of the same name.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        let name = name.into();
        self.attributes.shift_remove(&name);
        self.fields.insert(name, spec);
        self
    }

    /// Declare a non-field attribute, passed through to the type unchanged.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        self.fields.shift_remove(&name);
        self.attributes.insert(name, value.into());
        self
    }

    pub fn annotation(mut self, name: impl Into<String>, annotation: impl Into<Annotation>) -> Self {
        self.annotations.insert(name.into(), annotation.into());
        self
    }

    /// Build the registry and freeze the type.
    pub fn build(self) -> Result<Arc<RecordType>, DeclarationError> {
        let mut registry = FieldRegistry::new();

        for base in self.bases.iter().rev() {
            registry.merge(base.fields());
        }

        for (name, spec) in self.fields {
            registry.insert(name, Arc::new(spec));
        }

        if self.annotations_as_fields {
            for (name, annotation) in &self.annotations {
                if registry.contains(name) || self.attributes.contains_key(name) {
                    continue;
                }
                let spec = annotation.to_field().map_err(|_| DeclarationError::AnnotationNotAType {
                    record: self.name.clone(),
                    field: name.clone(),
                    annotation: annotation.to_string(),
                })?;
                registry.insert(name.clone(), Arc::new(spec));
            }
        }

        debug!(
            record_type = %self.name,
            bases = self.bases.len(),
            fields = registry.len(),
            "declared record type"
        );

        Ok(Arc::new(RecordType {
            name: self.name,
            description: self.description,
            bases: self.bases,
            registry: Arc::new(registry),
            attributes: self.attributes,
            annotations: self.annotations,
            annotations_as_fields: self.annotations_as_fields,
        }))
    }
}
