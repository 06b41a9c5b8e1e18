//! Record type declaration files: discovery and parsing.
//!
//! Each `<name>.toml` file directly under a types directory declares one
//! record type named after the file stem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use walkdir::WalkDir;

use super::definition::{Annotation, RecordType};
use super::errors::{CatalogError, DeclarationError};
use super::field::{Converter, Factory, FieldSpec};
use super::schema::TypeSpec;
use crate::value::Value;

/// Location of a discovered declaration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclInfo {
    /// Record type name (file stem).
    pub name: String,
    /// Path to the `.toml` file.
    pub path: PathBuf,
}

impl DeclInfo {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self { name: name.into(), path }
    }
}

/// The `type` key of a field: one name or a union.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    One(String),
    Union(Vec<String>),
}

impl From<&TypeDecl> for TypeSpec {
    fn from(decl: &TypeDecl) -> Self {
        match decl {
            TypeDecl::One(name) => TypeSpec::from(name.as_str()),
            TypeDecl::Union(names) => TypeSpec::from(names.clone()),
        }
    }
}

/// One `[fields.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    #[serde(rename = "type")]
    pub types: TypeDecl,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<toml::Value>,
    #[serde(default)]
    pub default_factory: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub converter: Option<String>,
}

impl FieldDecl {
    /// Build the field spec. At most one of `default`, `default_factory`
    /// and `optional` may be given.
    pub fn to_spec(&self, name: &str) -> Result<FieldSpec, DeclarationError> {
        let policies = [self.default.is_some(), self.default_factory.is_some(), self.optional];
        if policies.iter().filter(|set| **set).count() > 1 {
            return Err(DeclarationError::ConflictingDefaults(name.to_string()));
        }

        let mut builder = FieldSpec::builder(TypeSpec::from(&self.types));
        if let Some(text) = &self.description {
            builder = builder.description(text.clone());
        }
        if let Some(value) = &self.default {
            builder = builder.default(Value::from(value.clone()));
        }
        if let Some(factory) = &self.default_factory {
            builder = builder.factory(Factory::builtin(factory)?);
        }
        if self.optional {
            builder = builder.optional();
        }
        if let Some(converter) = &self.converter {
            builder = builder.converter(Converter::builtin(converter)?);
        }
        builder.build()
    }
}

/// Contents of one declaration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDecl {
    #[serde(default)]
    pub description: Option<String>,
    /// Base type names, most significant first.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub annotations_as_fields: bool,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDecl>,
    #[serde(default)]
    pub annotations: IndexMap<String, toml::Value>,
    #[serde(default)]
    pub attributes: IndexMap<String, toml::Value>,
}

impl RecordDecl {
    /// Declare the record type. `bases` must be the already-declared types
    /// named by `extends`, in the same order.
    pub fn declare(
        &self,
        name: &str,
        bases: &[Arc<RecordType>],
    ) -> Result<Arc<RecordType>, DeclarationError> {
        let mut builder =
            RecordType::builder(name).annotations_as_fields(self.annotations_as_fields);
        if let Some(text) = &self.description {
            builder = builder.description(text.clone());
        }
        for base in bases {
            builder = builder.extends(base);
        }
        for (attr, value) in &self.attributes {
            builder = builder.attribute(attr.clone(), Value::from(value.clone()));
        }
        for (field, decl) in &self.fields {
            builder = builder.field(field.clone(), decl.to_spec(field)?);
        }
        for (field, value) in &self.annotations {
            builder = builder.annotation(field.clone(), annotation_from_toml(value));
        }
        builder.build()
    }
}

/// Strings name a type, arrays of strings a union, anything else is opaque.
fn annotation_from_toml(value: &toml::Value) -> Annotation {
    match value {
        toml::Value::String(name) => Annotation::from(name.as_str()),
        toml::Value::Array(items) => {
            let names: Option<Vec<String>> =
                items.iter().map(|item| item.as_str().map(str::to_string)).collect();
            match names {
                Some(names) => Annotation::Type(TypeSpec::from(names)),
                None => Annotation::Opaque(value.to_string()),
            }
        }
        other => Annotation::Opaque(other.to_string()),
    }
}

/// Discover declaration files in a directory.
///
/// Finds all `.toml` files in the given directory (non-recursive).
/// Returns an empty list if the directory doesn't exist.
pub fn discover_types(root: &Path) -> Result<Vec<DeclInfo>, CatalogError> {
    if !root.exists() {
        return Ok(vec![]);
    }

    let root = root
        .canonicalize()
        .map_err(|_| CatalogError::MissingDir(root.display().to_string()))?;

    let mut out = Vec::new();

    for entry in WalkDir::new(&root).max_depth(1) {
        let entry = entry.map_err(|e| CatalogError::WalkError(root.display().to_string(), e))?;

        let path = entry.path();
        if !path.is_file() || !is_toml_file(path) {
            continue;
        }

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("").to_string();
        if !name.is_empty() {
            out.push(DeclInfo::new(name, path.to_path_buf()));
        }
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn is_toml_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("toml")
}

/// Repository of discovered declaration files.
#[derive(Debug, Clone)]
pub struct TypeRepository {
    /// Root directory for declarations.
    pub root: PathBuf,
    /// Discovered declaration files, sorted by name.
    pub decls: Vec<DeclInfo>,
}

impl TypeRepository {
    /// Create a repository from a directory.
    ///
    /// Returns an empty repository if the directory doesn't exist.
    pub fn new(root: &Path) -> Result<Self, CatalogError> {
        let decls = discover_types(root)?;
        Ok(Self { root: root.to_path_buf(), decls })
    }

    pub fn list_all(&self) -> &[DeclInfo] {
        &self.decls
    }

    pub fn has_decl(&self, name: &str) -> bool {
        self.decls.iter().any(|d| d.name == name)
    }

    /// Load one declaration by name.
    pub fn load_decl(&self, name: &str) -> Result<RecordDecl, CatalogError> {
        let info = self
            .decls
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;

        load_decl_from_file(&info.path)
    }

    /// Load every declaration, keyed by name in discovery order.
    pub fn load_all(&self) -> Result<IndexMap<String, (PathBuf, RecordDecl)>, CatalogError> {
        let mut result = IndexMap::new();
        for info in &self.decls {
            let decl = load_decl_from_file(&info.path)?;
            result.insert(info.name.clone(), (info.path.clone(), decl));
        }
        Ok(result)
    }
}

/// Read and parse one declaration file.
pub fn load_decl_from_file(path: &Path) -> Result<RecordDecl, CatalogError> {
    let source = fs::read_to_string(path)
        .map_err(|e| CatalogError::Io { path: path.to_path_buf(), source: e })?;

    toml::from_str(&source).map_err(|e| CatalogError::Parse { path: path.to_path_buf(), source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::field::DefaultPolicy;
    use crate::types::schema::TypeTag;
    use tempfile::TempDir;

    fn types_dir() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("types");
        fs::create_dir_all(&dir).unwrap();
        (temp, dir)
    }

    fn parse(source: &str) -> RecordDecl {
        toml::from_str(source).unwrap()
    }

    #[test]
    fn test_discover_types_missing_dir() {
        let temp = TempDir::new().unwrap();
        let decls = discover_types(&temp.path().join("nonexistent")).unwrap();
        assert!(decls.is_empty());
    }

    #[test]
    fn test_discover_types_sorted_and_filtered() {
        let (_temp, dir) = types_dir();
        fs::write(dir.join("person.toml"), "").unwrap();
        fs::write(dir.join("base.toml"), "").unwrap();
        fs::write(dir.join("readme.md"), "# Types").unwrap();
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("hidden.toml"), "").unwrap();

        let decls = discover_types(&dir).unwrap();
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["base", "person"]);
    }

    #[test]
    fn test_load_decl() {
        let (_temp, dir) = types_dir();
        fs::write(
            dir.join("person.toml"),
            r#"
description = "A person"
extends = ["named"]

[fields.age]
type = ["int", "float"]
default = 8
converter = "int"

[fields.tags]
type = "list"
default_factory = "list"
"#,
        )
        .unwrap();

        let repo = TypeRepository::new(&dir).unwrap();
        assert!(repo.has_decl("person"));
        let decl = repo.load_decl("person").unwrap();
        assert_eq!(decl.description.as_deref(), Some("A person"));
        assert_eq!(decl.extends, vec!["named"]);
        assert_eq!(decl.fields.keys().collect::<Vec<_>>(), vec!["age", "tags"]);
    }

    #[test]
    fn test_decl_not_found() {
        let (_temp, dir) = types_dir();
        let repo = TypeRepository::new(&dir).unwrap();
        assert!(matches!(repo.load_decl("ghost"), Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        let (_temp, dir) = types_dir();
        fs::write(dir.join("bad.toml"), "[fields.x]\ntype = \"int\"\nrequired = true\n").unwrap();
        let repo = TypeRepository::new(&dir).unwrap();
        assert!(matches!(repo.load_decl("bad"), Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn test_declare_builds_record_type() {
        let decl = parse(
            r#"
annotations_as_fields = true

[fields.salary]
type = ["int", "float"]
default = 0.0

[annotations]
gender = "str"
ratio = ["int", "float"]

[attributes]
kind = "person"
"#,
        );
        let rt = decl.declare("person", &[]).unwrap();
        assert_eq!(rt.fields().names().collect::<Vec<_>>(), vec!["salary", "gender", "ratio"]);
        assert!(rt.field("gender").unwrap().is_required());
        assert_eq!(rt.field("ratio").unwrap().accepted_types().tags(), &[TypeTag::Int, TypeTag::Float]);
        assert_eq!(rt.attribute("kind"), Some(&Value::from("person")));
    }

    #[test]
    fn test_field_policies() {
        let decl = parse(
            r#"
[fields.a]
type = "dict"
optional = true

[fields.b]
type = "float"
default_factory = "float"
"#,
        );
        let rt = decl.declare("policies", &[]).unwrap();
        assert!(matches!(rt.field("a").unwrap().default_policy(), DefaultPolicy::Optional));
        assert!(matches!(rt.field("b").unwrap().default_policy(), DefaultPolicy::Factory(_)));
    }

    #[test]
    fn test_conflicting_defaults() {
        let decl = parse("[fields.a]\ntype = \"int\"\ndefault = 1\noptional = true\n");
        let err = decl.declare("conflict", &[]).unwrap_err();
        assert!(matches!(err, DeclarationError::ConflictingDefaults(field) if field == "a"));
    }

    #[test]
    fn test_unknown_converter_and_factory() {
        let decl = parse("[fields.a]\ntype = \"str\"\nconverter = \"titlecase\"\n");
        assert!(matches!(decl.declare("t", &[]), Err(DeclarationError::UnknownConverter(_))));

        let decl = parse("[fields.a]\ntype = \"str\"\ndefault_factory = \"widget\"\n");
        assert!(matches!(decl.declare("t", &[]), Err(DeclarationError::UnknownFactory(_))));
    }

    #[test]
    fn test_non_type_annotation() {
        let decl = parse("annotations_as_fields = true\n[annotations]\nweird = 5\n");
        let err = decl.declare("t", &[]).unwrap_err();
        assert!(matches!(err, DeclarationError::AnnotationNotAType { annotation, .. } if annotation == "5"));
    }
}
