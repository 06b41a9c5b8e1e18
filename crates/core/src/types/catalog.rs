//! Catalog of declared record types.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::definition::RecordType;
use super::discovery::{RecordDecl, TypeRepository};
use super::errors::{CatalogError, DeclarationError};

/// Declared record types, by name.
#[derive(Debug, Default, Clone)]
pub struct TypeCatalog {
    types: IndexMap<String, Arc<RecordType>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and declare every file in the repository.
    ///
    /// Types are declared in dependency order so each `extends` entry can be
    /// resolved against an already-declared type.
    pub fn load(repo: &TypeRepository) -> Result<Self, CatalogError> {
        let decls = repo.load_all()?;
        let mut catalog = Self::new();
        let mut in_progress = Vec::new();

        for name in decls.keys() {
            catalog.declare_one(name, &decls, &mut in_progress)?;
        }

        debug!(
            types = catalog.len(),
            root = %repo.root.display(),
            "loaded record type catalog"
        );
        Ok(catalog)
    }

    fn declare_one(
        &mut self,
        name: &str,
        decls: &IndexMap<String, (PathBuf, RecordDecl)>,
        in_progress: &mut Vec<String>,
    ) -> Result<Arc<RecordType>, CatalogError> {
        if let Some(existing) = self.types.get(name) {
            return Ok(Arc::clone(existing));
        }

        let Some((path, decl)) = decls.get(name) else {
            return Err(CatalogError::NotFound(name.to_string()));
        };
        let invalid = |source: DeclarationError| CatalogError::Declaration { path: path.clone(), source };

        if in_progress.iter().any(|n| n == name) {
            return Err(invalid(DeclarationError::InheritanceCycle(name.to_string())));
        }
        in_progress.push(name.to_string());

        let mut bases = Vec::with_capacity(decl.extends.len());
        for base in &decl.extends {
            if !decls.contains_key(base) && !self.types.contains_key(base) {
                return Err(invalid(DeclarationError::UnknownBase {
                    record: name.to_string(),
                    base: base.clone(),
                }));
            }
            bases.push(self.declare_one(base, decls, in_progress)?);
        }

        in_progress.pop();

        let record_type = decl.declare(name, &bases).map_err(invalid)?;
        debug!(record_type = name, path = %path.display(), "declared from file");
        self.types.insert(name.to_string(), Arc::clone(&record_type));
        Ok(record_type)
    }

    /// Add a type declared in code.
    pub fn register(&mut self, record_type: Arc<RecordType>) -> Result<(), CatalogError> {
        let name = record_type.name().to_string();
        if self.types.contains_key(&name) {
            return Err(CatalogError::Duplicate(name));
        }
        self.types.insert(name, record_type);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<RecordType>, CatalogError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.types.values()
    }
}
