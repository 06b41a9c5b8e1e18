//! Declarative record types.
//!
//! A record type declares named fields, each with accepted types, a default
//! policy and an optional converter. Constructing a record validates the
//! input mapping against the type's field registry and normalizes it.
//!
//! Types can be declared in code through [`RecordType::builder`] or loaded
//! from TOML files in a types directory.
//!
//! # Example Declaration File
//!
//! ```toml
//! # ~/schemas/person.toml
//! description = "A person"
//! annotations_as_fields = true
//!
//! [fields.age]
//! type = ["int", "float"]
//! default = 8
//! converter = "int"
//!
//! [fields.salary]
//! type = ["int", "float"]
//! default_factory = "float"
//!
//! [annotations]
//! name = "str"
//! ```

pub mod catalog;
pub mod definition;
pub mod discovery;
pub mod errors;
pub mod field;
pub mod record;
pub mod registry;
pub mod schema;
pub mod validation;

// Re-export commonly used types
pub use catalog::TypeCatalog;
pub use definition::{Annotation, RecordType, RecordTypeBuilder};
pub use discovery::{DeclInfo, RecordDecl, TypeRepository};
pub use errors::{CatalogError, DeclarationError, RecordError, ValidationError, ValidationReport};
pub use field::{Converter, DefaultPolicy, Factory, FieldBuilder, FieldSpec};
pub use record::Record;
pub use registry::FieldRegistry;
pub use schema::{AcceptedTypes, MAX_ZEROED_BYTES, TypeRef, TypeSpec, TypeTag};
pub use validation::{check, merge_sources, validate};
