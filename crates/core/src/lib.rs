//! Declarative record validation.
//!
//! Declare record types with typed fields, defaults and converters, then
//! construct records from mappings: every declared field is type-checked,
//! converted or defaulted, and undeclared keys pass through unchanged.

pub mod config;
pub mod types;
pub mod value;

pub use types::{
    Annotation, CatalogError, Converter, DeclarationError, DefaultPolicy, Factory, FieldBuilder,
    FieldRegistry, FieldSpec, Record, RecordError, RecordType, RecordTypeBuilder, TypeCatalog,
    TypeRepository, TypeSpec, TypeTag, ValidationError, ValidationReport,
};
pub use value::{Mapping, Value, mapping};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
