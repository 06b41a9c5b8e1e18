//! Error types for record declarations and validation.

use std::path::PathBuf;
use thiserror::Error;

use super::schema::AcceptedTypes;
use crate::value::Value;

/// Errors raised while declaring a field or a record type.
///
/// These are programming errors in the declaration itself and are never
/// recovered from by the engine.
#[derive(Debug, Clone, Error)]
pub enum DeclarationError {
    /// A type name is not in the built-in lookup table.
    #[error("unknown type name: '{0}'")]
    UnknownType(String),

    /// A type union lists no types.
    #[error("type union must name at least one type")]
    EmptyTypeUnion,

    /// A converter name does not resolve to a callable converter.
    #[error("unknown converter: '{0}'")]
    UnknownConverter(String),

    /// A default factory name does not resolve to a callable factory.
    #[error("unknown default factory: '{0}'")]
    UnknownFactory(String),

    /// A literal default is not an instance of the field's types.
    #[error("default {value} is not an instance of {expected}")]
    DefaultTypeMismatch { value: Value, expected: AcceptedTypes },

    /// More than one default policy given for one field.
    #[error("field '{0}' declares more than one of default, default_factory and optional")]
    ConflictingDefaults(String),

    /// An annotation promoted to a field is not a usable type.
    #[error(
        "annotation of '{field}' on record type '{record}' must be a type when annotations are fields, got {annotation}"
    )]
    AnnotationNotAType {
        record: String,
        field: String,
        annotation: String,
    },

    /// A record type extends a type that was never declared.
    #[error("record type '{record}' extends unknown type '{base}'")]
    UnknownBase { record: String, base: String },

    /// Record types extend each other in a loop.
    #[error("inheritance cycle through record type '{0}'")]
    InheritanceCycle(String),
}

/// Errors that occur while validating an input mapping.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// A present value is not an instance of the field's types.
    #[error(
        "invalid type for field '{field}': expected {expected}, got {kind} {value}",
        kind = .value.type_name()
    )]
    TypeMismatch {
        field: String,
        value: Value,
        expected: AcceptedTypes,
    },

    /// A required field is absent and has no default.
    #[error("{message}")]
    MissingField {
        field: String,
        expected: AcceptedTypes,
        message: String,
    },

    /// A converter rejected a present, well-typed value.
    #[error("converter for field '{field}' rejected {value}: {message}")]
    ConversionFailed {
        field: String,
        value: Value,
        message: String,
    },
}

impl ValidationError {
    pub(crate) fn missing(field: &str, expected: &AcceptedTypes) -> Self {
        Self::MissingField {
            field: field.to_string(),
            expected: expected.clone(),
            message: format!("missing required field '{field}', which is a {expected} object"),
        }
    }

    /// Name of the field the error is about.
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch { field, .. }
            | Self::MissingField { field, .. }
            | Self::ConversionFailed { field, .. } => field,
        }
    }
}

/// Errors that abort constructing a record.
#[derive(Debug, Clone, Error)]
pub enum RecordError {
    /// The input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A default factory broke its declaration: its result is not an
    /// instance of the field's types. This is a bug in the record type, not
    /// in the input.
    #[error(
        "default factory for field '{field}' produced {produced}, which is not an instance of {expected}"
    )]
    FactoryContract {
        field: String,
        produced: Value,
        expected: AcceptedTypes,
    },
}

impl RecordError {
    pub fn field(&self) -> &str {
        match self {
            Self::Validation(e) => e.field(),
            Self::FactoryContract { field, .. } => field,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            Self::FactoryContract { .. } => None,
        }
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::FactoryContract { .. })
    }
}

/// Every problem found when checking a mapping without constructing a record.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    errors: Vec<RecordError>,
}

impl ValidationReport {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }

    pub fn add_error(&mut self, error: RecordError) {
        self.errors.push(error);
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    /// The first error, if any, as a result.
    pub fn into_result(self) -> Result<(), RecordError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Errors that can occur when loading record type declaration files.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Declarations directory cannot be resolved.
    #[error("record types directory is not accessible: {0}")]
    MissingDir(String),

    /// Error walking the declarations directory.
    #[error("failed to read types directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),

    /// Error reading a declaration file.
    #[error("failed to read record type file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a declaration file.
    #[error("failed to parse record type file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file parsed but does not declare a valid record type.
    #[error("invalid record type in {path}: {source}")]
    Declaration {
        path: PathBuf,
        #[source]
        source: DeclarationError,
    },

    /// Record type not found.
    #[error("record type not found: {0}")]
    NotFound(String),

    /// Two record types with the same name.
    #[error("duplicate record type: {0}")]
    Duplicate(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::schema::TypeTag;

    #[test]
    fn test_missing_field_message() {
        let expected = AcceptedTypes::single(TypeTag::Str);
        let err = ValidationError::missing("gender", &expected);
        assert_eq!(err.field(), "gender");
        assert_eq!(err.to_string(), "missing required field 'gender', which is a str object");
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = ValidationError::TypeMismatch {
            field: "age".to_string(),
            value: Value::from("old"),
            expected: AcceptedTypes::resolve(&["int", "float"].into()).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "invalid type for field 'age': expected int or float, got str 'old'"
        );
    }

    #[test]
    fn test_record_error_transparent() {
        let err = RecordError::from(ValidationError::missing(
            "count",
            &AcceptedTypes::single(TypeTag::Int),
        ));
        assert_eq!(err.field(), "count");
        assert!(err.as_validation().is_some());
        assert!(!err.is_contract_violation());
        assert!(err.to_string().starts_with("missing required field 'count'"));
    }

    #[test]
    fn test_report_collects_errors() {
        let mut report = ValidationReport::success();
        assert!(report.is_valid());

        report.add_error(ValidationError::missing("a", &AcceptedTypes::single(TypeTag::Int)).into());
        let mut other = ValidationReport::success();
        other.add_error(ValidationError::missing("b", &AcceptedTypes::single(TypeTag::Int)).into());
        report.merge(other);

        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 2);
        assert_eq!(report.into_result().unwrap_err().field(), "a");
    }
}
