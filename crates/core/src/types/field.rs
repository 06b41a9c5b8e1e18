//! Field declarations: accepted types, default policy, converter.

use std::fmt;
use std::sync::Arc;

use super::errors::DeclarationError;
use super::schema::{AcceptedTypes, TypeSpec, TypeTag};
use crate::value::Value;

type ConvertFn = dyn Fn(Value) -> Result<Value, String> + Send + Sync;
type FactoryFn = dyn Fn() -> Value + Send + Sync;

/// String converters available to declaration files besides the type names.
const STRING_CONVERTERS: &[&str] = &["lower", "upper", "strip"];

/// A unary transform applied to a present, well-typed value.
#[derive(Clone)]
pub struct Converter {
    name: String,
    func: Arc<ConvertFn>,
}

impl Converter {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self { name: name.into(), func: Arc::new(func) }
    }

    /// Convert with a built-in type, e.g. `int` truncates floats.
    pub fn to_type(tag: TypeTag) -> Self {
        Self::new(tag.as_str(), move |value| tag.convert(value))
    }

    /// Look up a converter by name: any built-in type name except `object`,
    /// or one of `lower`, `upper`, `strip`.
    pub fn builtin(name: &str) -> Result<Self, DeclarationError> {
        let unknown = || DeclarationError::UnknownConverter(name.to_string());
        if STRING_CONVERTERS.contains(&name) {
            let op = name.to_string();
            return Ok(Self::new(name, move |value| match value {
                Value::Str(s) => Ok(Value::Str(match op.as_str() {
                    "lower" => s.to_lowercase(),
                    "upper" => s.to_uppercase(),
                    _ => s.trim().to_string(),
                })),
                other => Err(format!(
                    "'{op}' requires a str, not '{}'",
                    other.type_name()
                )),
            }));
        }
        match name.parse::<TypeTag>() {
            Ok(TypeTag::Object) | Err(_) => Err(unknown()),
            Ok(tag) => Ok(Self::to_type(tag)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, value: Value) -> Result<Value, String> {
        (self.func)(value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({})", self.name)
    }
}

/// A zero-argument producer of default values, called once per absent field.
#[derive(Clone)]
pub struct Factory {
    name: String,
    func: Arc<FactoryFn>,
}

impl Factory {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self { name: name.into(), func: Arc::new(func) }
    }

    /// The zero value of a built-in type (`float` gives `0.0`).
    pub fn zero_of(tag: TypeTag) -> Self {
        Self::new(tag.as_str(), move || tag.zero_value())
    }

    /// Look up a factory by built-in type name.
    pub fn builtin(name: &str) -> Result<Self, DeclarationError> {
        name.parse::<TypeTag>()
            .map(Self::zero_of)
            .map_err(|_| DeclarationError::UnknownFactory(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn produce(&self) -> Value {
        (self.func)()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Factory({})", self.name)
    }
}

/// What happens when a field is absent from the input.
#[derive(Debug, Clone, Default)]
pub enum DefaultPolicy {
    /// The field is required.
    #[default]
    NoDefault,
    /// Absence is fine and nothing is written.
    Optional,
    /// Write this value.
    Fixed(Value),
    /// Write a fresh value from the factory.
    Factory(Factory),
}

impl fmt::Display for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDefault => f.write_str("required"),
            Self::Optional => f.write_str("optional"),
            Self::Fixed(value) => write!(f, "{value}"),
            Self::Factory(factory) => write!(f, "{}()", factory.name()),
        }
    }
}

/// The type contract of one named slot.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    accepted: AcceptedTypes,
    default: DefaultPolicy,
    converter: Option<Converter>,
    description: Option<String>,
}

impl FieldSpec {
    /// Start declaring a field that accepts the given type(s).
    pub fn builder(types: impl Into<TypeSpec>) -> FieldBuilder {
        FieldBuilder {
            types: types.into(),
            description: None,
            default: DefaultPolicy::NoDefault,
            converter: None,
        }
    }

    /// A required field with no converter or description.
    pub fn required(types: impl Into<TypeSpec>) -> Result<Self, DeclarationError> {
        Self::builder(types).build()
    }

    /// A required field accepting any value.
    pub fn any() -> Self {
        Self {
            accepted: AcceptedTypes::single(TypeTag::Object),
            default: DefaultPolicy::NoDefault,
            converter: None,
            description: None,
        }
    }

    pub fn accepted_types(&self) -> &AcceptedTypes {
        &self.accepted
    }

    pub fn default_policy(&self) -> &DefaultPolicy {
        &self.default
    }

    pub fn converter(&self) -> Option<&Converter> {
        self.converter.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the value is an instance of one of the accepted types.
    pub fn admits(&self, value: &Value) -> bool {
        self.accepted.admits(value)
    }

    pub fn has_default(&self) -> bool {
        !matches!(self.default, DefaultPolicy::NoDefault)
    }

    pub fn is_required(&self) -> bool {
        !self.has_default()
    }
}

/// Builder for [`FieldSpec`]; every check runs in [`FieldBuilder::build`].
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    types: TypeSpec,
    description: Option<String>,
    default: DefaultPolicy,
    converter: Option<Converter>,
}

impl FieldBuilder {
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Fixed default, written as-is when the field is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultPolicy::Fixed(value.into());
        self
    }

    /// Allow the field to be absent without writing anything.
    pub fn optional(mut self) -> Self {
        self.default = DefaultPolicy::Optional;
        self
    }

    pub fn factory(mut self, factory: Factory) -> Self {
        self.default = DefaultPolicy::Factory(factory);
        self
    }

    /// Factory default from a closure.
    pub fn factory_fn<F>(self, func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.factory(Factory::new("<closure>", func))
    }

    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Converter from a closure.
    pub fn convert_with<F>(self, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.converter(Converter::new("<closure>", func))
    }

    /// Resolve the types and check a literal default against them.
    pub fn build(self) -> Result<FieldSpec, DeclarationError> {
        let accepted = AcceptedTypes::resolve(&self.types)?;

        if let DefaultPolicy::Fixed(value) = &self.default
            && !accepted.admits(value)
        {
            return Err(DeclarationError::DefaultTypeMismatch {
                value: value.clone(),
                expected: accepted,
            });
        }

        Ok(FieldSpec {
            accepted,
            default: self.default,
            converter: self.converter,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field() {
        let spec = FieldSpec::required("str").unwrap();
        assert!(spec.is_required());
        assert!(!spec.has_default());
        assert!(spec.admits(&Value::from("x")));
        assert!(!spec.admits(&Value::Int(1)));
        assert!(spec.converter().is_none());
    }

    #[test]
    fn test_any_field() {
        let spec = FieldSpec::any();
        assert!(spec.admits(&Value::Null));
        assert_eq!(spec.accepted_types().tags(), &[TypeTag::Object]);
    }

    #[test]
    fn test_union_with_fixed_default() {
        let spec = FieldSpec::builder(["int", "float"])
            .default(8)
            .converter(Converter::to_type(TypeTag::Int))
            .description("age in years")
            .build()
            .unwrap();
        assert!(spec.has_default());
        assert!(matches!(spec.default_policy(), DefaultPolicy::Fixed(Value::Int(8))));
        assert_eq!(spec.description(), Some("age in years"));
        assert_eq!(spec.converter().unwrap().name(), "int");
    }

    #[test]
    fn test_nonconforming_literal_default_fails_at_declaration() {
        let err = FieldSpec::builder("int").default("eight").build().unwrap_err();
        assert!(matches!(err, DeclarationError::DefaultTypeMismatch { .. }));
    }

    #[test]
    fn test_factory_is_not_checked_at_declaration() {
        let spec = FieldSpec::builder("int").factory_fn(|| Value::from("nope")).build();
        assert!(spec.is_ok());
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let err = FieldSpec::builder(vec!["int", "nope"]).optional().build().unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownType(name) if name == "nope"));
    }

    #[test]
    fn test_last_default_policy_wins() {
        let spec = FieldSpec::builder("dict").default(Value::Null).optional().build().unwrap();
        assert!(matches!(spec.default_policy(), DefaultPolicy::Optional));
    }

    #[test]
    fn test_builtin_converters() {
        let int = Converter::builtin("int").unwrap();
        assert_eq!(int.apply(Value::Float(21.9)), Ok(Value::Int(21)));

        let lower = Converter::builtin("lower").unwrap();
        assert_eq!(lower.apply(Value::from("BoB")), Ok(Value::from("bob")));
        assert!(lower.apply(Value::Int(1)).is_err());

        assert!(matches!(
            Converter::builtin("object"),
            Err(DeclarationError::UnknownConverter(_))
        ));
        assert!(matches!(
            Converter::builtin("titlecase"),
            Err(DeclarationError::UnknownConverter(_))
        ));
    }

    #[test]
    fn test_bytes_converter_bounds_zero_fill() {
        let bytes = Converter::builtin("bytes").unwrap();
        assert_eq!(bytes.apply(Value::Int(3)), Ok(Value::Bytes(vec![0, 0, 0])));
        assert_eq!(bytes.apply(Value::Int(-1)), Err("negative count".to_string()));

        let err = bytes.apply(Value::Int(i64::MAX)).unwrap_err();
        assert!(err.starts_with("cannot allocate"), "{err}");
    }

    #[test]
    fn test_builtin_factories() {
        let float = Factory::builtin("float").unwrap();
        assert_eq!(float.produce(), Value::Float(0.0));
        assert_eq!(format!("{float:?}"), "Factory(float)");
        assert!(matches!(
            Factory::builtin("widget"),
            Err(DeclarationError::UnknownFactory(_))
        ));
    }

    #[test]
    fn test_default_policy_display() {
        assert_eq!(DefaultPolicy::NoDefault.to_string(), "required");
        assert_eq!(DefaultPolicy::Optional.to_string(), "optional");
        assert_eq!(DefaultPolicy::Fixed(Value::Float(0.0)).to_string(), "0.0");
        assert_eq!(
            DefaultPolicy::Factory(Factory::zero_of(TypeTag::List)).to_string(),
            "list()"
        );
    }
}
