//! Built-in type tags and the accepted-type sets fields are declared with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DeclarationError;
use crate::value::{Mapping, Value};

/// A built-in type a field can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// Any value.
    Object,
    Bool,
    /// Integers; booleans are a subtype.
    Int,
    Float,
    Str,
    Bytes,
    List,
    Tuple,
    Dict,
}

impl TypeTag {
    pub const ALL: [TypeTag; 9] = [
        Self::Object,
        Self::Bool,
        Self::Int,
        Self::Float,
        Self::Str,
        Self::Bytes,
        Self::List,
        Self::Tuple,
        Self::Dict,
    ];

    /// Get the display name for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
        }
    }

    /// Nominal membership test. No conversion is attempted.
    pub fn admits(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Object, _)
                | (Self::Bool, Value::Bool(_))
                | (Self::Int, Value::Int(_) | Value::Bool(_))
                | (Self::Float, Value::Float(_))
                | (Self::Str, Value::Str(_))
                | (Self::Bytes, Value::Bytes(_))
                | (Self::List, Value::List(_))
                | (Self::Tuple, Value::Tuple(_))
                | (Self::Dict, Value::Dict(_))
        )
    }

    /// The value produced by calling the type with no arguments.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Object => Value::Null,
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::Str => Value::Str(String::new()),
            Self::Bytes => Value::Bytes(Vec::new()),
            Self::List => Value::List(Vec::new()),
            Self::Tuple => Value::Tuple(Vec::new()),
            Self::Dict => Value::Dict(Mapping::new()),
        }
    }

    /// Convert a value into this type, the way calling the type on it would.
    pub fn convert(&self, value: Value) -> Result<Value, String> {
        match self {
            Self::Object => Ok(value),
            Self::Bool => Ok(Value::Bool(value.is_truthy())),
            Self::Int => to_int(value).map(Value::Int),
            Self::Float => to_float(value).map(Value::Float),
            Self::Str => Ok(Value::Str(value.to_text())),
            Self::Bytes => to_bytes(value).map(Value::Bytes),
            Self::List => to_items(value).map(Value::List),
            Self::Tuple => to_items(value).map(Value::Tuple),
            Self::Dict => to_mapping(value).map(Value::Dict),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "object" | "any" => Ok(Self::Object),
            "bool" | "boolean" => Ok(Self::Bool),
            "int" | "integer" => Ok(Self::Int),
            "float" | "floating-point" | "double" => Ok(Self::Float),
            "str" | "string" => Ok(Self::Str),
            "bytes" => Ok(Self::Bytes),
            "list" | "array" => Ok(Self::List),
            "tuple" => Ok(Self::Tuple),
            "dict" | "mapping" | "map" => Ok(Self::Dict),
            _ => Err(DeclarationError::UnknownType(s.to_string())),
        }
    }
}

fn to_int(value: Value) -> Result<i64, String> {
    match value {
        Value::Int(i) => Ok(i),
        Value::Bool(b) => Ok(i64::from(b)),
        Value::Float(x) if x.is_nan() => Err("cannot convert float NaN to integer".into()),
        Value::Float(x) if x.is_infinite() => {
            Err("cannot convert float infinity to integer".into())
        }
        Value::Float(x) => {
            let t = x.trunc();
            if t < i64::MIN as f64 || t >= i64::MAX as f64 {
                Err(format!("float {x} is out of integer range"))
            } else {
                Ok(t as i64)
            }
        }
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("invalid literal for int(): {}", Value::Str(s.clone()))),
        other => Err(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        )),
    }
}

fn to_float(value: Value) -> Result<f64, String> {
    match value {
        Value::Float(x) => Ok(x),
        Value::Int(i) => Ok(i as f64),
        Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("could not convert string to float: {}", Value::Str(s.clone()))),
        other => Err(format!(
            "float() argument must be a string or a number, not '{}'",
            other.type_name()
        )),
    }
}

fn to_items(value: Value) -> Result<Vec<Value>, String> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        Value::Bytes(bytes) => Ok(bytes.into_iter().map(|b| Value::Int(i64::from(b))).collect()),
        Value::Dict(map) => Ok(map.into_keys().map(Value::Str).collect()),
        other => Err(format!("'{}' object is not iterable", other.type_name())),
    }
}

/// Largest zero-filled buffer `bytes` will build from an int.
pub const MAX_ZEROED_BYTES: usize = 16 * 1024 * 1024;

fn to_bytes(value: Value) -> Result<Vec<u8>, String> {
    match value {
        Value::Bytes(bytes) => Ok(bytes),
        Value::Int(n) => {
            let len = usize::try_from(n).map_err(|_| "negative count".to_string())?;
            if len > MAX_ZEROED_BYTES {
                return Err(format!(
                    "cannot allocate {len} zero bytes (limit is {MAX_ZEROED_BYTES})"
                ));
            }
            let mut bytes = Vec::new();
            bytes
                .try_reserve_exact(len)
                .map_err(|e| format!("cannot allocate {len} zero bytes: {e}"))?;
            bytes.resize(len, 0);
            Ok(bytes)
        }
        Value::List(items) | Value::Tuple(items) => items
            .iter()
            .map(|item| match item {
                Value::Int(i) => u8::try_from(*i).map_err(|_| "bytes must be in range(0, 256)".to_string()),
                other => Err(format!(
                    "'{}' object cannot be interpreted as an integer",
                    other.type_name()
                )),
            })
            .collect(),
        Value::Str(_) => Err("string argument without an encoding".into()),
        other => Err(format!("cannot convert '{}' object to bytes", other.type_name())),
    }
}

fn to_mapping(value: Value) -> Result<Mapping, String> {
    match value {
        Value::Dict(map) => Ok(map),
        Value::List(items) | Value::Tuple(items) => {
            let mut map = Mapping::new();
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Value::List(pair) | Value::Tuple(pair) if pair.len() == 2 => {
                        let mut pair = pair.into_iter();
                        match (pair.next(), pair.next()) {
                            (Some(Value::Str(key)), Some(value)) => {
                                map.insert(key, value);
                            }
                            _ => return Err(format!("dictionary key #{i} must be a string")),
                        }
                    }
                    _ => {
                        return Err(format!(
                            "dictionary update sequence element #{i} is not a key/value pair"
                        ));
                    }
                }
            }
            Ok(map)
        }
        other => Err(format!(
            "cannot convert '{}' object to dictionary",
            other.type_name()
        )),
    }
}

/// One element of a type declaration: a direct tag or a name to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Tag(TypeTag),
    Name(String),
}

impl TypeRef {
    pub fn resolve(&self) -> Result<TypeTag, DeclarationError> {
        match self {
            Self::Tag(tag) => Ok(*tag),
            Self::Name(name) => name.parse(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "{tag}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<TypeTag> for TypeRef {
    fn from(tag: TypeTag) -> Self {
        Self::Tag(tag)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// The type part of a field declaration: one type or an ordered union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    One(TypeRef),
    Union(Vec<TypeRef>),
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(r) => write!(f, "{r}"),
            Self::Union(refs) => {
                let names: Vec<String> = refs.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

impl From<TypeTag> for TypeSpec {
    fn from(tag: TypeTag) -> Self {
        Self::One(TypeRef::Tag(tag))
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        Self::One(TypeRef::from(name))
    }
}

impl From<String> for TypeSpec {
    fn from(name: String) -> Self {
        Self::One(TypeRef::Name(name))
    }
}

impl<T: Into<TypeRef>> From<Vec<T>> for TypeSpec {
    fn from(refs: Vec<T>) -> Self {
        Self::Union(refs.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<TypeRef>, const N: usize> From<[T; N]> for TypeSpec {
    fn from(refs: [T; N]) -> Self {
        Self::Union(refs.into_iter().map(Into::into).collect())
    }
}

/// The resolved, non-empty, duplicate-free set of types a field accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedTypes(Vec<TypeTag>);

impl AcceptedTypes {
    /// Resolve every element of a type declaration, failing on the first
    /// unknown name.
    pub fn resolve(spec: &TypeSpec) -> Result<Self, DeclarationError> {
        let refs = match spec {
            TypeSpec::One(r) => std::slice::from_ref(r),
            TypeSpec::Union(refs) => refs.as_slice(),
        };
        if refs.is_empty() {
            return Err(DeclarationError::EmptyTypeUnion);
        }

        let mut tags = Vec::with_capacity(refs.len());
        for r in refs {
            let tag = r.resolve()?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(Self(tags))
    }

    pub fn single(tag: TypeTag) -> Self {
        Self(vec![tag])
    }

    pub fn tags(&self) -> &[TypeTag] {
        &self.0
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_union(&self) -> bool {
        self.0.len() > 1
    }

    /// Whether the value is an instance of any accepted type.
    pub fn admits(&self, value: &Value) -> bool {
        self.0.iter().any(|tag| tag.admits(value))
    }
}

impl fmt::Display for AcceptedTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(TypeTag::as_str).collect();
        write!(f, "{}", names.join(" or "))
    }
}
