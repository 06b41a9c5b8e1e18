//! Record instances.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::definition::RecordType;
use crate::value::{Mapping, Value, write_mapping};

/// A validated record: one ordered key/value store, readable by key or by
/// attribute name.
///
/// Mutation after construction is allowed and is not re-validated.
#[derive(Debug, Clone)]
pub struct Record {
    record_type: Arc<RecordType>,
    values: Mapping,
}

impl Record {
    pub(crate) fn new(record_type: Arc<RecordType>, values: Mapping) -> Self {
        Self { record_type, values }
    }

    /// The type this record was constructed by.
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.values.get_mut(key)
    }

    /// Attribute-style read; same store as [`Record::get`].
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    /// Write a key, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Attribute-style write; same store as [`Record::set`].
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.set(name, value)
    }

    /// Remove a key, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.values
    }

    pub fn into_mapping(self) -> Mapping {
        self.values
    }
}

impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.values[key]
    }
}

impl PartialEq<Mapping> for Record {
    fn eq(&self, other: &Mapping) -> bool {
        &self.values == other
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_mapping(f, &self.values)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Dict(record.values)
    }
}

/// Declare a newtype over [`Record`] with one accessor per named field.
///
/// ```
/// use recordkit_core::{FieldSpec, RecordType, record_struct};
///
/// record_struct! {
///     /// A person.
///     pub struct Person { name, age }
/// }
///
/// let person_type = RecordType::builder("Person")
///     .field("name", FieldSpec::required("str").unwrap())
///     .field("age", FieldSpec::builder("int").default(8).build().unwrap())
///     .build()
///     .unwrap();
///
/// let person = Person::from(person_type.instantiate_pairs([("name", "Ann")]).unwrap());
/// assert_eq!(person.name().and_then(|v| v.as_str()), Some("Ann"));
/// assert_eq!(person.age().and_then(|v| v.as_i64()), Some(8));
/// ```
#[macro_export]
macro_rules! record_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $($field:ident),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name($crate::Record);

        #[allow(dead_code)]
        impl $name {
            $(
                $vis fn $field(&self) -> ::std::option::Option<&$crate::Value> {
                    self.0.get(stringify!($field))
                }
            )*

            $vis fn into_record(self) -> $crate::Record {
                self.0
            }
        }

        impl ::std::convert::From<$crate::Record> for $name {
            fn from(record: $crate::Record) -> Self {
                Self(record)
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::Record;

            fn deref(&self) -> &$crate::Record {
                &self.0
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut $crate::Record {
                &mut self.0
            }
        }
    };
}
