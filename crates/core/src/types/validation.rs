//! Record validation against a field registry.
//!
//! Fields are processed in registry order. A present value is type-checked
//! and then passed through its converter; an absent one is resolved through
//! the field's default policy. Keys the registry does not declare pass
//! through untouched.
//!
//! [`validate`] owns the mapping it normalizes and only hands it back once
//! every field succeeded, so a failed construction never leaves a
//! half-normalized record behind.

use tracing::{error, trace};

use super::errors::{RecordError, ValidationError, ValidationReport};
use super::field::{DefaultPolicy, FieldSpec};
use super::registry::FieldRegistry;
use crate::value::{Mapping, Value};

/// Outcome for one field.
enum Slot {
    /// Leave the mapping as it is (kept value, or optional and absent).
    Untouched,
    /// Write this value under the field name.
    Write(Value),
}

fn resolve_field(name: &str, spec: &FieldSpec, present: Option<&Value>) -> Result<Slot, RecordError> {
    match present {
        Some(value) => {
            if !spec.admits(value) {
                return Err(ValidationError::TypeMismatch {
                    field: name.to_string(),
                    value: value.clone(),
                    expected: spec.accepted_types().clone(),
                }
                .into());
            }
            match spec.converter() {
                Some(converter) => {
                    trace!(field = name, converter = converter.name(), "converting value");
                    converter.apply(value.clone()).map(Slot::Write).map_err(|message| {
                        RecordError::from(ValidationError::ConversionFailed {
                            field: name.to_string(),
                            value: value.clone(),
                            message,
                        })
                    })
                }
                None => Ok(Slot::Untouched),
            }
        }
        None => match spec.default_policy() {
            DefaultPolicy::Optional => Ok(Slot::Untouched),
            DefaultPolicy::Fixed(value) => Ok(Slot::Write(value.clone())),
            DefaultPolicy::Factory(factory) => {
                let produced = factory.produce();
                if !spec.admits(&produced) {
                    error!(
                        field = name,
                        factory = factory.name(),
                        "default factory produced {produced}, expected {}",
                        spec.accepted_types()
                    );
                    return Err(RecordError::FactoryContract {
                        field: name.to_string(),
                        produced,
                        expected: spec.accepted_types().clone(),
                    });
                }
                Ok(Slot::Write(produced))
            }
            DefaultPolicy::NoDefault => {
                Err(RecordError::from(ValidationError::missing(name, spec.accepted_types())))
            }
        },
    }
}

/// Validate and normalize a mapping, stopping at the first failing field.
pub fn validate(registry: &FieldRegistry, mut values: Mapping) -> Result<Mapping, RecordError> {
    for (name, spec) in registry.iter() {
        trace!(field = name, present = values.contains_key(name), "validating field");
        if let Slot::Write(value) = resolve_field(name, spec, values.get(name))? {
            values.insert(name.to_string(), value);
        }
    }
    Ok(values)
}

/// Check every field of a mapping and collect all errors, in registry order.
///
/// Converters and factories run exactly as they would during construction,
/// but their results are discarded.
pub fn check(registry: &FieldRegistry, values: &Mapping) -> ValidationReport {
    let mut report = ValidationReport::success();
    for (name, spec) in registry.iter() {
        if let Err(e) = resolve_field(name, spec, values.get(name)) {
            report.add_error(e);
        }
    }
    report
}

/// Merge mapping sources; later sources override earlier keys in place.
pub fn merge_sources<I>(sources: I) -> Mapping
where
    I: IntoIterator<Item = Mapping>,
{
    let mut merged = Mapping::new();
    for source in sources {
        merged.extend(source);
    }
    merged
}
