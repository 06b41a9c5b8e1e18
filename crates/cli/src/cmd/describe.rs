//! Describe command: the field registry of one record type.

use std::path::Path;

use recordkit_core::{FieldSpec, RecordType};
use tabled::{Table, Tabled, settings::Style};

use super::{load_catalog, resolve_config};
use crate::DescribeArgs;

/// Row for the field table.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    name: String,
    #[tabled(rename = "Types")]
    types: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Converter")]
    converter: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl FieldRow {
    fn new(name: &str, spec: &FieldSpec) -> Self {
        Self {
            name: name.to_string(),
            types: spec.accepted_types().to_string(),
            default: spec.default_policy().to_string(),
            converter: spec.converter().map_or_else(|| "-".to_string(), |c| c.name().to_string()),
            description: spec.description().unwrap_or("").to_string(),
        }
    }
}

pub fn run(
    config: Option<&Path>,
    profile: Option<&str>,
    types_dir: Option<&Path>,
    args: &DescribeArgs,
) {
    let rc = resolve_config("describe", config, profile, types_dir);
    let catalog = load_catalog(&rc);

    let record_type = match catalog.get(&args.record_type) {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Known record types: {}", catalog.names().join(", "));
            std::process::exit(1);
        }
    };

    print_header(&record_type);

    if record_type.fields().is_empty() {
        println!("(no fields)");
        return;
    }

    let rows: Vec<FieldRow> =
        record_type.fields().iter().map(|(name, spec)| FieldRow::new(name, spec)).collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

fn print_header(record_type: &RecordType) {
    println!("{}", record_type.name());
    if let Some(description) = record_type.description() {
        println!("  {description}");
    }
    if !record_type.bases().is_empty() {
        let bases: Vec<&str> = record_type.bases().iter().map(|b| b.name()).collect();
        println!("  extends: {}", bases.join(", "));
    }
    for (name, value) in record_type.attributes() {
        println!("  {name} = {value}");
    }
}
