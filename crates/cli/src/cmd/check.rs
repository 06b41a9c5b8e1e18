//! Check command: construct a record from a YAML or JSON mapping.

use std::io::Read;
use std::path::Path;

use recordkit_core::{Mapping, Record, Value};
use tracing::debug;

use super::{load_catalog, resolve_config};
use crate::{CheckArgs, OutputFormat};

pub fn run(
    config: Option<&Path>,
    profile: Option<&str>,
    types_dir: Option<&Path>,
    args: &CheckArgs,
) {
    let rc = resolve_config("check", config, profile, types_dir);
    let catalog = load_catalog(&rc);

    let record_type = match catalog.get(&args.record_type) {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let input = match read_input(&args.input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    debug!(
        record_type = record_type.name(),
        keys = input.len(),
        input = %args.input.display(),
        "checking input"
    );

    if args.all {
        let report = record_type.check(&input);
        if !report.is_valid() {
            println!("FAIL {} ({} errors)", record_type.name(), report.errors().len());
            for error in report.errors() {
                println!("  - {error}");
            }
            std::process::exit(1);
        }
    }

    match record_type.instantiate(input) {
        Ok(record) => print_record(&record, args.output),
        Err(e) => {
            println!("FAIL {}", record_type.name());
            println!("  - {e}");
            std::process::exit(1);
        }
    }
}

/// Read a mapping from a file or stdin. `.json` files are parsed as JSON,
/// everything else as YAML.
fn read_input(path: &Path) -> Result<Mapping, String> {
    let (source, is_json) = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        (buf, false)
    } else {
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        (source, path.extension().and_then(|e| e.to_str()) == Some("json"))
    };

    let value = if is_json {
        serde_json::from_str::<serde_json::Value>(&source)
            .map(Value::from)
            .map_err(|e| format!("invalid JSON input: {e}"))?
    } else {
        serde_yaml::from_str::<serde_yaml::Value>(&source)
            .map(Value::from)
            .map_err(|e| format!("invalid YAML input: {e}"))?
    };

    match value {
        Value::Dict(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        other => Err(format!("input must be a mapping, not '{}'", other.type_name())),
    }
}

fn print_record(record: &Record, format: OutputFormat) {
    let rendered = match format {
        OutputFormat::Text => Ok(record.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(record).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(record).map_err(|e| e.to_string()),
    };

    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            eprintln!("Error rendering record: {e}");
            std::process::exit(1);
        }
    }
}
