use std::path::Path;

use super::{load_catalog, resolve_config};

pub fn run(config: Option<&Path>, profile: Option<&str>, types_dir: Option<&Path>) {
    let rc = resolve_config("types", config, profile, types_dir);
    let catalog = load_catalog(&rc);

    if catalog.is_empty() {
        println!("(no record types found)");
        return;
    }

    for name in catalog.names() {
        let Ok(record_type) = catalog.get(name) else {
            continue;
        };
        match record_type.description() {
            Some(description) => println!("{name} - {description}"),
            None => println!("{name}"),
        }
    }
    println!("-- {} record types --", catalog.len());
}
