use recordkit_core::TypeCatalog;
use recordkit_core::config::loader::default_config_path;
use recordkit_core::types::TypeRepository;
use std::path::Path;

use super::load_config;

pub fn run(config: Option<&Path>, profile: Option<&str>, types_dir: Option<&Path>) {
    let rc = match load_config(config, profile, types_dir) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL rk doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    };

    let catalog = TypeRepository::new(&rc.types_dir).and_then(|repo| TypeCatalog::load(&repo));
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(e) => {
            println!("FAIL rk doctor");
            println!("{e}");
            std::process::exit(1);
        }
    };

    println!("OK   rk doctor");
    println!(
        "path: {}",
        config.map_or_else(
            || default_config_path().display().to_string(),
            |p| p.display().to_string()
        )
    );
    println!("profile: {}", rc.active_profile);
    println!("types_dir: {}", rc.types_dir.display());
    println!("record types: {}", catalog.len());
    println!("logging.level: {}", rc.logging.level);
    if let Some(file) = &rc.logging.file {
        println!("logging.file: {}", file.display());
    }
}
