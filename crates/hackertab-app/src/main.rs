//! Native entry point: inspect or reset persisted widget chrome.

#[cfg(feature = "native")]
fn main() {
    use hackertab_app::inspect::{self, Command, InspectError};
    use hackertab_core::storage::FileStore;
    use hackertab_core::{ChromeConfig, ChromeStore};
    use std::sync::Arc;

    env_logger::init();

    let result = (|| -> Result<String, InspectError> {
        let command = Command::parse(std::env::args().skip(1))?;

        let config = match std::env::var("HACKERTAB_CONFIG") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| InspectError::Config(format!("{}: {}", path, e)))?;
                ChromeConfig::from_json(&json)
                    .map_err(|e| InspectError::Config(format!("{}: {}", path, e)))?
            }
            Err(_) => ChromeConfig::default(),
        };

        let files = FileStore::default_location()?;
        log::debug!("Using state directory {}", files.base_path().display());
        let store = ChromeStore::with_prefix(Arc::new(files), config.key_prefix);

        pollster::block_on(inspect::run(&command, &store))
    })();

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("hackertab: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
