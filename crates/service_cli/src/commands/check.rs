//! Check command implementation
//!
//! Prints the solver settings a calibration would run with.

use tracing::info;

use crate::config::CliConfig;
use crate::Result;

/// Run the check command
pub fn run(config_path: &str, config: &CliConfig) -> Result<()> {
    info!("Checking configuration...");

    let source = if std::path::Path::new(config_path).exists() {
        config_path
    } else {
        "defaults (file not found)"
    };

    println!("neutryx-hw {}", env!("CARGO_PKG_VERSION"));
    println!("Settings file: {}", source);
    println!();
    println!("{}", config);

    info!("Configuration OK");
    Ok(())
}
