//! `restamp check` command implementation.

use std::path::PathBuf;

use clap::Args;
use restamp_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover restamp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        match &config.config_path {
            Some(path) => output.info(&format!("Config: {}", path.display())),
            None => output.warning("No restamp.toml found, using defaults"),
        }

        for spec in config.target_specs()? {
            output.target(&spec);
        }
        output.success(&format!("{} target(s) OK", config.targets.len()));
        Ok(())
    }
}
