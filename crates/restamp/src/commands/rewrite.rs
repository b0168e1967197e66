//! `restamp rewrite` command implementation.

use std::path::PathBuf;

use clap::Args;
use restamp_assets::Compilation;
use restamp_config::{CliSettings, Config};

use crate::error::CliError;
use crate::host::{OutputDir, changed_assets, run_hooks};
use crate::output::Output;

/// Arguments for the rewrite command.
#[derive(Args)]
pub(crate) struct RewriteArgs {
    /// Path to configuration file (default: auto-discover restamp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build output directory (overrides config).
    #[arg(short, long, env = "RESTAMP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Report what would change without writing files.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output (log every replacement).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RewriteArgs {
    /// Execute the rewrite command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or I/O fails, or if any hook
    /// recorded a compilation error.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if config.targets.is_empty() {
            output.warning("No targets configured, nothing to rewrite");
            return Ok(());
        }

        let rewriter = config.rewriter()?;
        let dir = OutputDir::new(config.output_resolved.dir.clone());
        output.info(&format!("Output directory: {}", dir.root().display()));

        let before = dir.load()?;
        let mut compilation = Compilation::with_assets(before.clone());
        run_hooks(&[&rewriter], &mut compilation);

        let changed = changed_assets(&before, &compilation.assets);
        for name in &changed {
            output.rewritten(name, self.dry_run);
        }
        if changed.is_empty() {
            output.info("No assets changed");
        }

        if !self.dry_run {
            dir.write(&compilation.assets, &changed)?;
            dir.save_manifest(&compilation.assets)?;
        }

        if compilation.has_errors() {
            for error in &compilation.errors {
                output.compilation_error(error);
            }
            return Err(CliError::Build(compilation.errors.len()));
        }

        Ok(())
    }
}
