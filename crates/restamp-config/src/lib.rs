//! Configuration management for restamp.
//!
//! Parses `restamp.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [output]
//! dir = "dist"
//!
//! [[targets]]
//! asset = "index.html"            # or asset = { pattern = "\\.html$" }
//! basename = false
//!
//! [[targets.replacers]]
//! asset = "main.*\\.js"           # matched against asset names
//! find = "\\{\\{JS_BUNDLE\\}\\}"  # matched against target content
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `output.dir` supports `${VAR}` and `${VAR:-default}`.

mod expand;

use std::path::{Path, PathBuf};

use regex::Regex;
use restamp_rewriter::{NameMatcher, Rewriter, Rule, TargetSpec};
use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "restamp.toml";

/// Default output directory, relative to the config file.
const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Rewrite targets in application order.
    pub targets: Vec<TargetConfig>,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct OutputConfigRaw {
    dir: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Directory holding the finished build output.
    pub dir: PathBuf,
}

/// One `[[targets]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Which asset(s) to rewrite.
    pub asset: AssetSelector,
    /// Substitute only the final path segment of resolved names.
    #[serde(default)]
    pub basename: bool,
    /// Substitutions, applied in order.
    #[serde(default)]
    pub replacers: Vec<ReplacerConfig>,
}

/// Target selector: a literal asset name or `{ pattern = "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AssetSelector {
    /// Exact asset name.
    Name(String),
    /// Regular expression searched in asset names.
    Pattern {
        /// Regex source.
        pattern: String,
    },
}

/// One `[[targets.replacers]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplacerConfig {
    /// Regex matched against asset names to find the related asset.
    pub asset: String,
    /// Regex matched against target content; matches are replaced.
    pub find: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.dir`").
        field: String,
        /// Error message (e.g., "${`OUT_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Compile a regex field, naming the field on failure.
fn compile(pattern: &str, field: &str) -> Result<Regex, ConfigError> {
    require_non_empty(pattern, field)?;
    Regex::new(pattern)
        .map_err(|e| ConfigError::Validation(format!("{field} is not a valid regex: {e}")))
}

impl TargetConfig {
    /// Compile into a [`TargetSpec`]. `index` is used in error messages.
    fn to_spec(&self, index: usize) -> Result<TargetSpec, ConfigError> {
        let field = format!("targets[{index}]");
        let matcher = match &self.asset {
            AssetSelector::Name(name) => {
                require_non_empty(name, &format!("{field}.asset"))?;
                NameMatcher::Exact(name.clone())
            }
            AssetSelector::Pattern { pattern } => {
                NameMatcher::Pattern(compile(pattern, &format!("{field}.asset.pattern"))?)
            }
        };

        if self.replacers.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{field}.replacers cannot be empty"
            )));
        }

        let mut spec = TargetSpec::new(matcher).basename_only(self.basename);
        for (i, replacer) in self.replacers.iter().enumerate() {
            let prefix = format!("{field}.replacers[{i}]");
            let source = compile(&replacer.asset, &format!("{prefix}.asset"))?;
            let placeholder = compile(&replacer.find, &format!("{prefix}.find"))?;
            // An empty match would splice the name between every character.
            if placeholder.is_match("") {
                return Err(ConfigError::Validation(format!(
                    "{prefix}.find must not match an empty string"
                )));
            }
            spec = spec.rule(Rule::new(source, placeholder));
        }
        Ok(spec)
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `restamp.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            output: OutputConfigRaw::default(),
            targets: Vec::new(),
            output_resolved: OutputConfig {
                dir: base.join(DEFAULT_OUTPUT_DIR),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Compiles every pattern, so a config that validates always converts
    /// with [`Config::target_specs`]. Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target_specs().map(|_| ())
    }

    /// Compile targets into rewriter specs, in file order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first offending field.
    pub fn target_specs(&self) -> Result<Vec<TargetSpec>, ConfigError> {
        self.targets
            .iter()
            .enumerate()
            .map(|(index, target)| target.to_spec(index))
            .collect()
    }

    /// Build a [`Rewriter`] over the configured targets.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any target fails to compile.
    pub fn rewriter(&self) -> Result<Rewriter, ConfigError> {
        Ok(Rewriter::new(self.target_specs()?))
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.output.dir {
            self.output.dir = Some(expand::expand_env(dir, "output.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_resolved = OutputConfig {
            dir: config_dir.join(self.output.dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)),
        };
    }
}
