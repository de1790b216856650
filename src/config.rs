//! Generator configuration.
//!
//! Handles loading, validating and merging `mathop-gen.toml`. Every key is
//! optional; user values are merged over stock defaults, which reproduce the
//! five bundled GEGL math operations.
//!
//! ## Configuration Options
//!
//! ```toml
//! output_dir = "."                      # Where generated files are written
//! extension = "c"                       # Output file extension, without the dot
//! template = "templates/my-op.c.in"     # Custom template (omit for the bundled one)
//!
//! [[operations]]
//! name = "add"
//! formula = "result = input + value"
//! default_value = 0.0
//! ```
//!
//! Relative paths are resolved against the working directory.
//!
//! ## Partial Configuration
//!
//! Scalars override individually. `operations` is an array, so a user list
//! replaces the stock list as a whole:
//!
//! ```toml
//! output_dir = "operations/generated"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::operation::{OperationSpec, builtin_operations};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "mathop-gen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `mathop-gen.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directory generated files are written to.
    pub output_dir: PathBuf,
    /// Output file extension, without the leading dot.
    pub extension: String,
    /// Custom template path. `None` selects the bundled template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    /// Operations to generate, in order.
    pub operations: Vec<OperationSpec>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            extension: "c".to_string(),
            template: None,
            operations: builtin_operations(),
        }
    }
}

impl GeneratorConfig {
    /// Validate values that would produce unusable output paths.
    ///
    /// Operation names, formulas and defaults are deliberately left alone:
    /// they are target-language text and only the target compiler judges them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extension.is_empty() {
            return Err(ConfigError::Validation(
                "extension must not be empty".into(),
            ));
        }
        if self.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "extension must not start with '.'".into(),
            ));
        }
        if self.extension.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "extension must not contain path separators".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GeneratorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GeneratorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GeneratorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, merged over stock defaults.
///
/// A missing file yields the defaults unless `required` is set, in which
/// case it is an IO error.
pub fn load_config(path: &Path, required: bool) -> Result<GeneratorConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_none() && required {
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        )));
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `mathop-gen.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# mathop-gen Configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory generated files are written to (relative to the working directory).
output_dir = "."

# Output file extension, without the leading dot.
extension = "c"

# Custom template. Omit to use the bundled GEGL point-composer template.
# Placeholders: @name@ @title@ @filename@ @formula@ @default@ ("@@" for a literal "@").
# template = "templates/point_composer.c.in"

# ---------------------------------------------------------------------------
# Operations
# ---------------------------------------------------------------------------
# One file is generated per entry, in order, named <name>.<extension>.
# `formula` is inserted verbatim and must assign `result` from `input` and `value`.
# Listing any operation here replaces the whole stock list.

[[operations]]
name = "add"
formula = "result = input + value"
default_value = 0.0

[[operations]]
name = "subtract"
formula = "result = input - value"
default_value = 0.0

[[operations]]
name = "multiply"
formula = "result = input * value"
default_value = 1.0

[[operations]]
name = "divide"
formula = "result = value==0.0f?0.0f:input/value"
default_value = 1.0

[[operations]]
name = "gamma"
formula = "result = powf (input, value)"
default_value = 1.0
"##
}
