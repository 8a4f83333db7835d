//! Application configuration for the taxonomy importer.
//!
//! User config lives at `~/.taxonomy/taxonomy.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxonomyError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "taxonomy.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".taxonomy";

// ---------------------------------------------------------------------------
// Config structs (matching taxonomy.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Import defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Typo correction table settings.
    #[serde(default)]
    pub typos: TyposConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory scanned for `*.csv` inputs.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Directory the artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Fail the run (exit code 1) when any data quality issue exists.
    #[serde(default)]
    pub strict: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            strict: false,
        }
    }
}

fn default_input_dir() -> String {
    "meta/input".into()
}
fn default_output_dir() -> String {
    "meta/output".into()
}

/// `[typos]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TyposConfig {
    /// Whether the built-in correction table is active.
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Additional `typo = "Correction"` entries. Keys match case-insensitively
    /// and override built-in entries.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Default for TyposConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            extra: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.taxonomy/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TaxonomyError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.taxonomy/taxonomy.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TaxonomyError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        TaxonomyError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TaxonomyError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TaxonomyError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TaxonomyError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("builtin = true"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.input_dir, "meta/input");
        assert!(!parsed.defaults.strict);
        assert!(parsed.typos.builtin);
    }

    #[test]
    fn config_with_extra_typos() {
        let toml_str = r#"
[defaults]
strict = true

[typos]
builtin = false

[typos.extra]
"kubernets" = "Kubernetes"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.defaults.strict);
        assert_eq!(config.defaults.output_dir, "meta/output");
        assert!(!config.typos.builtin);
        assert_eq!(config.typos.extra.get("kubernets").map(String::as_str), Some("Kubernetes"));
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = std::env::temp_dir().join(format!("tx-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("taxonomy.toml");
        std::fs::write(&path, "[defaults\nstrict = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to parse"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
