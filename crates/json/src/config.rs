//! Codec configuration via TOML
//!
//! Declares per-field directives for records whose derive cannot carry them,
//! plus output options.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Codec configuration.
///
/// # Example
///
/// ```toml
/// # Indent the output (default: false)
/// pretty = false
///
/// # Write map entries in key order (default: true)
/// sort_map_keys = true
///
/// # Escape <, > and & inside strings (default: true)
/// escape_html = true
///
/// # Directives keyed by record, then field.
/// # Struct variants are keyed "Enum::Variant".
/// [directives.Profile]
/// nickname = 'json:",omitempty" db:"nick"'
///
/// [directives."Event::Update"]
/// count = 'json:",omitempty"'
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Indent the encoded output
    #[serde(default)]
    pub pretty: bool,
    /// Write the entries of sized maps ordered by their JSON key
    #[serde(default = "default_true")]
    pub sort_map_keys: bool,
    /// Write `<`, `>`, `&`, U+2028 and U+2029 in strings as `\u` escapes
    #[serde(default = "default_true")]
    pub escape_html: bool,
    /// Declared directives: record name to field name to directive text
    #[serde(default)]
    pub directives: BTreeMap<String, BTreeMap<String, String>>,
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            sort_map_keys: default_true(),
            escape_html: default_true(),
            directives: BTreeMap::new(),
        }
    }
}

impl CodecConfig {
    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not valid TOML or does not
    /// match the expected layout. Directive text is checked later, by
    /// [`FieldsCodec::from_config`](crate::FieldsCodec::from_config).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str::<CodecConfig>(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        info!(
            path = %path.display(),
            records = config.directives.len(),
            pretty = config.pretty,
            sort_map_keys = config.sort_map_keys,
            escape_html = config.escape_html,
            "loaded codec config"
        );
        Ok(config)
    }

    /// Serialize this config to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}
