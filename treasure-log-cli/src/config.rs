//! Configuration loading and parsing
//!
//! Every key is optional; a missing table or key keeps the default, so a
//! config file only needs to name what differs from the current task build.
//!
//! ```toml
//! [vocabulary]
//! block_completed = "BLOCK_DONE"
//!
//! [output]
//! missing_token = "None"
//! include_start_side = false
//!
//! [timing]
//! enabled = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use treasure_log_parser::{LogVocabulary, OutputSchema, ParserConfig};

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub vocabulary: LogVocabulary,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Name of the record table written next to the input log
    pub file_name: String,
    #[serde(flatten)]
    pub schema: OutputSchema,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "treasure.par".to_string(),
            schema: OutputSchema::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub enabled: bool,
    pub file_name: String,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file_name: "treasure_timing.par".to_string(),
        }
    }
}

impl AppConfig {
    /// Library configuration for the correlator and emitter
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            vocabulary: self.vocabulary.clone(),
            output: self.output.schema.clone(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .parser_config()
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}
