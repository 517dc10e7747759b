//! CLI configuration file handling.
//!
//! `railboard.toml` carries the connection settings and the pipeline knobs.
//! Every field is optional; command-line flags and environment variables
//! take precedence over the file.

use anyhow::{Context, Result};
use railboard_core::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Connection settings for the test-management server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-call timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Full CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl CliConfig {
    /// Load configuration from an explicit path, or from `railboard.toml`
    /// in the working directory when present. No file means defaults.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path),
            None => {
                let default = PathBuf::from("railboard.toml");
                default.exists().then_some(default)
            }
        };
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_means_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert!(config.connection.url.is_none());
        assert_eq!(config.pipeline.page_size, 250);
    }

    #[test]
    fn partial_file_overrides_only_named_knobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("railboard.toml");
        fs::write(
            &path,
            "[connection]\nurl = \"https://qa.example.com\"\n\n[pipeline]\npage_size = 50\njpeg_quality = 70\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(path)).unwrap();
        assert_eq!(config.connection.url.as_deref(), Some("https://qa.example.com"));
        assert_eq!(config.pipeline.page_size, 50);
        assert_eq!(config.pipeline.jpeg_quality, 70);
        // Unnamed knobs keep their defaults.
        assert_eq!(config.pipeline.jpeg_quality_floor, 40);
    }

    #[test]
    fn malformed_file_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("railboard.toml");
        fs::write(&path, "pipeline = 3").unwrap();
        assert!(CliConfig::load(Some(path)).is_err());
    }
}
