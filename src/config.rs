//! Pipeline configuration, loadable from TOML and overridable from the CLI.

use crate::stats::{DEFAULT_TOP_BIRTH_YEARS, DEFAULT_TOP_DEATH_MONTHS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Output chart settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Write the histogram, animation and summary artifacts
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
    pub frame_delay_ms: u32,
    pub max_frames: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1000,
            height: 600,
            frame_delay_ms: 80,
            max_frames: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Down-sample the reduced table to this many rows before aggregation
    pub sample_size: Option<usize>,
    /// Fixed seed for reproducible samples
    pub seed: Option<u64>,
    pub oldest_rows: usize,
    pub top_birth_years: usize,
    pub top_death_months: usize,
    pub charts: ChartConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("censoc_dmf_v1.csv"),
            output_dir: PathBuf::from("output"),
            sample_size: None,
            seed: None,
            oldest_rows: 5,
            top_birth_years: DEFAULT_TOP_BIRTH_YEARS,
            top_death_months: DEFAULT_TOP_DEATH_MONTHS,
            charts: ChartConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_size == Some(0) {
            return Err(ConfigError::Invalid("sample_size must be positive".into()));
        }
        for (name, value) in [
            ("oldest_rows", self.oldest_rows),
            ("top_birth_years", self.top_birth_years),
            ("top_death_months", self.top_death_months),
            ("charts.max_frames", self.charts.max_frames),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(ConfigError::Invalid("chart dimensions must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_birth_years, 2);
        assert_eq!(config.top_death_months, 4);
        assert_eq!(config.sample_size, None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
input = "data/censoc.csv"
sample_size = 10000
seed = 42

[charts]
enabled = false
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = PipelineConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.input, PathBuf::from("data/censoc.csv"));
        assert_eq!(config.sample_size, Some(10_000));
        assert_eq!(config.seed, Some(42));
        assert!(!config.charts.enabled);
        assert_eq!(config.charts.width, ChartConfig::default().width);
        assert_eq!(config.oldest_rows, 5);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "sample_size = \"many\"").unwrap();
        file.flush().unwrap();

        let err = PipelineConfig::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_counts_are_rejected() {
        let config = PipelineConfig {
            top_death_months: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = PipelineConfig {
            sample_size: Some(0),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
