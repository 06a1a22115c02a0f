//! dfalang configuration

use crate::report::ReportFormat;
use crate::DfalangError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for one interpreter run, usually read from a TOML file and
/// overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DfalangConfig {
    /// Directory reserved for rendered automaton images.
    /// Accepted and checked, but nothing is written there yet.
    pub output_dir: Option<PathBuf>,

    /// Report stream format
    pub format: ReportFormat,

    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DfalangConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            format: ReportFormat::Text,
            log_level: "info".to_string(),
        }
    }
}

impl DfalangConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DfalangError> {
        self.level_filter()?;

        if let Some(dir) = &self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(DfalangError::Config(format!(
                    "output_dir {} is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Parsed `log_level`
    pub fn level_filter(&self) -> Result<log::LevelFilter, DfalangError> {
        self.log_level.parse().map_err(|_| {
            DfalangError::Config(format!("unknown log level: {}", self.log_level))
        })
    }
}
