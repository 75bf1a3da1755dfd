use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::placeholder::DEFAULT_OUTPUT_DIR;

pub const ENV_DEV: &str = "GUOXUE_DEV";
pub const ENV_PERFORMANCE_MONITORING: &str = "GUOXUE_PERFORMANCE_MONITORING";
pub const ENV_FONT: &str = "GUOXUE_FONT";
pub const ENV_OUTPUT_DIR: &str = "GUOXUE_OUTPUT_DIR";

/// Runtime settings: defaults, then the optional TOML file, then the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Development build; turns on performance logging.
    pub dev: bool,
    /// Opt-in performance logging outside dev builds.
    pub performance_monitoring: bool,
    /// Font used for placeholder text; system fonts are searched otherwise.
    pub font: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dev: false,
            performance_monitoring: false,
            font: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_toml(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Overrides from variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DEV) {
            self.dev = is_truthy(&value);
        }
        if let Some(value) = lookup(ENV_PERFORMANCE_MONITORING) {
            self.performance_monitoring = value == "true";
        }
        if let Some(value) = lookup(ENV_FONT).filter(|v| !v.is_empty()) {
            self.font = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            self.output_dir = PathBuf::from(value);
        }
    }

    pub fn performance_enabled(&self) -> bool {
        self.dev || self.performance_monitoring
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
