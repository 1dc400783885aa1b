use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::application::config::EngineConfig;

/// Log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

const CONFIG_FILE_NAME: &str = "engine_config.json";

/// Loads and persists the engine configuration as JSON
pub struct ConfigService {
    config_path: PathBuf,
    config: EngineConfig,
}

impl ConfigService {
    /// `<platform config dir>/streakboard/engine_config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("streakboard").join(CONFIG_FILE_NAME))
    }

    /// Read the config at `path`; a missing file yields the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = path.into();

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            serde_json::from_str::<EngineConfig>(&content)
                .with_context(|| format!("Malformed config at {}", config_path.display()))?
        } else {
            EngineConfig::default()
        };

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config at {}: {}", config_path.display(), e))?;

        info!(
            "[config] loaded path={} log_level={}",
            config_path.display(),
            config.log_level.as_str()
        );

        Ok(Self {
            config_path,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Persist the current config, creating parent directories
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&self.config_path, content)?;
        info!("[config] saved path={}", self.config_path.display());
        Ok(())
    }

    /// Set log level and persist to disk
    pub fn set_log_level(&mut self, level: LogLevel) -> Result<()> {
        info!("[config] log level -> {}", level.as_str());
        self.config.log_level = level;
        self.save()
    }
}
