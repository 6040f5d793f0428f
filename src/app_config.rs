use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles loading, validating and saving the JSON configuration
/// file. Every field has a default so a partial file is still valid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Database file; `None` uses the per-user data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Directory under which lesson folders are allocated
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// HTTP relay settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Speech synthesis parameters
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP relay settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Parameters passed to the speech synthesizer on every cache miss.
///
/// `pitch`, `rate` and `volume` are signed percentage offsets.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SynthesisConfig {
    #[serde(default)]
    pub pitch: i32,
    #[serde(default)]
    pub rate: i32,
    #[serde(default)]
    pub volume: i32,
    /// Where the synthesizer may write files
    #[serde(default = "default_storage_root")]
    pub output_root: PathBuf,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            pitch: 0,
            rate: 0,
            volume: 0,
            output_root: default_storage_root(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
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
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_storage_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("linguadeck").join("lessons"))
        .unwrap_or_else(|| PathBuf::from("lessons"))
}

impl Config {
    /// Load the configuration file, writing a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let config_json =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(anyhow!("HTTP timeout must be at least one second"));
        }

        for (name, value) in [
            ("pitch", self.synthesis.pitch),
            ("rate", self.synthesis.rate),
            ("volume", self.synthesis.volume),
        ] {
            if !(-100..=100).contains(&value) {
                return Err(anyhow!("Synthesis {} must be between -100 and 100, got {}", name, value));
            }
        }

        if self.storage_root.as_os_str().is_empty() {
            return Err(anyhow!("Storage root must not be empty"));
        }

        if let Some(db) = &self.database_path {
            if db.as_os_str().is_empty() {
                return Err(anyhow!("Database path must not be empty when set"));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: None,
            storage_root: default_storage_root(),
            http: HttpConfig::default(),
            synthesis: SynthesisConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
