//! Application configuration for docforge.
//!
//! User config lives at `<config dir>/docforge/docforge.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored here: the config only names the environment
//! variables that hold them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docforge.toml";

/// Directory name used under the platform config/data directories.
const APP_DIR_NAME: &str = "docforge";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub deployment: DeploymentConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory under which every template gets its own directory.
    #[serde(default = "default_templates_root")]
    pub templates_root: PathBuf,

    /// SQLite database holding template, server and chat-session records.
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_root: default_templates_root(),
            database: default_database(),
        }
    }
}

fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
}
fn default_templates_root() -> PathBuf {
    app_data_dir().join("templates").join("generated")
}
fn default_database() -> PathBuf {
    app_data_dir().join("docforge.db")
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Reader proxy that turns any documentation page into markdown.
    #[serde(default = "default_reader_base_url")]
    pub reader_base_url: String,

    /// Name of the env var holding the reader API key (optional at runtime).
    #[serde(default = "default_reader_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Number of documentation sources fetched at once. Output order never changes.
    #[serde(default = "default_fetch_concurrency")]
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            reader_base_url: default_reader_base_url(),
            api_key_env: default_reader_api_key_env(),
            timeout_secs: default_fetch_timeout(),
            concurrency: default_fetch_concurrency(),
        }
    }
}

fn default_reader_base_url() -> String {
    "https://r.jina.ai".into()
}
fn default_reader_api_key_env() -> String {
    "JINA_API_KEY".into()
}
fn default_fetch_timeout() -> u64 {
    60
}
fn default_fetch_concurrency() -> usize {
    1
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Name of the env var holding the LLM API key.
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_planning_model")]
    pub planning_model: String,

    #[serde(default = "default_coding_model")]
    pub coding_model: String,

    #[serde(default = "default_planning_temperature")]
    pub planning_temperature: f32,

    #[serde(default = "default_coding_temperature")]
    pub coding_temperature: f32,

    /// Documentation characters handed to the planning prompt.
    #[serde(default = "default_documentation_char_limit")]
    pub documentation_char_limit: usize,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key_env: default_llm_api_key_env(),
            planning_model: default_planning_model(),
            coding_model: default_coding_model(),
            planning_temperature: default_planning_temperature(),
            coding_temperature: default_coding_temperature(),
            documentation_char_limit: default_documentation_char_limit(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_llm_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_planning_model() -> String {
    "deepseek/deepseek-r1-zero:free".into()
}
fn default_coding_model() -> String {
    "qwen/qwen2.5-72b-instruct:free".into()
}
fn default_planning_temperature() -> f32 {
    0.1
}
fn default_coding_temperature() -> f32 {
    0.2
}
fn default_documentation_char_limit() -> usize {
    7000
}
fn default_llm_timeout() -> u64 {
    300
}

/// `[persistence]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Ceiling for the whole template save step.
    #[serde(default = "default_save_timeout")]
    pub save_timeout_secs: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_timeout_secs: default_save_timeout(),
        }
    }
}

impl PersistenceConfig {
    pub fn save_timeout(&self) -> Duration {
        Duration::from_secs(self.save_timeout_secs)
    }
}

fn default_save_timeout() -> u64 {
    15
}

/// `[deployment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Prefix of the placeholder URL handed back by `deploy`.
    #[serde(default = "default_deployment_base_url")]
    pub base_url: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            base_url: default_deployment_base_url(),
        }
    }
}

fn default_deployment_base_url() -> String {
    "https://example.com/mcp".into()
}

impl Config {
    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is tried
    /// and a missing file yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default),
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.persistence.save_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "persistence.save_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.fetch.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "fetch.concurrency must be at least 1".to_string(),
            ));
        }
        if url::Url::parse(&self.llm.base_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "llm.base_url is not a valid URL: {}",
                self.llm.base_url
            )));
        }
        Ok(())
    }
}

/// Read a secret from the named environment variable, treating blank values as unset.
pub fn env_secret(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
