//! Configuration loading, validation, and management for Genie.
//!
//! Loads configuration from `~/.genie/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.genie/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline behaviour
    #[serde(default)]
    pub agent: AgentConfig,

    /// Capability catalog store
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Language-model backend
    #[serde(default)]
    pub llm: LlmConfig,

    /// Compiler used for generated programs
    #[serde(default)]
    pub build: BuildConfig,

    /// Device bridge for remote execution
    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Try the LLM backend before falling back to templates
    #[serde(default = "default_true")]
    pub use_llm: bool,

    /// Push and run the built program on a connected device
    #[serde(default)]
    pub auto_execute: bool,

    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Number of conversation turns kept for context
    #[serde(default = "default_memory_turns")]
    pub memory_turns: usize,
}

fn default_true() -> bool {
    true
}
fn default_workspace_dir() -> PathBuf {
    PathBuf::from("./workspace")
}
fn default_report_dir() -> PathBuf {
    PathBuf::from("./workspace/reports")
}
fn default_memory_turns() -> usize {
    6
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            use_llm: true,
            auto_execute: false,
            workspace_dir: default_workspace_dir(),
            report_dir: default_report_dir(),
            memory_turns: default_memory_turns(),
        }
    }
}

impl AgentConfig {
    /// Replace empty directories with the defaults.
    pub fn normalize(&mut self) {
        if self.workspace_dir.as_os_str().is_empty() {
            self.workspace_dir = default_workspace_dir();
        }
        if self.report_dir.as_os_str().is_empty() {
            self.report_dir = default_report_dir();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

fn default_catalog_path() -> String {
    "./knowledge_base.db".into()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_model")]
    pub embed_model: String,

    /// Client-side timeout for every backend call
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Use the backend for catalog vector search
    #[serde(default = "default_true")]
    pub embeddings: bool,
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_llm_model() -> String {
    "llama3.2:latest".into()
}
fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            embed_model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            embeddings: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Compiler executable (`<compiler> build -o <out> <src>`)
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Import path prefix of the device-automation modules
    #[serde(default = "default_import_root")]
    pub import_root: String,
}

fn default_compiler() -> String {
    "go".into()
}
fn default_import_root() -> String {
    "github.com/xiaocainiao633/Genie1.0--".into()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            import_root: default_import_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// Working directory on the device
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,
}

fn default_adb_path() -> String {
    "adb".into()
}
fn default_remote_dir() -> String {
    "/data/local/tmp".into()
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            remote_dir: default_remote_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.genie/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `GENIE_OLLAMA_URL`
    /// - `GENIE_MODEL`
    /// - `GENIE_EMBED_MODEL`
    /// - `GENIE_ADB`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.agent.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GENIE_OLLAMA_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("GENIE_MODEL") {
            self.llm.model = model;
        }
        if let Some(model) = lookup("GENIE_EMBED_MODEL") {
            self.llm.embed_model = model;
        }
        if let Some(adb) = lookup("GENIE_ADB") {
            self.executor.adb_path = adb;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".genie")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.memory_turns == 0 {
            return Err(ConfigError::ValidationError(
                "agent.memory_turns must be > 0".into(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.timeout_secs must be > 0".into(),
            ));
        }

        if self.build.compiler.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "build.compiler must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
