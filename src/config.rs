//! Configuration for the evaluator.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{EvaluatorError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name (e.g., "gpt-4o-mini")
    pub model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on a single evaluator call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.0
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Whether enough is set to call the external evaluator.
    ///
    /// Without it, every submission is scored by the rule-based heuristic.
    pub fn is_configured(&self) -> bool {
        !self.api_base.is_empty() && !self.api_key.is_empty() && !self.model.is_empty()
    }
}

/// Worker pool and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Number of concurrent evaluation workers.
    pub workers: usize,
    /// Capacity of the pending-evaluation queue.
    pub queue_capacity: usize,
    /// Store file (`.json`, `.bin` or `.bincode`).
    pub store_path: PathBuf,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 64,
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "assignment-evaluator")
        .map(|dirs| dirs.data_dir().join("store.json"))
        .unwrap_or_else(|| PathBuf::from("data/store.json"))
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,
    /// Evaluation pipeline settings
    pub evaluation: EvaluationConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    evaluation: Option<EvaluationFileSection>,
    logging: Option<LoggingFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EvaluationFileSection {
    workers: Option<usize>,
    queue_capacity: Option<usize>,
    store_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct LoggingFileSection {
    level: Option<String>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_*, EVALUATOR_*)
    /// 2. Config file (~/.config/assignment-evaluator/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_overrides(|key| env::var(key).ok());

        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in `load`).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("LLM_API_BASE") {
            self.llm.api_base = api_base;
        }
        if let Some(api_key) = lookup("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(tokens) = lookup("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.llm.max_tokens = tokens;
        }
        if let Some(temp) = lookup("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.llm.temperature = temp;
        }
        if let Some(secs) = lookup("LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.llm.timeout_secs = secs;
        }
        if let Some(workers) = lookup("EVALUATOR_WORKERS").and_then(|v| v.parse().ok()) {
            self.evaluation.workers = workers;
        }
        if let Some(capacity) = lookup("EVALUATOR_QUEUE_CAPACITY").and_then(|v| v.parse().ok()) {
            self.evaluation.queue_capacity = capacity;
        }
        if let Some(path) = lookup("EVALUATOR_STORE") {
            self.evaluation.store_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("EVALUATOR_LOG") {
            self.logging.level = level;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EvaluatorError::io(path, e))?;
        Self::from_yaml(&content)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| EvaluatorError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                config.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(evaluation) = file_config.evaluation {
            if let Some(workers) = evaluation.workers {
                config.evaluation.workers = workers;
            }
            if let Some(queue_capacity) = evaluation.queue_capacity {
                config.evaluation.queue_capacity = queue_capacity;
            }
            if let Some(store_path) = evaluation.store_path {
                config.evaluation.store_path = store_path;
            }
        }

        if let Some(level) = file_config.logging.and_then(|l| l.level) {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "assignment-evaluator")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate the configuration.
    ///
    /// Missing LLM credentials are allowed: the pipeline then runs on the
    /// rule-based heuristic alone.
    pub fn validate(&self) -> Result<()> {
        if self.evaluation.workers == 0 {
            return Err(EvaluatorError::Config(
                "At least one evaluation worker is required. Set EVALUATOR_WORKERS or evaluation.workers.".to_string(),
            ));
        }

        if self.evaluation.queue_capacity == 0 {
            return Err(EvaluatorError::Config(
                "Evaluation queue capacity must be positive.".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(EvaluatorError::Config(
                "LLM timeout must be at least one second.".to_string(),
            ));
        }

        if !self.llm.api_base.is_empty()
            && !(self.llm.api_base.starts_with("http://") || self.llm.api_base.starts_with("https://"))
        {
            return Err(EvaluatorError::Config(format!(
                "LLM API base must be an http(s) URL, got '{}'",
                self.llm.api_base
            )));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
