//! Configuration management for Smart Reviews
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (SMART_REVIEWS_*)
//! 3. Config file (~/.config/smart-reviews/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("smart-reviews")
            .join("reviews.db");

        Self {
            path,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database config with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

/// Completion service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL of the Messages API
    pub base_url: String,

    /// Model used for summaries and keywords
    pub model: String,

    /// Upper bound on generated tokens per call
    pub max_tokens: u32,

    /// Request timeout; `None` waits for the full round trip
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20240620".to_string(),
            max_tokens: 1024,
            timeout: None,
        }
    }
}

/// Trigger periods and rating bounds for the synthesis pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Review count interval at which the AI summary is regenerated
    pub summary_period: u64,

    /// Review count interval at which the keyword set is regenerated
    pub keyword_period: u64,

    /// Lowest rating a human review may carry
    pub min_rating: i32,

    /// Highest rating a human review may carry
    pub max_rating: i32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            summary_period: 3,
            keyword_period: 2,
            min_rating: 1,
            max_rating: 5,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Completion service configuration
    pub completion: CompletionConfig,

    /// Synthesis pipeline configuration
    pub synthesis: SynthesisConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/smart-reviews/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("smart-reviews").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - SMART_REVIEWS_BIND: Server listen address
    /// - SMART_REVIEWS_DATABASE: Path to the SQLite database
    /// - SMART_REVIEWS_MODEL: Completion model
    /// - SMART_REVIEWS_API_URL: Completion API base URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var("SMART_REVIEWS_BIND") {
            self.server.bind = bind;
        }

        if let Ok(path) = std::env::var("SMART_REVIEWS_DATABASE") {
            self.database.path = PathBuf::from(path);
        }

        if let Ok(model) = std::env::var("SMART_REVIEWS_MODEL") {
            self.completion.model = model;
        }

        if let Ok(url) = std::env::var("SMART_REVIEWS_API_URL") {
            self.completion.base_url = url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, database: Option<PathBuf>, model: Option<String>) -> Self {
        if let Some(path) = database {
            self.database.path = path;
        }

        if let Some(m) = model {
            self.completion.model = m;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(database: Option<PathBuf>, model: Option<String>) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()
            .with_cli_overrides(database, model);
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let synthesis = &self.synthesis;

        if synthesis.summary_period == 0 || synthesis.keyword_period == 0 {
            return Err(Error::Config(
                "Trigger periods must be positive".to_string(),
            ));
        }

        // 0 is reserved for synthesized reviews
        if synthesis.min_rating < 1 || synthesis.min_rating > synthesis.max_rating {
            return Err(Error::Config(format!(
                "Invalid rating range {}..={}",
                synthesis.min_rating, synthesis.max_rating
            )));
        }

        url::Url::parse(&self.completion.base_url).map_err(|e| {
            Error::Config(format!(
                "Invalid completion base URL '{}': {}",
                self.completion.base_url, e
            ))
        })?;

        Ok(())
    }
}
