//! Configuration for the agent CLI.
//!
//! Everything comes from environment variables (a `.env` file is loaded at
//! startup). A missing `OPENAI_API_KEY` is fatal at startup.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default session id for persisted history.
pub const DEFAULT_SESSION_ID: &str = "session_123";

/// Main configuration for the agent.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub history: HistoryConfig,
    /// PostgreSQL connection string, required by the `sql` subcommand.
    pub database_url: Option<String>,
}

/// Hosted model configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
}

/// Persisted chat history configuration.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Directory of the embedded history database.
    pub dir: PathBuf,
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            llm: LlmConfig::from_env()?,
            history: HistoryConfig::from_env(),
            database_url: optional_env("DATABASE_URL"),
        })
    }

    /// The database URL, required by the `sql` subcommand.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "DATABASE_URL".to_string(),
                hint: "set it to the PostgreSQL connection string the SQL agent should query"
                    .to_string(),
            })
    }
}

impl LlmConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = optional_env("OPENAI_API_KEY").ok_or_else(|| ConfigError::MissingRequired {
            key: "OPENAI_API_KEY".to_string(),
            hint: "set it in the environment or a .env file".to_string(),
        })?;

        let temperature = match optional_env("CHAT_TEMPERATURE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CHAT_TEMPERATURE".to_string(),
                message: format!("'{raw}' is not a number"),
            })?,
            None => 0.7,
        };

        Ok(Self {
            api_key,
            model: optional_env("CHAT_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            temperature,
            base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
        })
    }
}

impl HistoryConfig {
    fn from_env() -> Self {
        let dir = optional_env("HISTORY_DIR").unwrap_or_else(|| ".mesa-agent/history".to_string());
        Self {
            dir: PathBuf::from(dir),
        }
    }
}
