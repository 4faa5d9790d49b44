//! Error types for the agent CLI.

use thiserror::Error;

/// Configuration errors. Missing required settings are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {key} ({hint})")]
    MissingRequired { key: String, hint: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the hosted model API.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to the model API failed: {reason}")]
    RequestFailed { reason: String },

    #[error("authentication with the model API failed (check OPENAI_API_KEY)")]
    AuthFailed,

    #[error("model API rate limit hit")]
    RateLimited,

    #[error("invalid response from the model API: {reason}")]
    InvalidResponse { reason: String },
}

/// Errors surfaced by the chat loops and the SQL agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("history store error: {0}")]
    History(#[from] surrealdb::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
