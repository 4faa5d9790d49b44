//! Mesa Agent - command-line chat agents over a hosted model
//!
//! Four incremental capabilities behind one CLI:
//!
//! - `chat` - bare read-eval-print chat
//! - `chat --assistant` - system prompt rendered from a template
//! - `chat --session <id>` - history persisted in embedded SurrealDB
//! - `sql` - ReAct-style natural-language-to-SQL agent with
//!   schema-introspection tools over PostgreSQL

pub mod agent;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod repl;
pub mod tools;

// Re-exports
pub use config::Config;
pub use error::{AgentError, ConfigError, LlmError};
pub use llm::{ChatClient, ChatMessage, Role};
