//! Mesa Agent - main entry point.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mesa_agent::config::Config;
use mesa_agent::repl;

#[derive(Parser)]
#[command(
    name = "mesa-agent",
    about = "Command-line chat agents for the Mesa reservation suite"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat with the hosted model
    Chat {
        /// Prepend the friendly-assistant system prompt
        #[arg(long)]
        assistant: bool,
        /// Persist chat history under this session id
        #[arg(long)]
        session: Option<String>,
    },
    /// Natural-language-to-SQL agent over the reservation database
    Sql {
        /// One-shot question; omit for an interactive loop
        question: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Missing required configuration is fatal at startup
    let config = Config::from_env()?;

    match cli.command {
        Command::Chat { assistant, session } => repl::run_chat(config, assistant, session).await,
        Command::Sql { question } => repl::run_sql(config, question).await,
    }
}
