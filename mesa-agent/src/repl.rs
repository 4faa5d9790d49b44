//! Blocking read-eval-print loops for the chat and SQL agents.
//!
//! Errors are printed and the loop continues; only missing configuration
//! ends the process.

use std::io::Write;
use std::sync::Arc;

use crate::agent::{SqlAgentExecutor, is_database_question};
use crate::config::{Config, DEFAULT_SESSION_ID};
use crate::error::AgentError;
use crate::history::ChatHistory;
use crate::llm::{ChatClient, ChatMessage};
use crate::prompt::{
    ASSISTANT_SYSTEM_PROMPT, HISTORY_SYSTEM_PROMPT, HUMAN_TEMPLATE, render_user_template,
};
use crate::tools::{SqlDatabase, ToolRegistry};

/// Prompt for one line of input. `None` on end of input.
fn read_line(prompt: &str) -> std::io::Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

/// `mesa-agent chat [--assistant] [--session <id>]`
pub async fn run_chat(
    config: Config,
    assistant: bool,
    session: Option<String>,
) -> anyhow::Result<()> {
    let client = ChatClient::new(config.llm.clone());

    let history = match &session {
        Some(session_id) => {
            std::fs::create_dir_all(&config.history.dir)?;
            let history = ChatHistory::connect(&config.history.dir, session_id).await?;
            println!("Chat model and message history initialized.");
            Some(history)
        }
        None => None,
    };

    println!("Welcome to the command-line chatbot! Type 'quit' to exit.");

    loop {
        let Some(input) = read_line("You: ")? else {
            break;
        };
        let input = input.trim().to_string();
        if input.eq_ignore_ascii_case("quit") {
            println!("Session ended.");
            break;
        }
        if input.is_empty() {
            println!("Please enter a question or a statement!");
            continue;
        }

        let mut messages = match &history {
            Some(history) => history.messages_with_system(HISTORY_SYSTEM_PROMPT).await?,
            None if assistant => vec![ChatMessage::system(ASSISTANT_SYSTEM_PROMPT)],
            None => Vec::new(),
        };
        messages.push(ChatMessage::user(render_user_template(
            HUMAN_TEMPLATE,
            &input,
        )));

        match client.complete(&messages).await {
            Ok(reply) => {
                println!("AI: {reply}");
                if let Some(history) = &history {
                    history.add_user_message(&input).await?;
                    history.add_ai_message(&reply).await?;
                }
            }
            Err(e) => println!("An error occurred: {e}"),
        }
    }

    Ok(())
}

/// `mesa-agent sql [question]`
pub async fn run_sql(config: Config, question: Option<String>) -> anyhow::Result<()> {
    let url = config.require_database_url()?;
    let db = Arc::new(SqlDatabase::connect(url).await?);

    match db.usable_table_names().await {
        Ok(tables) => {
            println!(
                "Database connection established. Tables: {}",
                tables.join(", ")
            );
        }
        Err(e) => println!("Warning: could not list tables: {e}"),
    }

    let registry = ToolRegistry::with_sql_tools(db);
    let executor = SqlAgentExecutor::new(ChatClient::new(config.llm.clone()), registry);
    let chat_client = ChatClient::new(config.llm.clone());

    std::fs::create_dir_all(&config.history.dir)?;
    let history = ChatHistory::connect(&config.history.dir, DEFAULT_SESSION_ID).await?;

    if let Some(question) = question {
        let answer = answer_one(&executor, &chat_client, &history, &question).await?;
        println!("AI: {answer}");
        return Ok(());
    }

    println!("Welcome! Type 'quit' to exit.");

    loop {
        let Some(input) = read_line("You: ")? else {
            break;
        };
        let input = input.trim().to_string();
        if input.eq_ignore_ascii_case("quit") {
            println!("Session ended.");
            break;
        }
        if input.is_empty() {
            println!("Please enter something!");
            continue;
        }

        match answer_one(&executor, &chat_client, &history, &input).await {
            Ok(answer) => println!("AI: {answer}"),
            Err(e) => println!("An error occurred: {e}"),
        }
    }

    Ok(())
}

/// Route one input through the agent or plain chat, then persist the turn.
async fn answer_one(
    executor: &SqlAgentExecutor,
    chat_client: &ChatClient,
    history: &ChatHistory,
    input: &str,
) -> Result<String, AgentError> {
    let answer = if is_database_question(input) {
        println!("Processing database-related request: {input}");
        executor.run(input).await?
    } else {
        println!("Processing general request: {input}");
        let mut messages = history.messages_with_system(HISTORY_SYSTEM_PROMPT).await?;
        messages.push(ChatMessage::user(input));
        chat_client.complete(&messages).await?
    };

    history.add_user_message(input).await?;
    history.add_ai_message(&answer).await?;
    Ok(answer)
}
