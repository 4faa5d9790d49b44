//! ReAct-style agent loop for the SQL assistant.
//!
//! The model answers in a fixed text protocol (Thought / Action / Action
//! Input / ... / Final Answer). Each turn is parsed, the named tool runs,
//! and its output is appended to the scratchpad as an Observation. Parse
//! failures become observations too, so a malformed turn corrects itself
//! instead of ending the session.

use crate::error::AgentError;
use crate::llm::{ChatClient, ChatMessage};
use crate::prompt::sql_agent_prompt;
use crate::tools::ToolRegistry;

/// Inputs that route to the SQL agent instead of plain chat.
const DB_KEYWORDS: [&str; 20] = [
    "revenue",
    "data",
    "query",
    "last month",
    "customers",
    "orders",
    "schema",
    "table",
    "index",
    "object",
    "reservation",
    "occupancy",
    "sql",
    "postgresql",
    "database",
    "column",
    "constraint",
    "view",
    "sequence",
    "extension",
];

/// True when the input looks like a database question.
pub fn is_database_question(input: &str) -> bool {
    let lowered = input.to_lowercase();
    DB_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// One parsed agent turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// Invoke a tool with the given input.
    Tool { name: String, input: String },
    /// The agent produced its final answer.
    Finish(String),
}

/// Parse a model completion into the next action.
///
/// `Final Answer:` wins over `Action:` when both appear, matching the
/// executor behaviour the protocol was written for.
pub fn parse_step(output: &str) -> Result<AgentAction, String> {
    if let Some(index) = output.find("Final Answer:") {
        let answer = output[index + "Final Answer:".len()..].trim();
        return Ok(AgentAction::Finish(answer.to_string()));
    }

    let mut action: Option<String> = None;
    let mut action_input: Option<String> = None;
    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Action:") {
            if action.is_none() {
                action = Some(rest.trim().trim_matches('`').to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Action Input:") {
            if action_input.is_none() {
                action_input = Some(rest.trim().to_string());
            }
        }
    }

    match action {
        Some(name) if !name.is_empty() => Ok(AgentAction::Tool {
            name,
            input: action_input.unwrap_or_default(),
        }),
        _ => Err(
            "Invalid format: expected 'Action: <tool>' with 'Action Input: <input>' \
             or 'Final Answer: <answer>'"
                .to_string(),
        ),
    }
}

/// Executor for the SQL agent loop.
pub struct SqlAgentExecutor {
    client: ChatClient,
    registry: ToolRegistry,
    max_iterations: usize,
}

impl SqlAgentExecutor {
    pub fn new(client: ChatClient, registry: ToolRegistry) -> Self {
        Self {
            client,
            registry,
            max_iterations: 15,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Run the loop until a final answer or the iteration ceiling.
    pub async fn run(&self, question: &str) -> Result<String, AgentError> {
        let schema = "Initial schema unknown, use tools to discover schemas, objects, and details.";
        let tools = self.registry.descriptions();
        let mut scratchpad = String::new();

        for iteration in 0..self.max_iterations {
            let prompt = sql_agent_prompt(question, schema, &tools, &scratchpad);
            let completion = self
                .client
                .complete(&[ChatMessage::user(prompt)])
                .await?;

            tracing::debug!(iteration, completion = %completion, "Agent turn");

            match parse_step(&completion) {
                Ok(AgentAction::Finish(answer)) => return Ok(answer),
                Ok(AgentAction::Tool { name, input }) => {
                    let observation = match self.registry.get(&name) {
                        Some(tool) => tool.run(&input).await,
                        None => format!("Error: Unknown tool '{name}'."),
                    };
                    tracing::debug!(tool = %name, "Tool observation collected");
                    scratchpad.push_str(&format!(
                        "Action: {name}\nAction Input: {input}\nObservation: {observation}\n",
                    ));
                }
                Err(parse_error) => {
                    // Tolerate malformed turns, the way handle_parsing_errors does
                    scratchpad.push_str(&format!("Observation: {parse_error}\n"));
                }
            }
        }

        Ok("Agent stopped: iteration limit reached without a final answer.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_answer_wins() {
        let output = "Thought: I know the answer now.\nFinal Answer: There are 5 reservations.";
        assert_eq!(
            parse_step(output).unwrap(),
            AgentAction::Finish("There are 5 reservations.".to_string())
        );
    }

    #[test]
    fn action_and_input_are_extracted() {
        let output = "Thought: I should look at the schemas first.\n\
                      Action: list_schemas\n\
                      Action Input: ";
        assert_eq!(
            parse_step(output).unwrap(),
            AgentAction::Tool {
                name: "list_schemas".to_string(),
                input: String::new(),
            }
        );

        let output = "Action: list_objects\nAction Input: schema_name='public', object_type='table'";
        assert_eq!(
            parse_step(output).unwrap(),
            AgentAction::Tool {
                name: "list_objects".to_string(),
                input: "schema_name='public', object_type='table'".to_string(),
            }
        );
    }

    #[test]
    fn missing_labels_are_a_parse_error() {
        let err = parse_step("I think the answer is 5.").unwrap_err();
        assert!(err.starts_with("Invalid format"), "{err}");
    }

    #[test]
    fn final_answer_beats_action_when_both_appear() {
        let output = "Action: sql_db_query\nAction Input: SELECT 1\nFinal Answer: one";
        assert_eq!(
            parse_step(output).unwrap(),
            AgentAction::Finish("one".to_string())
        );
    }

    #[test]
    fn keyword_routing_matches_database_questions() {
        assert!(is_database_question("How many reservations are there this week?"));
        assert!(is_database_question("show me the SCHEMA"));
        assert!(!is_database_question("Tell me a joke"));
    }
}
