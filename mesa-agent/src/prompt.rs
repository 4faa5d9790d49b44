//! Prompt templates.

/// System prompt for the templated chat (`chat --assistant`).
pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful, English-speaking chatbot. \
     Always answer in a friendly and understandable manner.";

/// System prompt seeded into persisted-history sessions.
pub const HISTORY_SYSTEM_PROMPT: &str = "You are a helpful chatbot. Always answer in a friendly \
     manner and in English. Keep answers concise, no more than 3 sentences unless otherwise \
     requested.";

/// Human prompt template. A single `{user_input}` placeholder.
pub const HUMAN_TEMPLATE: &str = "{user_input}";

/// Render a template by substituting `{user_input}`.
pub fn render_user_template(template: &str, user_input: &str) -> String {
    template.replace("{user_input}", user_input)
}

/// Build the ReAct prompt for the SQL agent.
///
/// The model must answer in the fixed Thought / Action / Action Input /
/// Observation / Final Answer format; the scratchpad carries the steps
/// taken so far.
pub fn sql_agent_prompt(
    question: &str,
    schema: &str,
    tools: &[(String, String)],
    scratchpad: &str,
) -> String {
    let tool_list = tools
        .iter()
        .map(|(name, description)| format!("{name}: {description}"))
        .collect::<Vec<_>>()
        .join("\n");
    let tool_names = tools
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an expert SQL assistant that answers user questions by generating and \
executing SQL queries based on the database schema.
Your goal is to:
- Identify available schemas in the database using 'list_schemas'.
- Find relevant schemas and objects contained within them (tables, views, etc.) using 'list_objects'.
- Query detailed information about relevant objects (columns, constraints, indexes) using 'get_object_details'.
- Generate a syntactically correct SQL query to answer the question.
- ABSOLUTELY execute the query using the 'sql_db_query' tool to retrieve the result. This is a mandatory step to answer the user's request.
- Ensure that the result matches the question.
If the query fails, analyze the error, correct the query, and try again.

Question: {question}
Schema: {schema}

Available Tools:
{tool_list}

Tool Names: {tool_names}

Follow this process and strictly adhere to the format. Use exactly the following labels without additional numbers, dots, or text:
Thought: [Explain what you will do next, e.g., list schemas, investigate objects, or formulate a query]
Action: [Name of the tool, e.g., list_schemas, list_objects, get_object_details, or sql_db_query]
Action Input: [The input for the tool, e.g., schema_name='public', object_type='table', or an SQL query]
Observation: [The result of the tool or the error that occurs]
Thought: [Analyze the result or the error and decide what to do next]
Repeat the steps until you have a final answer.
Final Answer: [The result of the query, e.g., 'There are 5 orders this month.' Return ONLY the result of the SQL query and NEVER just the SQL code.]

Important Note for PostgreSQL:
- You are working with a PostgreSQL database. Use PostgreSQL-specific functions like CURRENT_DATE instead of CURDATE().
- Always start by listing the schemas with 'list_schemas' to get an overview.
- Use 'list_objects' to find relevant tables or other objects in a schema (e.g., with schema_name='public' and object_type='table').
- Use 'get_object_details' to get detailed information about a table or object (e.g., columns, indexes) before formulating a query.
- Ensure that 'Action Input' is always in the format 'parameter=value' when parameters are specified.
- If a tool returns an error, check the inputs and ensure all required parameters are correctly specified.
- In SQL queries, always specify the schema explicitly (e.g., 'public.reservations' instead of just 'reservations') to avoid errors like \"Relation does not exist\".
- Once an SQL query is formulated, it MUST be executed with 'sql_db_query'. Under no circumstances return only the SQL code as 'Final Answer'.

Scratchpad for intermediate steps:
{scratchpad}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitutes_user_input() {
        assert_eq!(
            render_user_template(HUMAN_TEMPLATE, "book a table"),
            "book a table"
        );
        assert_eq!(
            render_user_template("Q: {user_input}!", "hi"),
            "Q: hi!"
        );
    }

    #[test]
    fn sql_prompt_lists_tools_and_question() {
        let tools = vec![
            ("sql_db_query".to_string(), "Execute a SQL query.".to_string()),
            ("list_schemas".to_string(), "List schemas.".to_string()),
        ];
        let prompt = sql_agent_prompt("How many reservations?", "unknown", &tools, "");
        assert!(prompt.contains("Question: How many reservations?"));
        assert!(prompt.contains("sql_db_query: Execute a SQL query."));
        assert!(prompt.contains("Tool Names: sql_db_query, list_schemas"));
    }
}
