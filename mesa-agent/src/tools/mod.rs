//! Tool system for the SQL agent.
//!
//! Tools are the agent's interface to the database. Inputs and outputs are
//! plain strings: the agent protocol is text, and tool failures are
//! returned as `Error: ...` observations instead of ending the loop.

mod args;
mod sql;

pub use args::{parse_named_args, strip_assignment};
pub use sql::{
    GetObjectDetailsTool, ListObjectsTool, ListSchemasTool, ListTablesTool, QuerySqlTool,
    SqlDatabase,
};

use std::sync::Arc;

use async_trait::async_trait;

/// A tool the agent can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run the tool. Errors are reported in the returned observation.
    async fn run(&self, input: &str) -> String;
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        tracing::debug!(tool = tool.name(), "Registered tool");
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .cloned()
    }

    /// (name, description) pairs for prompt assembly.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|tool| (tool.name().to_string(), tool.description().to_string()))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Registry with the full SQL tool set.
    pub fn with_sql_tools(db: Arc<SqlDatabase>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(QuerySqlTool::new(Arc::clone(&db))));
        registry.register(Arc::new(ListTablesTool::new(Arc::clone(&db))));
        registry.register(Arc::new(ListSchemasTool::new(Arc::clone(&db))));
        registry.register(Arc::new(ListObjectsTool::new(Arc::clone(&db))));
        registry.register(Arc::new(GetObjectDetailsTool::new(db)));
        tracing::info!(count = registry.count(), "Registered SQL tools");
        registry
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input."
        }

        async fn run(&self, input: &str) -> String {
            input.to_string()
        }
    }

    #[tokio::test]
    async fn registry_finds_tools_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let tool = registry.get("echo").unwrap();
        assert_eq!(tool.run("ping").await, "ping");
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.descriptions(), vec![(
            "echo".to_string(),
            "Echo the input.".to_string()
        )]);
    }
}
