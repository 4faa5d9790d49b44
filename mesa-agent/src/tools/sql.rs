//! SQL introspection tools over PostgreSQL.
//!
//! Fixed information-schema queries plus an arbitrary-query executor. All
//! results are stringified rows; failures come back as `Error ...` strings
//! so the agent can read them as observations and retry.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{Tool, parse_named_args, strip_assignment};

const SUPPORTED_OBJECT_TYPES: [&str; 4] = ["table", "view", "sequence", "extension"];

/// Shared database handle for the SQL tools.
pub struct SqlDatabase {
    pool: PgPool,
}

impl SqlDatabase {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Usable table names in the public schema.
    pub async fn usable_table_names(&self) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Execute an arbitrary query and stringify the result.
    pub async fn run_query(&self, query: &str) -> String {
        match self.select_rows_as_json(query).await {
            Ok(rows) if rows.is_empty() => "No result found.".to_string(),
            Ok(rows) => rows.join("\n"),
            // Not a SELECT (or not wrappable): execute directly
            Err(_) => match sqlx::query(query).execute(&self.pool).await {
                Ok(done) => format!("Statement executed, {} rows affected.", done.rows_affected()),
                Err(e) => format!("Error during SQL query: {e}"),
            },
        }
    }

    /// Wrap a SELECT so every row comes back as one JSON text column.
    async fn select_rows_as_json(&self, query: &str) -> Result<Vec<String>, sqlx::Error> {
        let wrapped = format!(
            "SELECT row_to_json(q)::text FROM ({}) AS q",
            query.trim().trim_end_matches(';')
        );
        let rows: Vec<(String,)> = sqlx::query_as(&wrapped).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(row,)| row).collect())
    }

    /// List all schemas with a System/User classification.
    pub async fn list_schemas(&self) -> String {
        self.run_query(
            "SELECT schema_name, schema_owner,
                    CASE
                        WHEN schema_name LIKE 'pg_%' THEN 'System Schema'
                        WHEN schema_name = 'information_schema' THEN 'System Information Schema'
                        ELSE 'User Schema'
                    END AS schema_type
             FROM information_schema.schemata
             ORDER BY schema_type, schema_name",
        )
        .await
    }

    /// List objects of one type in a schema.
    pub async fn list_objects(&self, schema_name: &str, object_type: &str) -> String {
        if schema_name.is_empty() {
            return "Error: Schema name not specified.".to_string();
        }
        let object_type = if object_type.is_empty() { "table" } else { object_type };
        if !SUPPORTED_OBJECT_TYPES.contains(&object_type) {
            return format!("Error: Unsupported object type: {object_type}");
        }

        match object_type {
            "table" | "view" => {
                let table_type = if object_type == "table" { "BASE TABLE" } else { "VIEW" };
                let rows: Result<Vec<(String, String, String)>, sqlx::Error> = sqlx::query_as(
                    "SELECT table_schema::text, table_name::text, table_type::text \
                     FROM information_schema.tables \
                     WHERE table_schema = $1 AND table_type = $2 \
                     ORDER BY table_name",
                )
                .bind(schema_name)
                .bind(table_type)
                .fetch_all(&self.pool)
                .await;
                match rows {
                    Ok(rows) if rows.is_empty() => {
                        format!("No {object_type}s found in schema '{schema_name}'.")
                    }
                    Ok(rows) => format_rows(rows.iter().map(|(a, b, c)| vec![a, b, c])),
                    Err(e) => format!("Error during SQL query: {e}"),
                }
            }
            "sequence" => {
                let rows: Result<Vec<(String, String, String)>, sqlx::Error> = sqlx::query_as(
                    "SELECT sequence_schema::text, sequence_name::text, data_type::text \
                     FROM information_schema.sequences \
                     WHERE sequence_schema = $1 \
                     ORDER BY sequence_name",
                )
                .bind(schema_name)
                .fetch_all(&self.pool)
                .await;
                match rows {
                    Ok(rows) if rows.is_empty() => "No result found.".to_string(),
                    Ok(rows) => format_rows(rows.iter().map(|(a, b, c)| vec![a, b, c])),
                    Err(e) => format!("Error during SQL query: {e}"),
                }
            }
            _ => {
                self.run_query(
                    "SELECT extname, extversion, extrelocatable FROM pg_extension ORDER BY extname",
                )
                .await
            }
        }
    }

    /// Columns, constraints and indexes of one object.
    pub async fn get_object_details(
        &self,
        schema_name: &str,
        object_name: &str,
        object_type: &str,
    ) -> String {
        if schema_name.is_empty() {
            return "Error: Schema name not specified.".to_string();
        }
        if object_name.trim().is_empty() {
            return "Error: Object name not specified.".to_string();
        }
        let object_type = if object_type.is_empty() { "table" } else { object_type };
        if !SUPPORTED_OBJECT_TYPES.contains(&object_type) {
            return format!("Error: Unsupported object type: {object_type}");
        }

        match object_type {
            "table" | "view" => {
                let exists: Result<Option<(i64,)>, sqlx::Error> = sqlx::query_as(
                    "SELECT COUNT(*)::BIGINT FROM information_schema.tables \
                     WHERE table_schema = $1 AND table_name = $2",
                )
                .bind(schema_name)
                .bind(object_name)
                .fetch_optional(&self.pool)
                .await;
                match exists {
                    Ok(Some((count,))) if count > 0 => {}
                    Ok(_) => {
                        return format!(
                            "Error: Table '{object_name}' not found in schema '{schema_name}'."
                        );
                    }
                    Err(e) => return format!("Error during SQL query: {e}"),
                }

                let columns = self
                    .run_bound_query(
                        "SELECT row_to_json(q)::text FROM ( \
                             SELECT column_name, data_type, is_nullable, column_default \
                             FROM information_schema.columns \
                             WHERE table_schema = $1 AND table_name = $2 \
                             ORDER BY ordinal_position) AS q",
                        schema_name,
                        object_name,
                    )
                    .await;
                let constraints = self
                    .run_bound_query(
                        "SELECT row_to_json(q)::text FROM ( \
                             SELECT tc.constraint_name, tc.constraint_type, kcu.column_name \
                             FROM information_schema.table_constraints AS tc \
                             LEFT JOIN information_schema.key_column_usage AS kcu \
                               ON tc.constraint_name = kcu.constraint_name \
                              AND tc.table_schema = kcu.table_schema \
                             WHERE tc.table_schema = $1 AND tc.table_name = $2) AS q",
                        schema_name,
                        object_name,
                    )
                    .await;
                let indexes = self
                    .run_bound_query(
                        "SELECT row_to_json(q)::text FROM ( \
                             SELECT indexname, indexdef FROM pg_indexes \
                             WHERE schemaname = $1 AND tablename = $2) AS q",
                        schema_name,
                        object_name,
                    )
                    .await;

                format!("Columns: {columns}\nConstraints: {constraints}\nIndexes: {indexes}")
            }
            "sequence" => {
                self.run_bound_query(
                    "SELECT row_to_json(q)::text FROM ( \
                         SELECT sequence_schema, sequence_name, data_type, start_value, increment \
                         FROM information_schema.sequences \
                         WHERE sequence_schema = $1 AND sequence_name = $2) AS q",
                    schema_name,
                    object_name,
                )
                .await
            }
            _ => {
                let rows: Result<Vec<(String,)>, sqlx::Error> = sqlx::query_as(
                    "SELECT row_to_json(q)::text FROM ( \
                         SELECT extname, extversion, extrelocatable FROM pg_extension \
                         WHERE extname = $1) AS q",
                )
                .bind(object_name)
                .fetch_all(&self.pool)
                .await;
                stringify_rows(rows)
            }
        }
    }

    async fn run_bound_query(&self, query: &str, first: &str, second: &str) -> String {
        let rows: Result<Vec<(String,)>, sqlx::Error> = sqlx::query_as(query)
            .bind(first)
            .bind(second)
            .fetch_all(&self.pool)
            .await;
        stringify_rows(rows)
    }
}

fn stringify_rows(rows: Result<Vec<(String,)>, sqlx::Error>) -> String {
    match rows {
        Ok(rows) if rows.is_empty() => "No result found.".to_string(),
        Ok(rows) => rows
            .into_iter()
            .map(|(row,)| row)
            .collect::<Vec<_>>()
            .join("\n"),
        Err(e) => format!("Error during SQL query: {e}"),
    }
}

fn format_rows<'a>(rows: impl Iterator<Item = Vec<&'a String>>) -> String {
    rows.map(|row| {
        row.into_iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ")
    })
    .collect::<Vec<_>>()
    .join("\n")
}

// ── Tools ───────────────────────────────────────────────────────────

/// Execute an arbitrary SQL query.
pub struct QuerySqlTool {
    db: Arc<SqlDatabase>,
}

impl QuerySqlTool {
    pub fn new(db: Arc<SqlDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for QuerySqlTool {
    fn name(&self) -> &str {
        "sql_db_query"
    }

    fn description(&self) -> &str {
        "Execute a SQL query against the database and return the result."
    }

    async fn run(&self, input: &str) -> String {
        let query = input.trim().trim_matches('\'').trim_matches('"');
        if query.is_empty() {
            return "Error: No SQL query specified.".to_string();
        }
        self.db.run_query(query).await
    }
}

/// List usable tables in the public schema.
pub struct ListTablesTool {
    db: Arc<SqlDatabase>,
}

impl ListTablesTool {
    pub fn new(db: Arc<SqlDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for ListTablesTool {
    fn name(&self) -> &str {
        "sql_db_list_tables"
    }

    fn description(&self) -> &str {
        "List the tables available in the public schema."
    }

    async fn run(&self, _input: &str) -> String {
        match self.db.usable_table_names().await {
            Ok(names) if names.is_empty() => "No result found.".to_string(),
            Ok(names) => names.join(", "),
            Err(e) => format!("Error during SQL query: {e}"),
        }
    }
}

/// List all schemas in the database.
pub struct ListSchemasTool {
    db: Arc<SqlDatabase>,
}

impl ListSchemasTool {
    pub fn new(db: Arc<SqlDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for ListSchemasTool {
    fn name(&self) -> &str {
        "list_schemas"
    }

    fn description(&self) -> &str {
        "List all schemas in the database."
    }

    async fn run(&self, _input: &str) -> String {
        self.db.list_schemas().await
    }
}

/// List objects (tables, views, sequences, extensions) in a schema.
pub struct ListObjectsTool {
    db: Arc<SqlDatabase>,
}

impl ListObjectsTool {
    pub fn new(db: Arc<SqlDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for ListObjectsTool {
    fn name(&self) -> &str {
        "list_objects"
    }

    fn description(&self) -> &str {
        "List objects (tables, views, sequences, extensions) in a specific schema."
    }

    async fn run(&self, input: &str) -> String {
        let args = parse_named_args(input);
        let schema_name = args
            .get("schema_name")
            .cloned()
            .unwrap_or_else(|| strip_assignment(input));
        let object_type = args.get("object_type").cloned().unwrap_or_default();
        if schema_name.is_empty() {
            return "Error: Schema name not specified.".to_string();
        }
        self.db.list_objects(&schema_name, &object_type).await
    }
}

/// Detailed information about one database object.
pub struct GetObjectDetailsTool {
    db: Arc<SqlDatabase>,
}

impl GetObjectDetailsTool {
    pub fn new(db: Arc<SqlDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for GetObjectDetailsTool {
    fn name(&self) -> &str {
        "get_object_details"
    }

    fn description(&self) -> &str {
        "Get detailed information (columns, constraints, indexes) about a specific database object."
    }

    async fn run(&self, input: &str) -> String {
        let args = parse_named_args(input);
        let schema_name = args
            .get("schema_name")
            .cloned()
            .unwrap_or_else(|| "public".to_string());
        let object_name = args.get("object_name").cloned().unwrap_or_default();
        let object_type = args.get("object_type").cloned().unwrap_or_default();
        if object_name.trim().is_empty() {
            return "Error: Object name not specified.".to_string();
        }
        self.db
            .get_object_details(&schema_name, &object_name, &object_type)
            .await
    }
}
