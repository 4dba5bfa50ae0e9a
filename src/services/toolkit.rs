//! Tools the SQL agent can call.
//!
//! Tool failures never abort the loop: they come back as `Error: ...`
//! observations so the model can correct itself.

use std::sync::Arc;
use tracing::debug;

use crate::domain::ports::{ChatModel, SqlDatabase};

use super::prompt::PromptBuilder;

/// Statement keywords the query tool accepts.
const READ_ONLY_KEYWORDS: [&str; 7] = [
    "SELECT", "WITH", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "PRAGMA",
];

/// Tools offered to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlTool {
    /// Run a query.
    Query,
    /// Describe tables.
    Schema,
    /// List tables.
    ListTables,
    /// Have the model review a query.
    QueryChecker,
}

impl SqlTool {
    /// Every tool, in prompt order.
    pub const ALL: [Self; 4] = [Self::Query, Self::Schema, Self::ListTables, Self::QueryChecker];

    /// Name the model calls the tool by.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Query => "sql_db_query",
            Self::Schema => "sql_db_schema",
            Self::ListTables => "sql_db_list_tables",
            Self::QueryChecker => "sql_db_query_checker",
        }
    }

    /// Description shown in the prompt.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Query => "Input to this tool is a detailed and correct SQL query, output is a result from the database. If the query is not correct, an error message will be returned. If an error is returned, rewrite the query, check the query, and try again. If you encounter an issue with Unknown column 'xxxx' in 'field list', use sql_db_schema to query the correct table fields.",
            Self::Schema => "Input to this tool is a comma-separated list of tables, output is the schema and sample rows for those tables. Be sure that the tables actually exist by calling sql_db_list_tables first! Example Input: table1, table2, table3",
            Self::ListTables => "Input is an empty string, output is a comma-separated list of tables in the database.",
            Self::QueryChecker => "Use this tool to double check if your query is correct before executing it. Always use this tool before executing a query with sql_db_query!",
        }
    }

    /// Tool with the given name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name.trim())
    }
}

/// First keyword of a statement, skipping leading comments and parentheses.
fn leading_keyword(sql: &str) -> Option<String> {
    let mut rest = sql;
    loop {
        rest = rest.trim_start().trim_start_matches('(');
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            break;
        }
    }
    let word: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    (!word.is_empty()).then(|| word.to_ascii_uppercase())
}

/// Whether a statement starts with a read-only keyword.
pub fn is_read_only_statement(sql: &str) -> bool {
    leading_keyword(sql).is_some_and(|kw| READ_ONLY_KEYWORDS.contains(&kw.as_str()))
}

/// Strip markdown fencing a model sometimes wraps SQL in.
fn clean_sql(input: &str) -> &str {
    let trimmed = input.trim().trim_matches('`').trim();
    trimmed
        .strip_prefix("sql\n")
        .or_else(|| trimmed.strip_prefix("SQL\n"))
        .unwrap_or(trimmed)
        .trim()
}

/// The four SQL tools bound to one session's database and model.
pub struct SqlToolkit {
    db: Arc<dyn SqlDatabase>,
    llm: Arc<dyn ChatModel>,
    prompts: PromptBuilder,
}

impl SqlToolkit {
    /// Tools over `db`, using `llm` for the checker.
    pub fn new(db: Arc<dyn SqlDatabase>, llm: Arc<dyn ChatModel>, prompts: PromptBuilder) -> Self {
        Self { db, llm, prompts }
    }

    /// Run a tool by name, returning the observation text.
    pub async fn invoke(&self, tool_name: &str, input: &str) -> String {
        match SqlTool::from_name(tool_name) {
            Some(tool) => self.run(tool, input).await,
            None => {
                let valid = SqlTool::ALL
                    .iter()
                    .map(|t| t.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} is not a valid tool, try one of [{valid}].", tool_name.trim())
            }
        }
    }

    /// Run one tool and render its observation.
    pub async fn run(&self, tool: SqlTool, input: &str) -> String {
        debug!(tool = tool.name(), input, "running tool");
        match tool {
            SqlTool::ListTables => self.db.table_names().join(", "),
            SqlTool::Schema => self.schema(input).await,
            SqlTool::Query => self.query(input).await,
            SqlTool::QueryChecker => self.check_query(input).await,
        }
    }

    async fn schema(&self, input: &str) -> String {
        let tables: Vec<String> = input
            .split(',')
            .map(|t| t.trim().trim_matches(|c| c == '"' || c == '`' || c == '\'').to_string())
            .filter(|t| !t.is_empty())
            .collect();

        match self.db.table_info(&tables).await {
            Ok(infos) => infos
                .iter()
                .map(|i| i.describe())
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(e) => format!("Error: {e}"),
        }
    }

    async fn query(&self, input: &str) -> String {
        let sql = clean_sql(input);
        if !is_read_only_statement(sql) {
            return format!(
                "Error: Only read-only statements are allowed (one of {}).",
                READ_ONLY_KEYWORDS.join(", ")
            );
        }
        match self.db.run(sql).await {
            Ok(output) => output.to_tuple_list(),
            Err(e) => format!("Error: {e}"),
        }
    }

    async fn check_query(&self, input: &str) -> String {
        let prompt = self.prompts.query_checker(clean_sql(input));
        match self.llm.complete(&prompt, &[]).await {
            Ok(checked) => checked.trim().to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::adapters::llm::ScriptedChatModel;
    use crate::domain::errors::{DomainError, DomainResult};
    use crate::domain::models::{Dialect, QueryOutput, SqlValue, TableInfo};

    struct FakeDatabase {
        tables: Vec<String>,
    }

    #[async_trait]
    impl SqlDatabase for FakeDatabase {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }

        fn table_names(&self) -> &[String] {
            &self.tables
        }

        async fn table_info(&self, tables: &[String]) -> DomainResult<Vec<TableInfo>> {
            tables
                .iter()
                .map(|t| {
                    if self.tables.contains(t) {
                        Ok(TableInfo {
                            name: t.clone(),
                            create_statement: format!("CREATE TABLE {t} (id INTEGER)"),
                            columns: vec![],
                            sample: QueryOutput::default(),
                        })
                    } else {
                        Err(DomainError::InputValidation(format!(
                            "table_names {{'{t}'}} not found in database"
                        )))
                    }
                })
                .collect()
        }

        async fn run(&self, sql: &str) -> DomainResult<QueryOutput> {
            if sql.contains("missing") {
                return Err(DomainError::Database("no such table: missing".into()));
            }
            Ok(QueryOutput {
                columns: vec!["n".into()],
                rows: vec![vec![SqlValue::Integer(3)]],
            })
        }
    }

    fn toolkit(llm: ScriptedChatModel) -> SqlToolkit {
        let db = FakeDatabase {
            tables: vec!["employees".into(), "sales".into()],
        };
        SqlToolkit::new(
            Arc::new(db),
            Arc::new(llm),
            PromptBuilder::new(Dialect::Sqlite, 10),
        )
    }

    #[test]
    fn test_read_only_guard() {
        assert!(is_read_only_statement("SELECT 1"));
        assert!(is_read_only_statement("  with t as (select 1) select * from t"));
        assert!(is_read_only_statement("-- count\nSELECT COUNT(*) FROM employees"));
        assert!(is_read_only_statement("/* hi */ (SELECT 1)"));
        assert!(is_read_only_statement("PRAGMA table_info(employees)"));
        assert!(is_read_only_statement("desc employees"));
        assert!(!is_read_only_statement("DELETE FROM employees"));
        assert!(!is_read_only_statement("DROP TABLE sales"));
        assert!(!is_read_only_statement("INSERT INTO t VALUES (1)"));
        assert!(!is_read_only_statement(""));
        assert!(!is_read_only_statement("-- only a comment"));
    }

    #[test]
    fn test_clean_sql_strips_fences() {
        assert_eq!(clean_sql("```sql\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(clean_sql("  SELECT 1 "), "SELECT 1");
    }

    #[tokio::test]
    async fn test_list_tables() {
        let tk = toolkit(ScriptedChatModel::repeating(""));
        assert_eq!(tk.invoke("sql_db_list_tables", "").await, "employees, sales");
    }

    #[tokio::test]
    async fn test_schema_unknown_table_is_error_observation() {
        let tk = toolkit(ScriptedChatModel::repeating(""));
        let obs = tk.invoke("sql_db_schema", "employees, ghosts").await;
        assert!(obs.starts_with("Error: "));
        assert!(obs.contains("ghosts"));
    }

    #[tokio::test]
    async fn test_schema_known_tables() {
        let tk = toolkit(ScriptedChatModel::repeating(""));
        let obs = tk.invoke("sql_db_schema", "employees, sales").await;
        assert!(obs.contains("CREATE TABLE employees"));
        assert!(obs.contains("CREATE TABLE sales"));
    }

    #[tokio::test]
    async fn test_query_renders_tuples_and_errors() {
        let tk = toolkit(ScriptedChatModel::repeating(""));
        assert_eq!(tk.invoke("sql_db_query", "SELECT COUNT(*) FROM employees").await, "[(3,)]");

        let obs = tk.invoke("sql_db_query", "SELECT * FROM missing").await;
        assert_eq!(obs, "Error: Database error: no such table: missing");

        let obs = tk.invoke("sql_db_query", "DELETE FROM employees").await;
        assert!(obs.starts_with("Error: Only read-only statements"));
    }

    #[tokio::test]
    async fn test_query_checker_asks_model() {
        let tk = toolkit(ScriptedChatModel::repeating("SELECT name FROM employees LIMIT 10\n"));
        let obs = tk.invoke("sql_db_query_checker", "SELECT name FROM employees").await;
        assert_eq!(obs, "SELECT name FROM employees LIMIT 10");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let tk = toolkit(ScriptedChatModel::repeating(""));
        let obs = tk.invoke("drop_everything", "").await;
        assert_eq!(
            obs,
            "drop_everything is not a valid tool, try one of [sql_db_query, sql_db_schema, sql_db_list_tables, sql_db_query_checker]."
        );
    }
}
