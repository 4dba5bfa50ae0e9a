//! Prompt templates for the SQL agent.

use crate::domain::models::{ConversationMemory, Dialect};

use super::toolkit::SqlTool;

/// Stop sequence that keeps the model from inventing tool output.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// One completed tool round trip.
#[derive(Debug, Clone)]
pub struct ScratchpadEntry {
    /// Model output that led to the action.
    pub log: String,
    /// Tool output.
    pub observation: String,
}

/// Builds the ReAct prompt for one reasoning step.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    dialect: Dialect,
    top_k: u32,
}

impl PromptBuilder {
    /// Prompts for `dialect`, asking for at most `top_k` rows.
    pub const fn new(dialect: Dialect, top_k: u32) -> Self {
        Self { dialect, top_k }
    }

    /// Full agent prompt for one step.
    pub fn build(
        &self,
        question: &str,
        memory: &ConversationMemory,
        scratchpad: &[ScratchpadEntry],
    ) -> String {
        let tools = SqlTool::ALL
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");
        let tool_names = SqlTool::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ");

        let history = if memory.is_empty() {
            String::new()
        } else {
            format!("Previous conversation:\n{}\n\n", memory.transcript())
        };

        let mut prompt = format!(
            r#"You are an agent designed to interact with a SQL database.
Given an input question, create a syntactically correct {dialect} query to run, then look at the results of the query and return the answer.
Unless the user specifies a specific number of examples they wish to obtain, always limit your query to at most {top_k} results.
You can order the results by a relevant column to return the most interesting examples in the database.
Never query for all the columns from a specific table, only ask for the relevant columns given the question.
You have access to tools for interacting with the database.
Only use the below tools. Only use the information returned by the below tools to construct your final answer.
You MUST double check your query before executing it. If you get an error while executing a query, rewrite the query and try again.

DO NOT make any DML statements (INSERT, UPDATE, DELETE, DROP etc.) to the database.

If the question does not seem related to the database, just return "I don't know" as the answer.

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

{history}Begin!

Question: {question}
Thought: I should look at the tables in the database to see what I can query.  Then I should query the schema of the most relevant tables.
"#,
            dialect = self.dialect,
            top_k = self.top_k,
        );

        for entry in scratchpad {
            prompt.push_str(&entry.log);
            prompt.push_str("\nObservation: ");
            prompt.push_str(&entry.observation);
            prompt.push_str("\nThought: ");
        }

        prompt
    }

    /// Prompt asking the model to review a query before it runs.
    pub fn query_checker(&self, query: &str) -> String {
        format!(
            r#"{query}
Double check the {dialect} query above for common mistakes, including:
- Using NOT IN with NULL values
- Using UNION when UNION ALL should have been used
- Using BETWEEN for exclusive ranges
- Data type mismatch in predicates
- Properly quoting identifiers
- Using the correct number of arguments for functions
- Casting to the correct data type
- Using the proper columns for joins

If there are any of the above mistakes, rewrite the query. If there are no mistakes, just reproduce the original query.

Output the final SQL query only.

SQL Query: "#,
            dialect = self.dialect,
        )
    }
}
