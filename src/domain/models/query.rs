//! Query results and schema descriptions returned by database adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest string value shown to the model before truncation.
pub const MAX_STRING_LENGTH: usize = 300;

/// A single cell value, normalised across engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary payload, summarised by length.
    Blob(usize),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(len) => write!(f, "<{len} bytes>"),
        }
    }
}

impl SqlValue {
    /// Literal form used inside rendered result tuples.
    fn literal(&self) -> String {
        match self {
            Self::Text(s) => format!("'{}'", truncate(s, MAX_STRING_LENGTH).replace('\'', "\\'")),
            other => other.to_string(),
        }
    }
}

/// Rows produced by a statement, with their column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Column names, empty when no rows came back.
    pub columns: Vec<String>,
    /// Rows in result order.
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryOutput {
    /// Whether the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render rows as a list of tuples, e.g. `[(1, 'Alice'), (2, 'Bob')]`.
    ///
    /// An empty result renders as an empty string.
    pub fn to_tuple_list(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(SqlValue::literal).collect();
                if cells.len() == 1 {
                    format!("({},)", cells[0])
                } else {
                    format!("({})", cells.join(", "))
                }
            })
            .collect::<Vec<_>>();
        format!("[{}]", rows.join(", "))
    }

    /// Render as tab-separated lines with a header, for schema samples.
    pub fn to_tsv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.columns.join("\t"));
        for row in &self.rows {
            lines.push(
                row.iter()
                    .map(|v| truncate(&v.to_string(), 100))
                    .collect::<Vec<_>>()
                    .join("\t"),
            );
        }
        lines.join("\n")
    }
}

/// Column of an introspected table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared column type.
    pub data_type: String,
}

/// Description of one table: its DDL, columns and a few example rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// DDL as stored by the database.
    pub create_statement: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnInfo>,
    /// A few example rows.
    pub sample: QueryOutput,
}

impl TableInfo {
    /// Format used in the `sql_db_schema` tool output.
    pub fn describe(&self) -> String {
        let mut out = self.create_statement.trim_end().to_string();
        if !self.sample.columns.is_empty() {
            out.push_str(&format!(
                "\n\n/*\n{} rows from {} table:\n{}\n*/",
                self.sample.rows.len(),
                self.name,
                self.sample.to_tsv()
            ));
        }
        out
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
