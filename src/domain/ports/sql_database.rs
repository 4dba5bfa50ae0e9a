//! SQL database port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Dialect, QueryOutput, TableInfo};

/// A connected, introspected database the agent's tools run against.
#[async_trait]
pub trait SqlDatabase: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Table names discovered when the connection was opened, sorted.
    fn table_names(&self) -> &[String];

    /// DDL, columns and sample rows for the named tables.
    async fn table_info(&self, tables: &[String]) -> DomainResult<Vec<TableInfo>>;

    /// Execute a statement and collect its rows.
    async fn run(&self, sql: &str) -> DomainResult<QueryOutput>;
}
