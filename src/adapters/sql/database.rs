//! sqlx-backed implementation of the `SqlDatabase` port.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row};

use super::connection::{create_pool, DatabasePool, PoolConfig};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ColumnInfo, ConnectionDescriptor, Dialect, QueryOutput, SqlValue, TableInfo,
};
use crate::domain::ports::SqlDatabase;

const SQLITE_LIST_TABLES: &str = "SELECT name FROM sqlite_master \
     WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' ORDER BY name";

const MYSQL_LIST_TABLES: &str = "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() ORDER BY TABLE_NAME";

const MYSQL_LIST_COLUMNS: &str = "SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR) \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION";

/// Quote an identifier for the given dialect.
pub fn quote_identifier(dialect: Dialect, name: &str) -> String {
    match dialect {
        Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        Dialect::MySql => format!("`{}`", name.replace('`', "``")),
    }
}

/// A connected database with its table list captured at connect time.
#[derive(Debug)]
pub struct SqlxDatabase {
    pool: DatabasePool,
    tables: Vec<String>,
    sample_rows: u32,
}

impl SqlxDatabase {
    /// Open a read-only connection and introspect the table list.
    pub async fn connect(descriptor: &ConnectionDescriptor, sample_rows: u32) -> DomainResult<Self> {
        let pool = create_pool(descriptor, &PoolConfig::read_only()).await?;
        Self::from_pool(pool, sample_rows).await
    }

    /// Wrap an existing pool, introspecting its tables.
    pub async fn from_pool(pool: DatabasePool, sample_rows: u32) -> DomainResult<Self> {
        let tables = match list_tables(&pool).await {
            Ok(tables) => tables,
            Err(e) => {
                pool.close().await;
                return Err(DomainError::Connection(format!(
                    "Failed to inspect database schema: {e}"
                )));
            }
        };

        tracing::debug!(dialect = %pool.dialect(), tables = tables.len(), "database introspected");

        Ok(Self {
            pool,
            tables,
            sample_rows,
        })
    }

    /// The underlying pool.
    pub const fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    async fn describe_table(&self, name: &str) -> DomainResult<TableInfo> {
        let dialect = self.dialect();
        let (create_statement, columns) = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                let create: Option<String> =
                    sqlx::query_scalar::<_, Option<String>>("SELECT sql FROM sqlite_master WHERE name = ?")
                        .bind(name)
                        .fetch_optional(pool)
                        .await?
                        .flatten();
                let columns = sqlx::query("SELECT name, type FROM pragma_table_info(?)")
                    .bind(name)
                    .fetch_all(pool)
                    .await?
                    .iter()
                    .map(|row| {
                        Ok(ColumnInfo {
                            name: row.try_get("name")?,
                            data_type: row.try_get("type")?,
                        })
                    })
                    .collect::<Result<Vec<_>, sqlx::Error>>()?;
                (create.unwrap_or_default(), columns)
            }
            DatabasePool::MySql(pool) => {
                let show = format!("SHOW CREATE TABLE {}", quote_identifier(dialect, name));
                let row = pool.fetch_one(show.as_str()).await?;
                let create = match mysql_value(&row, 1) {
                    SqlValue::Text(s) => s,
                    _ => String::new(),
                };
                let columns = sqlx::query(MYSQL_LIST_COLUMNS)
                    .bind(name)
                    .fetch_all(pool)
                    .await?
                    .iter()
                    .map(|row| {
                        Ok(ColumnInfo {
                            name: row.try_get(0)?,
                            data_type: row.try_get(1)?,
                        })
                    })
                    .collect::<Result<Vec<_>, sqlx::Error>>()?;
                (create, columns)
            }
        };

        let sample_sql = format!(
            "SELECT * FROM {} LIMIT {}",
            quote_identifier(dialect, name),
            self.sample_rows
        );
        let mut sample = self.run(&sample_sql).await?;
        if sample.columns.is_empty() {
            sample.columns = columns.iter().map(|c| c.name.clone()).collect();
        }

        Ok(TableInfo {
            name: name.to_string(),
            create_statement,
            columns,
            sample,
        })
    }
}

#[async_trait]
impl SqlDatabase for SqlxDatabase {
    fn dialect(&self) -> Dialect {
        self.pool.dialect()
    }

    fn table_names(&self) -> &[String] {
        &self.tables
    }

    async fn table_info(&self, tables: &[String]) -> DomainResult<Vec<TableInfo>> {
        let missing: Vec<&String> = tables
            .iter()
            .filter(|t| !self.tables.contains(*t))
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::InputValidation(format!(
                "table_names {missing:?} not found in database"
            )));
        }

        let mut infos = Vec::with_capacity(tables.len());
        for name in tables {
            infos.push(self.describe_table(name).await?);
        }
        Ok(infos)
    }

    async fn run(&self, sql: &str) -> DomainResult<QueryOutput> {
        match &self.pool {
            DatabasePool::Sqlite(pool) => {
                let rows = pool.fetch_all(sql).await?;
                Ok(collect_rows(&rows, sqlite_value))
            }
            DatabasePool::MySql(pool) => {
                // A plain &str goes over the text protocol, which also covers
                // statements MySQL refuses to prepare.
                let rows = pool.fetch_all(sql).await?;
                Ok(collect_rows(&rows, mysql_value))
            }
        }
    }
}

async fn list_tables(pool: &DatabasePool) -> Result<Vec<String>, sqlx::Error> {
    match pool {
        DatabasePool::Sqlite(pool) => {
            sqlx::query_scalar::<_, String>(SQLITE_LIST_TABLES)
                .fetch_all(pool)
                .await
        }
        DatabasePool::MySql(pool) => {
            sqlx::query_scalar::<_, String>(MYSQL_LIST_TABLES)
                .fetch_all(pool)
                .await
        }
    }
}

fn collect_rows<R: Row>(rows: &[R], decode: fn(&R, usize) -> SqlValue) -> QueryOutput {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| (0..row.len()).map(|idx| decode(row, idx)).collect())
        .collect();

    QueryOutput { columns, rows }
}

fn sqlite_value(row: &SqliteRow, idx: usize) -> SqlValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map_or(SqlValue::Null, SqlValue::Integer);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map_or(SqlValue::Null, SqlValue::Real);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map_or(SqlValue::Null, SqlValue::Text);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v.map_or(SqlValue::Null, |b| SqlValue::Blob(b.len()));
    }
    SqlValue::Null
}

fn mysql_value(row: &MySqlRow, idx: usize) -> SqlValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map_or(SqlValue::Null, SqlValue::Integer);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return v.map_or(SqlValue::Null, |v| {
            i64::try_from(v).map_or_else(|_| SqlValue::Text(v.to_string()), SqlValue::Integer)
        });
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map_or(SqlValue::Null, SqlValue::Real);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v.map_or(SqlValue::Null, |v| SqlValue::Real(f64::from(v)));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map_or(SqlValue::Null, SqlValue::Text);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        return v.map_or(SqlValue::Null, |v| SqlValue::Text(v.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        return v.map_or(SqlValue::Null, |v| SqlValue::Text(v.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(idx) {
        return v.map_or(SqlValue::Null, |v| SqlValue::Text(v.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v.map_or(SqlValue::Null, |bytes| match String::from_utf8(bytes) {
            Ok(text) => SqlValue::Text(text),
            Err(e) => SqlValue::Blob(e.as_bytes().len()),
        });
    }
    // DECIMAL and friends arrive as text on the wire.
    row.try_get_unchecked::<Option<String>, _>(idx)
        .ok()
        .flatten()
        .map_or(SqlValue::Null, SqlValue::Text)
}
