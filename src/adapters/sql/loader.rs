//! CSV directory loaders.
//!
//! Every `*.csv` file directly inside a directory becomes one table named
//! after the file stem. Existing tables are dropped and recreated, so running
//! a load twice over the same files yields the same content.
//!
//! Files are loaded independently and a failure on one file is recorded
//! without undoing the others. On SQLite each table is dropped, created and
//! filled in one transaction. MySQL commits DDL implicitly, so only the
//! inserts share a transaction there and a table whose inserts fail is
//! dropped again.
//!
//! Header handling follows the usual dataframe conventions. A blank header
//! becomes `Unnamed: {i}` and repeated names get `.1`, `.2` suffixes. Rows
//! shorter than the header are padded with NULL.

use serde::Serialize;
use sqlx::{MySql, MySqlPool, QueryBuilder, Sqlite};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::connection::{create_pool, ConnectionError, DatabasePool, PoolConfig};
use super::database::quote_identifier;
use crate::domain::errors::DomainError;
use crate::domain::models::{ConnectionDescriptor, Dialect, MysqlConfig};

const CSV_EXTENSION: &str = "csv";

/// Upper bound on bound parameters per INSERT statement.
const MAX_BIND_PARAMS: usize = 999;

/// Errors loading CSV files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The directory could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        /// Directory being listed.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid CSV.
    #[error("Failed to parse {path}: {source}")]
    Csv {
        /// Offending file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: csv::Error,
    },
    /// The file is empty.
    #[error("{0} has no header row")]
    MissingHeader(PathBuf),
    /// A row has more fields than the header.
    #[error("{path}: expected {expected} fields on line {line}, saw {found}")]
    TooManyFields {
        /// Offending file.
        path: PathBuf,
        /// 1-based line of the row.
        line: u64,
        /// Header width.
        expected: usize,
        /// Fields on the row.
        found: usize,
    },
    /// The table could not be written.
    #[error("Failed to write table `{table}`: {source}")]
    Write {
        /// Target table.
        table: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },
    /// The target database could not be opened.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl From<LoadError> for DomainError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Connection(e) => e.into(),
            other => Self::Database(other.to_string()),
        }
    }
}

/// Inferred storage type of a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Real,
    /// Anything else.
    Text,
}

impl ColumnKind {
    const fn sql_type(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (Self::Integer, Dialect::Sqlite) => "INTEGER",
            (Self::Integer, Dialect::MySql) => "BIGINT",
            (Self::Real, Dialect::Sqlite) => "REAL",
            (Self::Real, Dialect::MySql) => "DOUBLE",
            (Self::Text, _) => "TEXT",
        }
    }

    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut kind = None;
        for cell in cells.map(str::trim).filter(|c| !c.is_empty()) {
            let cell_kind = if cell.parse::<i64>().is_ok() {
                Self::Integer
            } else if cell.parse::<f64>().is_ok() {
                Self::Real
            } else {
                return Self::Text;
            };
            kind = Some(match (kind, cell_kind) {
                (Some(Self::Real), _) | (_, Self::Real) => Self::Real,
                _ => Self::Integer,
            });
        }
        kind.unwrap_or(Self::Text)
    }
}

/// A typed cell ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell.
    Null,
    /// Integer cell.
    Integer(i64),
    /// Floating-point cell.
    Real(f64),
    /// Text cell.
    Text(String),
}

impl CellValue {
    fn parse(raw: &str, kind: ColumnKind) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Null;
        }
        match kind {
            ColumnKind::Integer => trimmed.parse().map_or(Self::Null, Self::Integer),
            ColumnKind::Real => trimmed.parse().map_or(Self::Null, Self::Real),
            ColumnKind::Text => Self::Text(raw.to_string()),
        }
    }
}

/// A parsed CSV file.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// Table name, from the file stem.
    pub name: String,
    /// Column names, from the header.
    pub columns: Vec<String>,
    /// Inferred column types.
    pub kinds: Vec<ColumnKind>,
    /// Typed rows, padded to the header width.
    pub rows: Vec<Vec<CellValue>>,
}

impl CsvTable {
    /// Read and type a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let csv_err = |source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let columns = column_names(reader.headers().map_err(csv_err)?);
        if columns.is_empty() {
            return Err(LoadError::MissingHeader(path.to_path_buf()));
        }

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;
        if let Some(long) = records.iter().find(|r| r.len() > columns.len()) {
            return Err(LoadError::TooManyFields {
                path: path.to_path_buf(),
                line: long.position().map_or(0, csv::Position::line),
                expected: columns.len(),
                found: long.len(),
            });
        }

        let kinds: Vec<ColumnKind> = (0..columns.len())
            .map(|i| ColumnKind::infer(records.iter().filter_map(|r| r.get(i))))
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                kinds
                    .iter()
                    .enumerate()
                    .map(|(i, kind)| CellValue::parse(record.get(i).unwrap_or_default(), *kind))
                    .collect()
            })
            .collect();

        Ok(Self {
            name: table_name_for(path),
            columns,
            kinds,
            rows,
        })
    }

    fn create_statement(&self, dialect: Dialect) -> String {
        let columns = self
            .columns
            .iter()
            .zip(&self.kinds)
            .map(|(name, kind)| {
                format!("{} {}", quote_identifier(dialect, name), kind.sql_type(dialect))
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE {} ({})",
            quote_identifier(dialect, &self.name),
            columns
        )
    }

    fn insert_prefix(&self, dialect: Dialect) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote_identifier(dialect, c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) ",
            quote_identifier(dialect, &self.name),
            columns
        )
    }

    fn rows_per_batch(&self) -> usize {
        (MAX_BIND_PARAMS / self.columns.len().max(1)).max(1)
    }
}

/// Column names from a header row, naming blanks and suffixing repeats.
fn column_names(header: &csv::StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let base = match h.trim() {
                "" => format!("Unnamed: {i}"),
                name => name.to_string(),
            };
            let mut name = base.clone();
            let mut suffix = 0;
            while !seen.insert(name.clone()) {
                suffix += 1;
                name = format!("{base}.{suffix}");
            }
            name
        })
        .collect()
}

fn table_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Result of loading one file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadOutcome {
    /// The file became a table.
    Loaded {
        /// Source file.
        file: PathBuf,
        /// Table written.
        table: String,
        /// Rows inserted.
        rows: usize,
        /// Columns created.
        columns: usize,
    },
    /// The file was skipped.
    Failed {
        /// Source file.
        file: PathBuf,
        /// Table that would have been written.
        table: String,
        /// Why the load failed.
        error: String,
    },
}

/// Summary of a directory load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// One entry per file, in load order.
    pub outcomes: Vec<LoadOutcome>,
}

impl LoadReport {
    /// Whether no file was seen.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Names of the tables written.
    pub fn loaded_tables(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                LoadOutcome::Loaded { table, .. } => Some(table.as_str()),
                LoadOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// Entries for files that failed.
    pub fn failures(&self) -> Vec<&LoadOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Failed { .. }))
            .collect()
    }
}

/// List `*.csv` files directly inside `directory`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn find_csv_files(directory: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LoadError::ReadDir {
                path: directory.to_path_buf(),
                source,
            })
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Load every CSV file in `directory` into `target`, replacing same-named
/// tables.
pub async fn load_directory_into_database(
    directory: &Path,
    target: &DatabasePool,
) -> Result<LoadReport, LoadError> {
    let files = find_csv_files(directory)?;
    let mut report = LoadReport::default();

    if files.is_empty() {
        warn!(directory = %directory.display(), "No CSV files found in {}", directory.display());
        return Ok(report);
    }

    for file in files {
        let table = table_name_for(&file);
        info!("Loading {} -> table `{}`", file.display(), table);

        let outcome = match load_file(&file, target).await {
            Ok(parsed) => LoadOutcome::Loaded {
                file,
                table,
                rows: parsed.rows.len(),
                columns: parsed.columns.len(),
            },
            Err(e) => {
                warn!(file = %file.display(), error = %e, "failed to load CSV file");
                LoadOutcome::Failed {
                    file,
                    table,
                    error: e.to_string(),
                }
            }
        };
        report.outcomes.push(outcome);
    }

    info!(
        loaded = report.loaded_tables().len(),
        failed = report.failures().len(),
        "Done."
    );
    Ok(report)
}

async fn load_file(path: &Path, target: &DatabasePool) -> Result<CsvTable, LoadError> {
    let table = CsvTable::from_path(path)?;
    write_table(target, &table)
        .await
        .map_err(|source| LoadError::Write {
            table: table.name.clone(),
            source,
        })?;
    Ok(table)
}

async fn write_table(target: &DatabasePool, table: &CsvTable) -> Result<(), sqlx::Error> {
    let dialect = target.dialect();
    let drop = format!(
        "DROP TABLE IF EXISTS {}",
        quote_identifier(dialect, &table.name)
    );
    let create = table.create_statement(dialect);
    let insert_prefix = table.insert_prefix(dialect);

    match target {
        DatabasePool::Sqlite(pool) => {
            let mut tx = pool.begin().await?;
            sqlx::query(&drop).execute(&mut *tx).await?;
            sqlx::query(&create).execute(&mut *tx).await?;
            for chunk in table.rows.chunks(table.rows_per_batch()) {
                let mut builder = QueryBuilder::<Sqlite>::new(insert_prefix.as_str());
                builder.push_values(chunk, |mut b, row| {
                    for cell in row {
                        match cell {
                            CellValue::Null => b.push_bind(None::<String>),
                            CellValue::Integer(v) => b.push_bind(*v),
                            CellValue::Real(v) => b.push_bind(*v),
                            CellValue::Text(s) => b.push_bind(s.clone()),
                        };
                    }
                });
                builder.build().execute(&mut *tx).await?;
            }
            tx.commit().await
        }
        DatabasePool::MySql(pool) => {
            sqlx::query(&drop).execute(pool).await?;
            sqlx::query(&create).execute(pool).await?;
            if let Err(e) = insert_mysql_rows(pool, table, &insert_prefix).await {
                if let Err(cleanup) = sqlx::query(&drop).execute(pool).await {
                    warn!(table = %table.name, error = %cleanup, "failed to drop partial table");
                }
                return Err(e);
            }
            Ok(())
        }
    }
}

async fn insert_mysql_rows(
    pool: &MySqlPool,
    table: &CsvTable,
    insert_prefix: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for chunk in table.rows.chunks(table.rows_per_batch()) {
        let mut builder = QueryBuilder::<MySql>::new(insert_prefix);
        builder.push_values(chunk, |mut b, row| {
            for cell in row {
                match cell {
                    CellValue::Null => b.push_bind(None::<String>),
                    CellValue::Integer(v) => b.push_bind(*v),
                    CellValue::Real(v) => b.push_bind(*v),
                    CellValue::Text(s) => b.push_bind(s.clone()),
                };
            }
        });
        builder.build().execute(&mut *tx).await?;
    }
    tx.commit().await
}

/// Open (creating if needed) a SQLite file as a load target.
pub async fn open_sqlite_target(path: &Path) -> Result<DatabasePool, LoadError> {
    let descriptor = ConnectionDescriptor::sqlite(path);
    Ok(create_pool(&descriptor, &PoolConfig::writable()).await?)
}

/// Open the configured MySQL server as a load target.
pub async fn open_mysql_target(config: &MysqlConfig) -> Result<DatabasePool, LoadError> {
    let descriptor = ConnectionDescriptor::from_mysql_config(config);
    Ok(create_pool(&descriptor, &PoolConfig::writable()).await?)
}
