//! Database connection pool management for SQLite and MySQL targets.

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Executor;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::models::{ConnectionDescriptor, Dialect};

/// Errors opening a connection pool.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The server or file could not be opened.
    #[error("Failed to connect to {target}: {source}")]
    ConnectFailed {
        /// Redacted connection target.
        target: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },
    /// The parent directory of a SQLite file could not be created.
    #[error("Failed to create directory: {0}")]
    DirectoryCreationFailed(#[source] std::io::Error),
}

impl From<ConnectionError> for DomainError {
    fn from(err: ConnectionError) -> Self {
        Self::Connection(err.to_string())
    }
}

/// Pool settings.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,
    /// Open the database without write access.
    pub read_only: bool,
    /// Create a missing SQLite file (and its parent directory).
    pub create_if_missing: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            read_only: false,
            create_if_missing: false,
        }
    }
}

impl PoolConfig {
    /// Settings for agent sessions: read-only, never creates files.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Settings for loaders: writable, creates the SQLite file if needed.
    pub fn writable() -> Self {
        Self {
            create_if_missing: true,
            ..Self::default()
        }
    }
}

/// A connection pool for one of the supported engines.
#[derive(Debug, Clone)]
pub enum DatabasePool {
    /// Embedded SQLite file.
    Sqlite(SqlitePool),
    /// MySQL server.
    MySql(MySqlPool),
}

impl DatabasePool {
    /// SQL dialect of the pool.
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::Sqlite(_) => Dialect::Sqlite,
            Self::MySql(_) => Dialect::MySql,
        }
    }

    /// Close every connection in the pool.
    pub async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::MySql(pool) => pool.close().await,
        }
    }
}

/// Open a pool for `descriptor`.
pub async fn create_pool(
    descriptor: &ConnectionDescriptor,
    config: &PoolConfig,
) -> Result<DatabasePool, ConnectionError> {
    let connect_err = |source| ConnectionError::ConnectFailed {
        target: descriptor.redacted(),
        source,
    };

    match descriptor {
        ConnectionDescriptor::Sqlite { path } => {
            if config.create_if_missing {
                ensure_database_directory(path)?;
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(config.create_if_missing && !config.read_only)
                .read_only(config.read_only)
                .busy_timeout(Duration::from_secs(30));

            // Every connection to `:memory:` is a separate database.
            let max_connections = if descriptor.is_in_memory() {
                1
            } else {
                config.max_connections
            };

            let pool = SqlitePoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(config.acquire_timeout)
                .connect_with(options)
                .await
                .map_err(connect_err)?;

            Ok(DatabasePool::Sqlite(pool))
        }
        ConnectionDescriptor::MySql {
            host,
            port,
            user,
            password,
            database,
        } => {
            let mut options = MySqlConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .database(database);
            if !password.is_empty() {
                options = options.password(password);
            }

            let mut pool_options = MySqlPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.acquire_timeout);

            if config.read_only {
                pool_options = pool_options.after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                        Ok(())
                    })
                });
            }

            let pool = pool_options
                .connect_with(options)
                .await
                .map_err(connect_err)?;

            Ok(DatabasePool::MySql(pool))
        }
    }
}

fn ensure_database_directory(path: &Path) -> Result<(), ConnectionError> {
    if path.as_os_str() == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(ConnectionError::DirectoryCreationFailed)?;
        }
    }
    Ok(())
}
