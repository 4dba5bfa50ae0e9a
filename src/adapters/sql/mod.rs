//! SQL database adapters for SQLite and MySQL.

pub mod connection;
pub mod database;
pub mod loader;

pub use connection::{create_pool, ConnectionError, DatabasePool, PoolConfig};
pub use database::{quote_identifier, SqlxDatabase};
pub use loader::{
    find_csv_files, load_directory_into_database, open_mysql_target, open_sqlite_target,
    LoadError, LoadOutcome, LoadReport,
};
