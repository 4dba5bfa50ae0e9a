//! `sqlchat prep`: load CSV files into SQLite or MySQL.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::adapters::sql::{
    load_directory_into_database, open_mysql_target, open_sqlite_target,
};
use crate::cli::output::output;
use crate::cli::types::PrepCommands;
use crate::domain::models::Config;

/// Load a CSV directory into the chosen target.
pub async fn execute(command: PrepCommands, config: Config, json: bool) -> Result<()> {
    match command {
        PrepCommands::Sqlite { data_dir, output } => {
            let data_dir = data_dir.unwrap_or_else(|| PathBuf::from(&config.loader.data_dir));
            let target = output.unwrap_or_else(|| PathBuf::from(&config.loader.sqlite_path));
            handle_sqlite(data_dir, target, json).await
        }
        PrepCommands::Mysql { data_dir } => {
            let data_dir = data_dir.unwrap_or_else(|| PathBuf::from(&config.loader.data_dir));
            handle_mysql(data_dir, &config, json).await
        }
    }
}

async fn handle_sqlite(data_dir: PathBuf, target: PathBuf, json: bool) -> Result<()> {
    let pool = open_sqlite_target(&target)
        .await
        .with_context(|| format!("Failed to open SQLite file {}", target.display()))?;

    let result = load_directory_into_database(&data_dir, &pool).await;
    pool.close().await;
    let report = result.context("Failed to load CSV files")?;

    output(&report, json);
    Ok(())
}

async fn handle_mysql(data_dir: PathBuf, config: &Config, json: bool) -> Result<()> {
    let pool = open_mysql_target(&config.mysql).await.with_context(|| {
        format!(
            "Failed to connect to MySQL at {}:{}/{}",
            config.mysql.host, config.mysql.port, config.mysql.database
        )
    })?;

    let result = load_directory_into_database(&data_dir, &pool).await;
    pool.close().await;
    let report = result.context("Failed to load CSV files")?;

    output(&report, json);
    Ok(())
}
