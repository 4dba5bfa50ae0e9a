//! Common test utilities for integration tests
//!
//! Provides shared fixtures used across multiple integration test files.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use sqlchat::adapters::llm::{MockChatModelFactory, ScriptedChatModel};
use sqlchat::adapters::sql::{load_directory_into_database, open_sqlite_target};
use sqlchat::domain::models::{AgentConfig, LlmProvider};
use sqlchat::services::AgentFactory;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write the employees/sales CSV fixture into `dir`.
pub fn write_company_csvs(dir: &Path) {
    std::fs::write(
        dir.join("employees.csv"),
        "id,name,dept\n1,Alice,Engineering\n2,Bob,Sales\n3,Carol,Engineering\n",
    )
    .expect("write employees.csv");
    std::fs::write(dir.join("sales.csv"), "id,amount\n1,100.5\n2,250\n")
        .expect("write sales.csv");
}

/// Load the company fixture into a fresh SQLite file and return its URI.
pub async fn company_db(dir: &TempDir) -> String {
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).expect("create data dir");
    write_company_csvs(&data);

    let db_path = dir.path().join("company.db");
    let pool = open_sqlite_target(&db_path).await.expect("open sqlite target");
    load_directory_into_database(&data, &pool)
        .await
        .expect("load fixture");
    pool.close().await;

    sqlite_uri(&db_path)
}

pub fn sqlite_uri(path: &Path) -> String {
    format!("sqlite:///{}", path.display())
}

/// Agent factory backed by a scripted model shared across sessions.
pub fn scripted_factory(
    model: Arc<ScriptedChatModel>,
    unavailable: &[LlmProvider],
) -> (AgentFactory, Arc<MockChatModelFactory>) {
    let mut models = MockChatModelFactory::new(model);
    for provider in unavailable {
        models = models.without(*provider);
    }
    let models = Arc::new(models);
    let factory = AgentFactory::new(models.clone(), AgentConfig::default());
    (factory, models)
}
