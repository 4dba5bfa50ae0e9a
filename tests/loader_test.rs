//! CSV loader tests against real SQLite files.

mod common;

use sqlx::Row;

use sqlchat::adapters::sql::{
    load_directory_into_database, open_sqlite_target, DatabasePool, LoadOutcome,
};

async fn table_names(pool: &DatabasePool) -> Vec<String> {
    let DatabasePool::Sqlite(pool) = pool else {
        panic!("expected sqlite pool");
    };
    sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

async fn count(pool: &DatabasePool, table: &str) -> i64 {
    let DatabasePool::Sqlite(pool) = pool else {
        panic!("expected sqlite pool");
    };
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM \"{table}\""))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Every row of `table`, in rowid order, with cells joined by `|`.
async fn contents(pool: &DatabasePool, table: &str) -> Vec<String> {
    let DatabasePool::Sqlite(pool) = pool else {
        panic!("expected sqlite pool");
    };
    let columns: Vec<String> =
        sqlx::query_scalar::<_, String>(&format!("SELECT name FROM pragma_table_info('{table}')"))
            .fetch_all(pool)
            .await
            .unwrap();
    let joined = columns
        .iter()
        .map(|c| format!("COALESCE(CAST(\"{c}\" AS TEXT), '')"))
        .collect::<Vec<_>>()
        .join(" || '|' || ");
    sqlx::query_scalar::<_, String>(&format!(
        "SELECT {joined} FROM \"{table}\" ORDER BY rowid"
    ))
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_employees_and_sales_become_tables() {
    let dir = common::temp_dir();
    common::write_company_csvs(dir.path());
    let pool = open_sqlite_target(&dir.path().join("mydata.db")).await.unwrap();

    let report = load_directory_into_database(dir.path(), &pool).await.unwrap();

    assert_eq!(report.loaded_tables(), vec!["employees", "sales"]);
    assert!(report.failures().is_empty());
    assert_eq!(table_names(&pool).await, vec!["employees", "sales"]);
    assert_eq!(count(&pool, "employees").await, 3);
    assert_eq!(count(&pool, "sales").await, 2);
}

#[tokio::test]
async fn test_column_types_are_inferred() {
    let dir = common::temp_dir();
    common::write_company_csvs(dir.path());
    let pool = open_sqlite_target(&dir.path().join("types.db")).await.unwrap();
    load_directory_into_database(dir.path(), &pool).await.unwrap();

    let DatabasePool::Sqlite(sqlite) = &pool else {
        panic!("expected sqlite pool");
    };
    let types: Vec<(String, String)> = sqlx::query("SELECT name, type FROM pragma_table_info('sales')")
        .fetch_all(sqlite)
        .await
        .unwrap()
        .iter()
        .map(|r| (r.get("name"), r.get("type")))
        .collect();
    assert_eq!(
        types,
        vec![
            ("id".to_string(), "INTEGER".to_string()),
            ("amount".to_string(), "REAL".to_string()),
        ]
    );

    let total: f64 = sqlx::query_scalar("SELECT SUM(amount) FROM sales")
        .fetch_one(sqlite)
        .await
        .unwrap();
    assert!((total - 350.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_loading_twice_replaces_tables() {
    let dir = common::temp_dir();
    common::write_company_csvs(dir.path());
    let pool = open_sqlite_target(&dir.path().join("twice.db")).await.unwrap();

    load_directory_into_database(dir.path(), &pool).await.unwrap();
    let first_employees = contents(&pool, "employees").await;
    let first_sales = contents(&pool, "sales").await;

    load_directory_into_database(dir.path(), &pool).await.unwrap();

    assert_eq!(table_names(&pool).await, vec!["employees", "sales"]);
    assert_eq!(contents(&pool, "employees").await, first_employees);
    assert_eq!(contents(&pool, "sales").await, first_sales);
    assert_eq!(
        first_employees,
        vec![
            "1|Alice|Engineering".to_string(),
            "2|Bob|Sales".to_string(),
            "3|Carol|Engineering".to_string(),
        ]
    );
    assert_eq!(first_sales, vec!["1|100.5".to_string(), "2|250.0".to_string()]);
}

#[tokio::test]
async fn test_empty_directory_loads_nothing() {
    let dir = common::temp_dir();
    std::fs::write(dir.path().join("readme.txt"), "not a csv").unwrap();
    let pool = open_sqlite_target(&dir.path().join("empty.db")).await.unwrap();

    let report = load_directory_into_database(dir.path(), &pool).await.unwrap();

    assert!(report.is_empty());
    assert!(table_names(&pool).await.is_empty());
}

#[tokio::test]
async fn test_missing_directory_is_not_an_error() {
    let dir = common::temp_dir();
    let pool = open_sqlite_target(&dir.path().join("missing.db")).await.unwrap();

    let report = load_directory_into_database(&dir.path().join("nope"), &pool)
        .await
        .unwrap();

    assert!(report.is_empty());
}

#[tokio::test]
async fn test_bad_file_does_not_stop_the_batch() {
    let dir = common::temp_dir();
    common::write_company_csvs(dir.path());
    // A row wider than its header cannot be placed in any column.
    std::fs::write(dir.path().join("broken.csv"), "a,b\n1,2\n3,4,5\n").unwrap();
    let pool = open_sqlite_target(&dir.path().join("partial.db")).await.unwrap();

    let report = load_directory_into_database(dir.path(), &pool).await.unwrap();

    assert_eq!(report.loaded_tables(), vec!["employees", "sales"]);
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        LoadOutcome::Failed { table, .. } if table == "broken"
    ));
    assert_eq!(table_names(&pool).await, vec!["employees", "sales"]);
}

#[tokio::test]
async fn test_empty_cells_are_null() {
    let dir = common::temp_dir();
    std::fs::write(dir.path().join("people.csv"), "id,nickname\n1,\n2,Bo\n").unwrap();
    let pool = open_sqlite_target(&dir.path().join("nulls.db")).await.unwrap();
    load_directory_into_database(dir.path(), &pool).await.unwrap();

    let DatabasePool::Sqlite(sqlite) = &pool else {
        panic!("expected sqlite pool");
    };
    let nulls: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people WHERE nickname IS NULL")
        .fetch_one(sqlite)
        .await
        .unwrap();
    assert_eq!(nulls, 1);
}

#[tokio::test]
async fn test_short_rows_load_with_nulls() {
    let dir = common::temp_dir();
    std::fs::write(
        dir.path().join("people.csv"),
        "id,name,dept\n1,Ann,Eng\n2,Bob\n",
    )
    .unwrap();
    let pool = open_sqlite_target(&dir.path().join("short.db")).await.unwrap();

    let report = load_directory_into_database(dir.path(), &pool).await.unwrap();

    assert_eq!(report.loaded_tables(), vec!["people"]);
    assert_eq!(
        contents(&pool, "people").await,
        vec!["1|Ann|Eng".to_string(), "2|Bob|".to_string()]
    );
}

#[tokio::test]
async fn test_repeated_headers_get_suffixes() {
    let dir = common::temp_dir();
    std::fs::write(dir.path().join("dup.csv"), "id,value,value\n1,a,b\n").unwrap();
    let pool = open_sqlite_target(&dir.path().join("dup.db")).await.unwrap();

    let report = load_directory_into_database(dir.path(), &pool).await.unwrap();
    assert_eq!(report.loaded_tables(), vec!["dup"]);

    let DatabasePool::Sqlite(sqlite) = &pool else {
        panic!("expected sqlite pool");
    };
    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('dup') ORDER BY cid")
            .fetch_all(sqlite)
            .await
            .unwrap();
    assert_eq!(columns, vec!["id", "value", "value.1"]);
    assert_eq!(contents(&pool, "dup").await, vec!["1|a|b".to_string()]);
}
