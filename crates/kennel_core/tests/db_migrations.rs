use kennel_core::db::migrations::latest_version;
use kennel_core::db::{open_db, open_db_in_memory};
use kennel_core::{KeyValueStore, SqliteStore, StoreError};
use rusqlite::Connection;

#[test]
fn in_memory_database_gets_key_value_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
    assert_table_exists(&conn, "kv_set_members");
}

#[test]
fn reopening_a_file_database_keeps_its_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("kennel.sqlite3");

    let store = SqliteStore::open(&path).unwrap();
    store.set("smallKennels", "[]").unwrap();
    store.add_to_set("dogTrainer:clients", "c-1").unwrap();
    drop(store);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let reopened = SqliteStore::from_connection(conn);
    assert_eq!(reopened.get("smallKennels").unwrap().as_deref(), Some("[]"));
    assert_eq!(
        reopened.list_set_members("dogTrainer:clients").unwrap(),
        vec!["c-1".to_string()]
    );
}

#[test]
fn corrupt_database_file_is_a_sqlite_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.sqlite3");
    std::fs::write(&path, b"definitely not a sqlite database file, just text padding").unwrap();

    assert!(matches!(open_db(&path), Err(StoreError::Sqlite(_))));
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(matches!(
        SqliteStore::open(&path),
        Err(StoreError::UnsupportedSchemaVersion { .. })
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table {table_name} to exist");
}
