use rusqlite::Connection;
use swimboard_core::db::migrations::latest_version;
use swimboard_core::db::{open_db, open_db_in_memory};
use swimboard_core::{
    BoardConfig, BoardService, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore,
    StorageError,
};

#[test]
fn set_get_overwrite_and_remove() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();

    assert_eq!(store.get_item("tasks").unwrap(), None);

    store.set_item("tasks", "{\"tasks\":{}}").unwrap();
    store.set_item("tasks", "{\"tasks\":{},\"tasksByStatus\":{}}").unwrap();
    store.set_item("swimLanes", "[]").unwrap();

    assert_eq!(
        store.get_item("tasks").unwrap().as_deref(),
        Some("{\"tasks\":{},\"tasksByStatus\":{}}")
    );
    assert_eq!(store.keys().unwrap(), vec!["swimLanes", "tasks"]);

    store.remove_item("tasks").unwrap();
    store.remove_item("tasks").unwrap();
    assert_eq!(store.get_item("tasks").unwrap(), None);
}

#[test]
fn entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store.set_item("swimLanes", "[{\"id\":\"todo\"}]").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();
    assert_eq!(
        store.get_item("swimLanes").unwrap().as_deref(),
        Some("[{\"id\":\"todo\"}]")
    );
}

#[test]
fn rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteKeyValueStore::try_new(&conn) {
        Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn rejects_connection_without_kv_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteKeyValueStore::try_new(&conn),
        Err(StorageError::MissingRequiredTable("kv_entries"))
    ));
}

#[test]
fn rejects_connection_missing_kv_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE kv_entries (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteKeyValueStore::try_new(&conn),
        Err(StorageError::MissingRequiredColumn {
            table: "kv_entries",
            column: "updated_at"
        })
    ));
}

#[test]
fn board_loaded_from_snapshot_leaves_database_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let conn = open_db(&path).unwrap();
    let storage = SqliteKeyValueStore::try_new(&conn).unwrap();
    let config = BoardConfig::default();

    let snapshot = MemoryKeyValueStore::snapshot_of(
        &storage,
        &[config.tasks_key.as_str(), config.lanes_key.as_str()],
    )
    .unwrap();
    let board = BoardService::load(snapshot, config).unwrap();

    assert_eq!(board.lanes().len(), 3);
    assert!(storage.keys().unwrap().is_empty());
}
