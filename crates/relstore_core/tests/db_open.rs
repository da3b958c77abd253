use relstore_core::{
    open_db, open_db_in_memory, open_with_config, table_columns, DbConfig, JournalMode,
};

#[test]
fn in_memory_open_applies_foreign_keys_pragma() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn foreign_keys_can_be_disabled_through_config() {
    let config = DbConfig {
        foreign_keys: false,
        ..DbConfig::default()
    };
    let conn = open_with_config(&config).unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 0);
}

#[test]
fn file_backed_databases_persist_across_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relstore.db");

    {
        let conn = open_db(&path).unwrap();
        conn.execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, title TEXT);")
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let columns = table_columns(&conn, "items").unwrap();
    assert_eq!(columns, vec!["id", "title"]);
}

#[test]
fn wal_journal_mode_applies_to_file_databases() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DbConfig::for_path(dir.path().join("wal.db"));
    config.journal_mode = JournalMode::Wal;

    let conn = open_with_config(&config).unwrap();
    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");
}

#[test]
fn config_deserializes_with_defaults_for_missing_fields() {
    let config: DbConfig =
        serde_json::from_str(r#"{"path":"/tmp/configured.db","journal_mode":"wal"}"#).unwrap();

    assert_eq!(config.path.as_deref().unwrap().to_str(), Some("/tmp/configured.db"));
    assert_eq!(config.journal_mode, JournalMode::Wal);
    assert_eq!(config.busy_timeout_ms, DbConfig::default().busy_timeout_ms);
    assert!(config.foreign_keys);
}

#[test]
fn config_round_trips_through_json() {
    let config = DbConfig::default();
    let encoded = serde_json::to_string(&config).unwrap();
    let decoded: DbConfig = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, config);
}
