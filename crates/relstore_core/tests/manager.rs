use relstore_core::{
    open_db_in_memory, Condition, DbConfig, DbManager, ManagerError, RepoError, Value,
};
use std::rc::Rc;

fn manager_with_items() -> DbManager {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, title TEXT, sort INTEGER);",
    )
    .unwrap();
    let mut manager = DbManager::new(conn);
    manager.register("item", "items");
    manager
}

#[test]
fn get_creates_once_and_caches_by_name() {
    let mut manager = manager_with_items();

    let first = manager.get("item").unwrap();
    let second = manager.get("item").unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn unregistered_names_are_rejected() {
    let mut manager = manager_with_items();
    let err = manager.get("ghost").unwrap_err();
    assert!(matches!(err, ManagerError::UnknownRepository(name) if name == "ghost"));
}

#[test]
fn registered_name_with_missing_table_surfaces_schema_error() {
    let mut manager = manager_with_items();
    manager.register("order", "orders");

    let err = manager.get("order").unwrap_err();
    assert!(matches!(err, ManagerError::Repo(RepoError::Schema(_))));
}

#[test]
fn last_insert_id_tracks_the_most_recent_insert() {
    let mut manager = manager_with_items();
    let items = manager.get("item").unwrap();

    items
        .insert(&[("title".to_string(), Value::Text("a".to_string()))])
        .unwrap();
    assert_eq!(manager.last_insert_id(), 1);

    items
        .insert(&[("title".to_string(), Value::Text("b".to_string()))])
        .unwrap();
    assert_eq!(manager.last_insert_id(), 2);
}

#[test]
fn rollback_discards_writes_made_inside_the_transaction() {
    let mut manager = manager_with_items();
    let items = manager.get("item").unwrap();

    assert!(!manager.in_transaction());
    manager.begin().unwrap();
    assert!(manager.in_transaction());

    items
        .insert(&[("title".to_string(), Value::Text("ephemeral".to_string()))])
        .unwrap();
    manager.rollback().unwrap();

    assert!(!manager.in_transaction());
    assert_eq!(items.fetch_count("", &[]).unwrap(), 0);
}

#[test]
fn commit_keeps_writes_made_inside_the_transaction() {
    let mut manager = manager_with_items();
    let items = manager.get("item").unwrap();

    manager.begin().unwrap();
    items
        .insert(&[("title".to_string(), Value::Text("durable".to_string()))])
        .unwrap();
    manager.commit().unwrap();

    assert!(!manager.in_transaction());
    assert_eq!(items.fetch_count("", &[]).unwrap(), 1);
}

#[test]
fn repositories_stay_usable_after_the_manager_is_dropped() {
    let mut manager = manager_with_items();
    let items = manager.get("item").unwrap();
    drop(manager);

    items
        .insert(&[("title".to_string(), Value::Text("still here".to_string()))])
        .unwrap();
    assert_eq!(
        items
            .fetch_id_by_conditions(Some(
                &Condition::new().where_eq("title", "still here".to_string())
            ))
            .unwrap(),
        Some(1)
    );
}

#[test]
fn from_config_opens_a_usable_in_memory_store() {
    let mut manager = DbManager::from_config(&DbConfig::in_memory()).unwrap();
    manager.register("note", "notes");

    // No tables exist in a fresh in-memory database.
    let err = manager.get("note").unwrap_err();
    assert!(matches!(err, ManagerError::Repo(RepoError::Schema(_))));
}
