//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `relstore_core` wiring end to
//!   end against an in-memory database.
//! - Keep output deterministic for quick local sanity checks.

use relstore_core::{Condition, DbManager, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conn = relstore_core::open_db_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, title TEXT, sort INTEGER);",
    )?;

    let mut manager = DbManager::new(conn);
    manager.register("item", "items");
    let items = manager.get("item")?;

    items.insert_many(&[
        vec![
            ("title".to_string(), Value::Text("alpha".to_string())),
            ("sort".to_string(), Value::Integer(1)),
        ],
        vec![
            ("title".to_string(), Value::Text("beta".to_string())),
            ("sort".to_string(), Value::Integer(2)),
        ],
    ])?;
    items.swap_sort(1, 2)?;

    let matching = items.fetch_all_ids_by_conditions(Some(
        &Condition::new().where_in("title", vec!["alpha".to_string(), "beta".to_string()]),
    ))?;

    println!("relstore_core version={}", relstore_core::core_version());
    println!("items={}", items.fetch_count("", &[])?);
    println!("matching_ids={matching:?}");
    println!("sort_of_first={:?}", items.fetch_sort(1)?);
    Ok(())
}
