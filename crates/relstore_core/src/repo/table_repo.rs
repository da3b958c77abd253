//! Generic table repository over one shared connection.
//!
//! # Responsibility
//! - Provide CRUD primitives bound to a single table.
//! - Validate every referenced column against the cached schema before any
//!   statement is built.
//!
//! # Invariants
//! - The column cache is populated exactly once at construction.
//! - A validation failure leaves the database untouched; no partially-built
//!   statement is ever sent.
//! - Batch ids are typed integers, so literal id interpolation cannot carry
//!   anything but well-formed integers.

use crate::query::condition::{translate, Condition, Params};
use crate::repo::{RepoError, RepoResult};
use crate::schema;
use rusqlite::types::Value;
use rusqlite::{Row, ToSql};
use std::collections::BTreeMap;
use std::rc::Rc;

/// One fetched row: column name to driver value, independent of any
/// compile-time record model.
pub type TableRow = BTreeMap<String, Value>;

/// Repository bound to exactly one table.
///
/// Holds a shared handle on the connection owned by the manager; dropping
/// the repository never closes the connection.
#[derive(Debug)]
pub struct TableRepository {
    conn: Rc<rusqlite::Connection>,
    table: String,
    columns: Vec<String>,
}

impl TableRepository {
    /// Builds a repository for `table`, introspecting its columns once.
    ///
    /// # Errors
    /// - [`RepoError::Schema`] when the table name is invalid or the table
    ///   does not exist.
    pub fn try_new(conn: Rc<rusqlite::Connection>, table: impl Into<String>) -> RepoResult<Self> {
        let table = table.into();
        let columns = schema::table_columns(conn.as_ref(), &table)?;
        Ok(Self {
            conn,
            table,
            columns,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Column names in declared order, as introspected at construction.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|candidate| candidate == column)
    }

    pub(crate) fn require_column(&self, column: &'static str) -> RepoResult<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(RepoError::MissingColumn(column))
        }
    }

    pub(crate) fn validate_columns<'a>(
        &self,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> RepoResult<()> {
        for column in columns {
            if !self.has_column(column) {
                return Err(RepoError::InvalidColumn(column.to_string()));
            }
        }
        Ok(())
    }

    // ---- execute-with-binding primitives -------------------------------

    /// Executes one statement with named parameters, returning the changed
    /// row count.
    pub fn execute(&self, sql: &str, params: &[(String, Value)]) -> RepoResult<usize> {
        let mut stmt = self.conn.prepare(sql)?;
        let changed = stmt.execute(&as_named_params(params)[..])?;
        Ok(changed)
    }

    /// Runs a query and returns the first row, if any.
    pub fn fetch_one(&self, sql: &str, params: &[(String, Value)]) -> RepoResult<Option<TableRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names = column_names(&stmt);
        let mut rows = stmt.query(&as_named_params(params)[..])?;
        match rows.next()? {
            Some(row) => Ok(Some(read_row(&names, row)?)),
            None => Ok(None),
        }
    }

    /// Runs a query and returns every row.
    pub fn fetch_rows(&self, sql: &str, params: &[(String, Value)]) -> RepoResult<Vec<TableRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names = column_names(&stmt);
        let mut rows = stmt.query(&as_named_params(params)[..])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(read_row(&names, row)?);
        }
        Ok(records)
    }

    /// Runs a query and returns the first column of every row.
    pub fn fetch_column(&self, sql: &str, params: &[(String, Value)]) -> RepoResult<Vec<Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(&as_named_params(params)[..])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get::<_, Value>(0)?);
        }
        Ok(values)
    }

    /// Runs a query and returns the first column of the first row, if any.
    pub fn fetch_scalar(
        &self,
        sql: &str,
        params: &[(String, Value)],
    ) -> RepoResult<Option<Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(&as_named_params(params)[..])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get::<_, Value>(0)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn fetch_i64(&self, sql: &str, params: &[(String, Value)]) -> RepoResult<i64> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(&as_named_params(params)[..])?;
        match rows.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Err(RepoError::InvalidData(
                "expected a single-row scalar result".to_string(),
            )),
        }
    }

    pub(crate) fn fetch_optional_i64(
        &self,
        sql: &str,
        params: &[(String, Value)],
    ) -> RepoResult<Option<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(&as_named_params(params)[..])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn fetch_i64_column(
        &self,
        sql: &str,
        params: &[(String, Value)],
    ) -> RepoResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(&as_named_params(params)[..])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get(0)?);
        }
        Ok(values)
    }

    // ---- writes --------------------------------------------------------

    /// Inserts one row.
    ///
    /// # Errors
    /// - [`RepoError::InvalidArgument`] on empty input.
    /// - [`RepoError::InvalidColumn`] when any key is not a table column.
    pub fn insert(&self, values: &[(String, Value)]) -> RepoResult<()> {
        if values.is_empty() {
            return Err(RepoError::InvalidArgument(
                "insert requires at least one column".to_string(),
            ));
        }
        self.validate_columns(values.iter().map(|(column, _)| column.as_str()))?;

        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        let mut params: Params = Vec::with_capacity(values.len());
        for (column, value) in values {
            columns.push(column.as_str());
            let placeholder = format!(":{column}");
            placeholders.push(placeholder.clone());
            params.push((placeholder, value.clone()));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );
        self.execute(&sql, &params)?;
        Ok(())
    }

    /// Inserts several rows in one statement.
    ///
    /// The column list is derived from the first row; placeholders carry a
    /// per-row suffix (`:col0`, `:col1`, ...) so bindings never collide
    /// across rows. The whole batch is validated before any SQL is built.
    pub fn insert_many(&self, rows: &[Vec<(String, Value)>]) -> RepoResult<()> {
        if rows.is_empty() {
            return Err(RepoError::InvalidArgument(
                "insert_many requires at least one row".to_string(),
            ));
        }
        for row in rows {
            self.validate_columns(row.iter().map(|(column, _)| column.as_str()))?;
        }

        let columns: Vec<&str> = rows[0].iter().map(|(column, _)| column.as_str()).collect();
        let mut groups = Vec::with_capacity(rows.len());
        let mut params: Params = Vec::new();
        for (row_index, row) in rows.iter().enumerate() {
            let mut placeholders = Vec::with_capacity(row.len());
            for (column, value) in row {
                let placeholder = format!(":{column}{row_index}");
                placeholders.push(placeholder.clone());
                params.push((placeholder, value.clone()));
            }
            groups.push(format!("({})", placeholders.join(",")));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            columns.join(", "),
            groups.join(",")
        );
        self.execute(&sql, &params)?;
        Ok(())
    }

    /// Updates one row by id, with optional extra WHERE predicates.
    ///
    /// An `id` key in `values` is silently stripped; `id=:id` is always
    /// appended to the WHERE clause after `extra_wheres`.
    pub fn update_by_id(
        &self,
        id: i64,
        values: &[(String, Value)],
        extra_wheres: &[String],
        extra_params: &[(String, Value)],
    ) -> RepoResult<()> {
        self.require_column("id")?;
        let values = strip_id(values);
        if values.is_empty() {
            return Err(RepoError::InvalidArgument(
                "update_by_id requires at least one non-id column".to_string(),
            ));
        }
        let (sets, mut set_params) = self.update_sets_params(&values)?;

        let mut wheres: Vec<String> = extra_wheres.to_vec();
        wheres.push("id=:id".to_string());
        let mut params: Params = extra_params.to_vec();
        params.push((":id".to_string(), Value::Integer(id)));
        params.append(&mut set_params);

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            sets,
            wheres.join(" AND ")
        );
        self.execute(&sql, &params)?;
        Ok(())
    }

    /// Updates every listed row in one statement.
    ///
    /// Ids are typed integers and are interpolated literally into the IN
    /// list, exactly like [`TableRepository::delete_by_ids`].
    pub fn update_by_ids(&self, ids: &[i64], values: &[(String, Value)]) -> RepoResult<()> {
        self.require_column("id")?;
        let values = strip_id(values);
        if ids.is_empty() || values.is_empty() {
            return Err(RepoError::InvalidArgument(
                "update_by_ids requires ids and at least one non-id column".to_string(),
            ));
        }
        let (sets, params) = self.update_sets_params(&values)?;

        let sql = format!(
            "UPDATE {} SET {} WHERE id IN({})",
            self.table,
            sets,
            join_ids(ids)
        );
        self.execute(&sql, &params)?;
        Ok(())
    }

    /// Updates rows matched by caller-supplied WHERE predicates.
    pub fn update_where(
        &self,
        values: &[(String, Value)],
        wheres: &[String],
        params: &[(String, Value)],
    ) -> RepoResult<()> {
        if values.is_empty() || wheres.is_empty() || params.is_empty() {
            return Err(RepoError::InvalidArgument(
                "update_where requires values, wheres and params".to_string(),
            ));
        }
        let (sets, mut set_params) = self.update_sets_params(values)?;

        let mut all_params: Params = params.to_vec();
        all_params.append(&mut set_params);

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            sets,
            wheres.join(" AND ")
        );
        self.execute(&sql, &all_params)?;
        Ok(())
    }

    fn update_sets_params(&self, values: &[(String, Value)]) -> RepoResult<(String, Params)> {
        self.validate_columns(values.iter().map(|(column, _)| column.as_str()))?;

        let mut sets = Vec::with_capacity(values.len());
        let mut params: Params = Vec::with_capacity(values.len());
        for (column, value) in values {
            sets.push(format!("{column}=:{column}"));
            params.push((format!(":{column}"), value.clone()));
        }
        if params.is_empty() {
            return Err(RepoError::InvalidArgument(
                "no updatable columns".to_string(),
            ));
        }
        Ok((sets.join(", "), params))
    }

    /// Deletes one row by id. A missing id is a no-op, not an error.
    pub fn delete(&self, id: i64) -> RepoResult<()> {
        if self.fetch_by_id(id)?.is_none() {
            return Ok(());
        }
        let sql = format!("DELETE FROM {} WHERE id=:id", self.table);
        self.execute(&sql, &[(":id".to_string(), Value::Integer(id))])?;
        Ok(())
    }

    /// Deletes every listed row in one statement.
    pub fn delete_by_ids(&self, ids: &[i64]) -> RepoResult<()> {
        self.require_column("id")?;
        if ids.is_empty() {
            return Err(RepoError::InvalidArgument(
                "delete_by_ids requires at least one id".to_string(),
            ));
        }
        let sql = format!("DELETE FROM {} WHERE id IN({})", self.table, join_ids(ids));
        self.execute(&sql, &[])?;
        Ok(())
    }

    /// Deletes every row in the table.
    pub fn truncate(&self) -> RepoResult<()> {
        self.execute(&format!("DELETE FROM {}", self.table), &[])?;
        Ok(())
    }

    // ---- reads ---------------------------------------------------------

    /// Fetches one row by primary key.
    pub fn fetch_by_id(&self, id: i64) -> RepoResult<Option<TableRow>> {
        self.require_column("id")?;
        let sql = format!("SELECT * FROM {} WHERE id=:id", self.table);
        self.fetch_one(&sql, &[(":id".to_string(), Value::Integer(id))])
    }

    /// Fetches every row in the table.
    pub fn fetch_all(&self) -> RepoResult<Vec<TableRow>> {
        self.fetch_rows(&format!("SELECT * FROM {}", self.table), &[])
    }

    /// Row count, with an optional full `WHERE ...` clause.
    pub fn fetch_count(&self, where_clause: &str, params: &[(String, Value)]) -> RepoResult<i64> {
        self.require_column("id")?;
        let sql = if where_clause.is_empty() {
            format!("SELECT COUNT(id) FROM {}", self.table)
        } else {
            format!("SELECT COUNT(id) FROM {} {}", self.table, where_clause)
        };
        self.fetch_i64(&sql, params)
    }

    /// Row count for one `column = value` predicate.
    pub fn fetch_count_by_column(&self, column: &str, value: Value) -> RepoResult<i64> {
        self.require_column("id")?;
        self.validate_columns([column])?;
        let sql = format!(
            "SELECT COUNT(id) FROM {} WHERE {column} = :column",
            self.table
        );
        self.fetch_i64(&sql, &[(":column".to_string(), value)])
    }

    /// Every id in the table, in storage order.
    pub fn fetch_all_ids(&self) -> RepoResult<Vec<i64>> {
        self.require_column("id")?;
        self.fetch_i64_column(&format!("SELECT id FROM {}", self.table), &[])
    }

    /// The row with the highest id, if any.
    pub fn fetch_latest(&self) -> RepoResult<Option<TableRow>> {
        self.require_column("id")?;
        let sql = format!("SELECT * FROM {} ORDER BY id DESC LIMIT 1", self.table);
        self.fetch_one(&sql, &[])
    }

    /// The highest id, if any.
    pub fn fetch_latest_id(&self) -> RepoResult<Option<i64>> {
        self.require_column("id")?;
        let sql = format!("SELECT id FROM {} ORDER BY id DESC LIMIT 1", self.table);
        self.fetch_optional_i64(&sql, &[])
    }

    /// The row with the lowest id, if any.
    pub fn fetch_oldest(&self) -> RepoResult<Option<TableRow>> {
        self.require_column("id")?;
        let sql = format!("SELECT * FROM {} ORDER BY id ASC LIMIT 1", self.table);
        self.fetch_one(&sql, &[])
    }

    /// The earliest `created` value, if any rows exist.
    pub fn fetch_oldest_created(&self) -> RepoResult<Option<Value>> {
        self.require_column("created")?;
        let sql = format!(
            "SELECT created FROM {} ORDER BY created ASC LIMIT 1",
            self.table
        );
        self.fetch_scalar(&sql, &[])
    }

    /// The latest `created` value, if any rows exist.
    pub fn fetch_latest_created(&self) -> RepoResult<Option<Value>> {
        self.require_column("created")?;
        let sql = format!(
            "SELECT created FROM {} ORDER BY created DESC LIMIT 1",
            self.table
        );
        self.fetch_scalar(&sql, &[])
    }

    /// One random id, if any rows exist.
    pub fn fetch_random_id(&self) -> RepoResult<Option<i64>> {
        self.require_column("id")?;
        let sql = format!("SELECT id FROM {} ORDER BY RANDOM() LIMIT 1", self.table);
        self.fetch_optional_i64(&sql, &[])
    }

    /// Up to `count` random ids.
    pub fn fetch_all_random_ids(&self, count: u64) -> RepoResult<Vec<i64>> {
        self.require_column("id")?;
        let sql = format!(
            "SELECT id FROM {} ORDER BY RANDOM() LIMIT {count}",
            self.table
        );
        self.fetch_i64_column(&sql, &[])
    }

    /// Up to `count` random rows, optionally filtered.
    pub fn fetch_all_random_rows(
        &self,
        count: u64,
        wheres: &[String],
        params: &[(String, Value)],
    ) -> RepoResult<Vec<TableRow>> {
        let where_sql = if wheres.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", wheres.join(" AND "))
        };
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY RANDOM() LIMIT {count}",
            self.table, where_sql
        );
        self.fetch_rows(&sql, params)
    }

    /// `title` of one row, if the row exists.
    pub fn fetch_title(&self, id: i64) -> RepoResult<Option<Value>> {
        self.require_column("title")?;
        let sql = format!("SELECT title FROM {} WHERE id=:id", self.table);
        self.fetch_scalar(&sql, &[(":id".to_string(), Value::Integer(id))])
    }

    // ---- condition-driven reads ----------------------------------------

    /// First id matching the condition.
    ///
    /// `None` as the condition is the "nothing to ask" signal: the call
    /// returns `Ok(None)` without executing any query.
    pub fn fetch_id_by_conditions(&self, condition: Option<&Condition>) -> RepoResult<Option<i64>> {
        let Some(condition) = condition else {
            return Ok(None);
        };
        let (sql, params) = self.translate_for_output(condition, "id")?;
        self.fetch_optional_i64(&sql, &params)
    }

    /// Every id matching the condition.
    ///
    /// `None` as the condition returns an empty list without executing any
    /// query. An empty condition matches every row, honoring limit/offset.
    pub fn fetch_all_ids_by_conditions(
        &self,
        condition: Option<&Condition>,
    ) -> RepoResult<Vec<i64>> {
        let Some(condition) = condition else {
            return Ok(Vec::new());
        };
        let (sql, params) = self.translate_for_output(condition, "id")?;
        self.fetch_i64_column(&sql, &params)
    }

    fn translate_for_output(
        &self,
        condition: &Condition,
        output_column: &'static str,
    ) -> RepoResult<(String, Params)> {
        self.require_column(output_column)?;
        self.validate_columns(condition.referenced_columns())?;
        translate(condition, output_column, &self.table)
    }
}

fn strip_id(values: &[(String, Value)]) -> Vec<(String, Value)> {
    values
        .iter()
        .filter(|(column, _)| column.as_str() != "id")
        .cloned()
        .collect()
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn as_named_params(params: &[(String, Value)]) -> Vec<(&str, &dyn ToSql)> {
    params
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect()
}

fn column_names(stmt: &rusqlite::Statement<'_>) -> Vec<String> {
    stmt.column_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn read_row(names: &[String], row: &Row<'_>) -> RepoResult<TableRow> {
    let mut record = TableRow::new();
    for (index, name) in names.iter().enumerate() {
        record.insert(name.clone(), row.get::<_, Value>(index)?);
    }
    Ok(record)
}
