//! Condition model and SQL translation.
//!
//! # Responsibility
//! - Turn a declarative [`Condition`] into a parameterized SELECT fragment
//!   plus its named-parameter bindings.
//!
//! # Invariants
//! - Set-valued entries bind one suffixed placeholder per element
//!   (`:col0`, `:col1`, ...), never a single collection value.
//! - No predicates means no WHERE clause at all, while limit/offset still
//!   apply.
//! - `offset` without `limit` is ignored. Downstream callers rely on this;
//!   do not normalize it away.

use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;

/// Named-parameter bindings for one statement, keyed by full placeholder
/// text (`":col"`). Order follows clause emission order.
pub type Params = Vec<(String, Value)>;

/// Scalar or set value on one condition entry.
#[derive(Debug, Clone)]
pub enum ConditionValue {
    /// Single scalar, compared with `=` / `!=`.
    One(Value),
    /// Set of scalars, compared with `IN` / `NOT IN`.
    Many(Vec<Value>),
}

/// Declarative descriptor for a single-table id lookup.
///
/// Entry order is preserved, so the generated SQL is deterministic for a
/// given construction order.
#[derive(Debug, Clone, Default)]
pub struct Condition {
    /// Equality predicates, ANDed together.
    pub wheres: Vec<(String, ConditionValue)>,
    /// Exclusion predicates, ANDed together after `wheres`.
    pub wheres_not: Vec<(String, ConditionValue)>,
    /// Maximum row count.
    pub limit: Option<u64>,
    /// Rows to skip. Only meaningful together with `limit`.
    pub offset: Option<u64>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `column = value` predicate.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.wheres
            .push((column.into(), ConditionValue::One(value.into())));
        self
    }

    /// Adds a `column IN (...)` predicate.
    pub fn where_in(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.wheres
            .push((column.into(), ConditionValue::Many(values)));
        self
    }

    /// Adds a `column != value` predicate.
    pub fn where_not_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.wheres_not
            .push((column.into(), ConditionValue::One(value.into())));
        self
    }

    /// Adds a `column NOT IN (...)` predicate.
    pub fn where_not_in(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.wheres_not
            .push((column.into(), ConditionValue::Many(values)));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns whether the condition carries no predicates.
    pub fn has_no_predicates(&self) -> bool {
        self.wheres.is_empty() && self.wheres_not.is_empty()
    }

    /// Iterates every column name referenced by a predicate, for schema
    /// validation by the owning repository.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.wheres
            .iter()
            .chain(self.wheres_not.iter())
            .map(|(column, _)| column.as_str())
    }
}

/// Translates a condition into `SELECT <output_column> FROM <table> ...`
/// plus its parameter bindings.
///
/// Column membership is the caller's responsibility; the translator only
/// shapes SQL from names it is handed.
///
/// # Errors
/// - [`RepoError::InvalidArgument`] when a set-valued entry is empty.
pub fn translate(
    condition: &Condition,
    output_column: &str,
    table: &str,
) -> RepoResult<(String, Params)> {
    let mut predicates: Vec<String> = Vec::new();
    let mut params: Params = Vec::new();

    for (column, value) in &condition.wheres {
        match value {
            ConditionValue::Many(values) => {
                let placeholders = push_set_params(column, values, &mut params)?;
                predicates.push(format!("{column} IN({placeholders})"));
            }
            ConditionValue::One(value) => {
                predicates.push(format!("{column}=:{column}"));
                params.push((format!(":{column}"), value.clone()));
            }
        }
    }

    for (column, value) in &condition.wheres_not {
        match value {
            ConditionValue::Many(values) => {
                let placeholders = push_set_params(column, values, &mut params)?;
                predicates.push(format!("{column} NOT IN({placeholders})"));
            }
            ConditionValue::One(value) => {
                predicates.push(format!("{column}!=:{column}"));
                params.push((format!(":{column}"), value.clone()));
            }
        }
    }

    let mut sql = format!("SELECT {output_column} FROM {table}");
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    if let Some(limit) = condition.limit {
        match condition.offset {
            Some(offset) => sql.push_str(&format!(" LIMIT {offset}, {limit}")),
            None => sql.push_str(&format!(" LIMIT {limit}")),
        }
    }

    Ok((sql, params))
}

fn push_set_params(column: &str, values: &[Value], params: &mut Params) -> RepoResult<String> {
    if values.is_empty() {
        return Err(RepoError::InvalidArgument(format!(
            "empty value set for column `{column}`"
        )));
    }

    let mut placeholders = Vec::with_capacity(values.len());
    for (suffix, value) in values.iter().enumerate() {
        let placeholder = format!(":{column}{suffix}");
        placeholders.push(placeholder.clone());
        params.push((placeholder, value.clone()));
    }
    Ok(placeholders.join(","))
}
