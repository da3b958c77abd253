//! Sort-column maintenance for ordered tables.
//!
//! # Responsibility
//! - Rank, swap and shuffle rows through their integer `sort` column.
//!
//! # Invariants
//! - Every operation requires the table to declare a `sort` column.
//! - Reordering happens exclusively through pairwise swaps: the multiset of
//!   sort values is never changed, only redistributed.
//! - A missing row or missing neighbor is a silent no-op, never an error.

use crate::query::condition::Params;
use crate::repo::table_repo::{TableRepository, TableRow};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;

/// Traversal direction over the sort order.
///
/// For neighbor lookups, `Asc` targets the row with the next strictly
/// greater sort value and `Desc` the next strictly smaller one. For ranks,
/// the direction selects which side of the value counts as "ahead".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl TableRepository {
    /// The `sort` value of one row, if the row exists.
    pub fn fetch_sort(&self, id: i64) -> RepoResult<Option<i64>> {
        self.require_column("sort")?;
        let sql = format!("SELECT sort FROM {} WHERE id=:id", self.table_name());
        self.fetch_optional_i64(&sql, &[(":id".to_string(), Value::Integer(id))])
    }

    /// 1-based rank of `value` within `column` for the given direction:
    /// the count of rows strictly ahead, plus one.
    pub fn rank(&self, column: &str, value: Value, direction: Direction) -> RepoResult<i64> {
        self.require_column("id")?;
        self.validate_columns([column])?;
        let operator = match direction {
            Direction::Desc => ">",
            Direction::Asc => "<",
        };
        let sql = format!(
            "SELECT COUNT(id) + 1 FROM {} WHERE {column} {operator} :value",
            self.table_name()
        );
        self.fetch_i64(&sql, &[(":value".to_string(), value)])
    }

    /// Exchanges the sort values of two rows.
    ///
    /// A missing row on either side makes the whole call a no-op; the two
    /// updates are only issued once both rows are known to exist.
    pub fn swap_sort(&self, id1: i64, id2: i64) -> RepoResult<()> {
        self.require_column("sort")?;
        let (Some(row1), Some(row2)) = (self.fetch_by_id(id1)?, self.fetch_by_id(id2)?) else {
            return Ok(());
        };
        let sort1 = row_i64(&row1, "sort")?;
        let sort2 = row_i64(&row2, "sort")?;

        self.update_by_id(id1, &sort_values(sort2), &[], &[])?;
        self.update_by_id(id2, &sort_values(sort1), &[], &[])?;
        Ok(())
    }

    /// Swaps a row with its nearest neighbor in the given direction.
    ///
    /// The neighbor is the single row whose sort value is strictly greater
    /// (`Asc`) or strictly smaller (`Desc`), closest first, optionally
    /// constrained by `extra_where`/`extra_params`. No neighbor, no effect.
    pub fn swap_with_neighbor(
        &self,
        id: i64,
        direction: Direction,
        extra_where: &str,
        extra_params: &[(String, Value)],
    ) -> RepoResult<()> {
        self.require_column("sort")?;
        let Some(row) = self.fetch_by_id(id)? else {
            return Ok(());
        };
        let Some(neighbor) = self.fetch_neighbor(id, direction, extra_where, extra_params)? else {
            return Ok(());
        };

        let sort = row_i64(&row, "sort")?;
        let neighbor_sort = row_i64(&neighbor, "sort")?;
        let neighbor_id = row_i64(&neighbor, "id")?;

        self.update_by_id(id, &sort_values(neighbor_sort), &[], &[])?;
        self.update_by_id(neighbor_id, &sort_values(sort), &[], &[])?;
        Ok(())
    }

    /// Shuffles the table's sort order by pairwise swaps.
    ///
    /// Draws two independent random id sequences and swaps each pair, so
    /// existing sort values are permuted rather than reassigned. An empty
    /// table is a no-op.
    pub fn randomize_sort(&self, count: Option<u64>) -> RepoResult<()> {
        self.require_column("sort")?;
        let count = match count {
            Some(count) => count,
            None => self.fetch_count("", &[])? as u64,
        };
        if count == 0 {
            return Ok(());
        }

        let ids1 = self.fetch_all_random_ids(count)?;
        let ids2 = self.fetch_all_random_ids(count)?;
        for (id1, id2) in ids1.iter().zip(ids2.iter()) {
            self.swap_sort(*id1, *id2)?;
        }
        Ok(())
    }

    fn fetch_neighbor(
        &self,
        id: i64,
        direction: Direction,
        extra_where: &str,
        extra_params: &[(String, Value)],
    ) -> RepoResult<Option<TableRow>> {
        let Some(sort) = self.fetch_sort(id)? else {
            return Ok(None);
        };
        let (operator, order) = match direction {
            Direction::Asc => (">", "ASC"),
            Direction::Desc => ("<", "DESC"),
        };
        let extra = if extra_where.is_empty() {
            String::new()
        } else {
            format!(" AND {extra_where}")
        };
        // Strict inequality plus LIMIT 1 pins a single neighbor even when
        // duplicate sort values exist elsewhere in the table.
        let sql = format!(
            "SELECT id, sort FROM {} WHERE sort {operator} :sort{extra} ORDER BY sort {order} LIMIT 1",
            self.table_name()
        );
        let mut params: Params = extra_params.to_vec();
        params.push((":sort".to_string(), Value::Integer(sort)));
        self.fetch_one(&sql, &params)
    }
}

fn sort_values(sort: i64) -> Vec<(String, Value)> {
    vec![("sort".to_string(), Value::Integer(sort))]
}

fn row_i64(row: &TableRow, column: &str) -> RepoResult<i64> {
    match row.get(column) {
        Some(Value::Integer(value)) => Ok(*value),
        Some(other) => Err(RepoError::InvalidData(format!(
            "non-integer `{column}` value: {other:?}"
        ))),
        None => Err(RepoError::InvalidData(format!(
            "row is missing `{column}` value"
        ))),
    }
}
