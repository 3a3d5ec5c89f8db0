//! Sorting and truncation applied to results before display.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tvp_model::{Result, Table};

/// Sorts by `column`, nulls last; equal keys keep their input order.
pub fn sort_table(table: &Table, column: &str, descending: bool) -> Result<Table> {
    table.column_type(column)?;
    let frame = table
        .frame()
        .clone()
        .lazy()
        .sort(
            [column],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Table::new(frame)
}

/// First `n` rows.
pub fn head(table: &Table, n: usize) -> Table {
    table.head(n)
}

/// Optional sort and row limit for a tabular result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub sort_by: Option<String>,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl Presentation {
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let sorted = match &self.sort_by {
            Some(column) => sort_table(table, column, self.descending)?,
            None => table.clone(),
        };
        Ok(match self.limit {
            Some(n) => head(&sorted, n),
            None => sorted,
        })
    }
}
