//! Two-dimensional results (row key x column key -> value).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::{ColumnData, Table};
use crate::value::{ColumnType, Value};

/// Which side of a matrix an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Rows,
    Columns,
}

/// A pivoted result. `observed[r][c]` is false for cells that hold the fill
/// value because no source row produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
    pub index_name: String,
    pub columns_name: String,
    pub value_name: String,
    pub row_labels: Vec<Value>,
    pub column_labels: Vec<Value>,
    pub cells: Vec<Vec<Value>>,
    pub observed: Vec<Vec<bool>>,
}

impl Matrix {
    /// Matrix with every cell set to `fill` and nothing observed.
    pub fn filled(
        index_name: impl Into<String>,
        columns_name: impl Into<String>,
        value_name: impl Into<String>,
        row_labels: Vec<Value>,
        column_labels: Vec<Value>,
        fill: &Value,
    ) -> Self {
        let rows = row_labels.len();
        let cols = column_labels.len();
        Self {
            index_name: index_name.into(),
            columns_name: columns_name.into(),
            value_name: value_name.into(),
            row_labels,
            column_labels,
            cells: vec![vec![fill.clone(); cols]; rows],
            observed: vec![vec![false; cols]; rows],
        }
    }

    /// Stores an observed value.
    pub fn set(&mut self, row: usize, col: usize, value: Value) {
        self.cells[row][col] = value;
        self.observed[row][col] = true;
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.column_labels.len())
    }

    pub fn row_position(&self, label: &Value) -> Option<usize> {
        self.row_labels.iter().position(|row| row.same_key(label))
    }

    pub fn column_position(&self, label: &Value) -> Option<usize> {
        self.column_labels.iter().position(|col| col.same_key(label))
    }

    pub fn get(&self, row_label: &Value, column_label: &Value) -> Option<&Value> {
        let row = self.row_position(row_label)?;
        let col = self.column_position(column_label)?;
        Some(&self.cells[row][col])
    }

    pub fn is_observed(&self, row_label: &Value, column_label: &Value) -> bool {
        match (self.row_position(row_label), self.column_position(column_label)) {
            (Some(row), Some(col)) => self.observed[row][col],
            _ => false,
        }
    }

    /// Type of the cell values: the first non-null observed cell decides,
    /// then the fill when nothing was observed.
    pub fn cell_type(&self) -> ColumnType {
        let observed = self
            .cells
            .iter()
            .zip(&self.observed)
            .flat_map(|(cells, seen)| cells.iter().zip(seen))
            .filter(|(_, seen)| **seen)
            .find_map(|(value, _)| value.column_type());
        observed
            .or_else(|| self.cells.iter().flatten().find_map(Value::column_type))
            .unwrap_or(ColumnType::Number)
    }

    /// Wide form: the index column first, then one column per column label.
    /// A fill of another type than the observed cells is written as null,
    /// or as its label in text matrices.
    pub fn to_table(&self) -> Result<Table> {
        let cell_type = self.cell_type();
        let mut columns = Vec::with_capacity(self.column_labels.len() + 1);
        columns.push(ColumnData::new(
            self.index_name.clone(),
            label_type(&self.row_labels),
            self.row_labels.clone(),
        ));
        for (col, label) in self.column_labels.iter().enumerate() {
            let values = self.cells.iter().map(|row| row[col].clone()).collect();
            columns.push(ColumnData::new(label.label(), cell_type, values));
        }
        Table::from_columns(columns)
    }

    /// Long form of the observed cells: one row per (index, column) pair.
    pub fn melt(&self) -> Result<Table> {
        let mut index = Vec::new();
        let mut column = Vec::new();
        let mut value = Vec::new();
        for (row, row_label) in self.row_labels.iter().enumerate() {
            for (col, col_label) in self.column_labels.iter().enumerate() {
                if !self.observed[row][col] {
                    continue;
                }
                index.push(row_label.clone());
                column.push(col_label.clone());
                value.push(self.cells[row][col].clone());
            }
        }
        Table::from_columns(vec![
            ColumnData::new(self.index_name.clone(), label_type(&self.row_labels), index),
            ColumnData::new(
                self.columns_name.clone(),
                label_type(&self.column_labels),
                column,
            ),
            ColumnData::new(self.value_name.clone(), self.cell_type(), value),
        ])
    }

    /// Reorders one axis to `order`. Labels missing from the matrix become
    /// fill rows/columns; labels not in `order` are dropped.
    pub fn reindex(&self, axis: Axis, order: &[Value], fill: &Value) -> Self {
        let mut result = Self::filled(
            self.index_name.clone(),
            self.columns_name.clone(),
            self.value_name.clone(),
            match axis {
                Axis::Rows => order.to_vec(),
                Axis::Columns => self.row_labels.clone(),
            },
            match axis {
                Axis::Rows => self.column_labels.clone(),
                Axis::Columns => order.to_vec(),
            },
            fill,
        );
        for (target, label) in order.iter().enumerate() {
            match axis {
                Axis::Rows => {
                    if let Some(source) = self.row_position(label) {
                        result.cells[target] = self.cells[source].clone();
                        result.observed[target] = self.observed[source].clone();
                    }
                }
                Axis::Columns => {
                    if let Some(source) = self.column_position(label) {
                        for row in 0..self.row_labels.len() {
                            result.cells[row][target] = self.cells[row][source].clone();
                            result.observed[row][target] = self.observed[row][source];
                        }
                    }
                }
            }
        }
        result
    }
}

fn label_type(labels: &[Value]) -> ColumnType {
    labels
        .iter()
        .find_map(Value::column_type)
        .unwrap_or(ColumnType::Text)
}
