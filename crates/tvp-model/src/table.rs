//! Immutable typed table over a Polars `DataFrame`.

use std::collections::BTreeMap;

use polars::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::schema::{Field, Schema};
use crate::value::{ColumnType, Value};

/// One row, keyed by column name.
pub type Record = BTreeMap<String, Value>;

/// Column values paired with the declared type they should be stored as.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnData {
    pub name: String,
    pub ty: ColumnType,
    pub values: Vec<Value>,
}

impl ColumnData {
    pub fn new(name: impl Into<String>, ty: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            values,
        }
    }

    /// Materializes the values as a Polars column of `ty`'s dtype.
    ///
    /// Values of another type are rendered to text for text columns and
    /// become null for the other column types.
    pub fn to_column(&self) -> Result<Column> {
        let name: PlSmallStr = self.name.as_str().into();
        let series = match self.ty {
            ColumnType::Text => {
                let values: Vec<Option<String>> = self
                    .values
                    .iter()
                    .map(|value| (!value.is_null()).then(|| value.label()))
                    .collect();
                Series::new(name, values)
            }
            ColumnType::Number => {
                let values: Vec<Option<f64>> = self.values.iter().map(Value::as_f64).collect();
                Series::new(name, values)
            }
            ColumnType::Boolean => {
                let values: Vec<Option<bool>> = self.values.iter().map(Value::as_bool).collect();
                Series::new(name, values)
            }
            ColumnType::DateTime => {
                let millis: Vec<Option<i64>> = self
                    .values
                    .iter()
                    .map(|value| value.as_datetime().map(|dt| dt.and_utc().timestamp_millis()))
                    .collect();
                Series::new(name, millis).cast(&ColumnType::DateTime.dtype())?
            }
        };
        Ok(series.into_column())
    }
}

/// A loaded or derived table. Operations never mutate a `Table`; they
/// return a new one.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    schema: Schema,
}

impl Table {
    /// Wraps a DataFrame, deriving the schema from its dtypes.
    pub fn new(frame: DataFrame) -> Result<Self> {
        let mut fields = Vec::with_capacity(frame.width());
        for column in frame.get_columns() {
            let ty = ColumnType::from_dtype(column.dtype()).ok_or_else(|| {
                AnalysisError::UnsupportedType {
                    column: column.name().to_string(),
                    dtype: column.dtype().to_string(),
                }
            })?;
            fields.push(Field::new(column.name().as_str(), ty));
        }
        Ok(Self {
            frame,
            schema: Schema::new(fields),
        })
    }

    /// Builds a table from typed column data. All columns must have the same
    /// length and distinct names.
    pub fn from_columns(columns: Vec<ColumnData>) -> Result<Self> {
        let built = columns
            .iter()
            .map(ColumnData::to_column)
            .collect::<Result<Vec<_>>>()?;
        let frame = DataFrame::new(built)?;
        Ok(Self {
            frame,
            schema: columns
                .into_iter()
                .map(|column| Field::new(column.name, column.ty))
                .collect(),
        })
    }

    /// Builds a table from records; absent keys become null.
    pub fn from_records(schema: &Schema, records: &[Record]) -> Result<Self> {
        let columns = schema
            .fields()
            .iter()
            .map(|field| {
                let values = records
                    .iter()
                    .map(|record| record.get(&field.name).cloned().unwrap_or_default())
                    .collect();
                ColumnData::new(field.name.clone(), field.ty, values)
            })
            .collect();
        Self::from_columns(columns)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.names().map(str::to_string).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    /// Declared type of `name`, or a schema error.
    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        self.schema
            .column_type(name)
            .ok_or_else(|| AnalysisError::schema(name))
    }

    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            self.column_type(name.as_ref())?;
        }
        Ok(())
    }

    pub fn require_numeric(&self, name: &str) -> Result<()> {
        let found = self.column_type(name)?;
        if found.is_numeric() {
            Ok(())
        } else {
            Err(AnalysisError::TypeMismatch {
                column: name.to_string(),
                expected: ColumnType::Number,
                found,
            })
        }
    }

    /// All values of a column in row order.
    pub fn values(&self, name: &str) -> Result<Vec<Value>> {
        let ty = self.column_type(name)?;
        let column = self.frame.column(name)?;
        (0..self.height())
            .map(|idx| Ok(Value::from_any(column.get(idx)?, ty)))
            .collect()
    }

    /// Numeric values of a column; errors for non-numeric columns.
    pub fn numbers(&self, name: &str) -> Result<Vec<Option<f64>>> {
        self.require_numeric(name)?;
        Ok(self.values(name)?.iter().map(Value::as_f64).collect())
    }

    /// Column values together with the declared type.
    pub fn column_data(&self, name: &str) -> Result<ColumnData> {
        Ok(ColumnData::new(name, self.column_type(name)?, self.values(name)?))
    }

    pub fn record(&self, idx: usize) -> Result<Record> {
        let mut record = Record::new();
        for field in self.schema.fields() {
            let column = self.frame.column(&field.name)?;
            record.insert(field.name.clone(), Value::from_any(column.get(idx)?, field.ty));
        }
        Ok(record)
    }

    pub fn records(&self) -> Result<Vec<Record>> {
        (0..self.height()).map(|idx| self.record(idx)).collect()
    }

    /// Row values in schema order; faster than records for whole-row scans.
    pub fn rows(&self) -> Result<Vec<Vec<Value>>> {
        let columns = self
            .schema
            .names()
            .map(|name| self.values(name))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.height())
            .map(|idx| columns.iter().map(|values| values[idx].clone()).collect())
            .collect())
    }

    /// New table with `data` appended, or replacing a column of the same name.
    pub fn with_column(&self, data: &ColumnData) -> Result<Self> {
        if data.values.len() != self.height() {
            return Err(AnalysisError::invalid_request(format!(
                "column '{}' has {} values for a table of {} rows",
                data.name,
                data.values.len(),
                self.height()
            )));
        }
        let mut frame = self.frame.clone();
        frame.with_column(data.to_column()?)?;
        Self::new(frame)
    }

    /// New table restricted to `names`, in that order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        self.require_columns(names)?;
        let frame = self
            .frame
            .select(names.iter().map(|name| name.as_ref().to_string()))?;
        Self::new(frame)
    }

    /// Empty table with the same schema.
    pub fn empty_like(&self) -> Self {
        Self {
            frame: self.frame.head(Some(0)),
            schema: self.schema.clone(),
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            frame: self.frame.head(Some(n)),
            schema: self.schema.clone(),
        }
    }
}
