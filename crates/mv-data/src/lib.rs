//! Data handling for the matrix viewer
//!
//! Conversions between the canonical [`Matrix`] and the Arrow-backed
//! [`ColumnarTable`], plus the wire encodings used by the backend.

pub mod columnar;
pub mod ipc;
pub mod json;
pub mod tsv;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use mv_core::{Matrix, MatrixError};
use thiserror::Error;

// Re-exports
pub use columnar::{columnar_to_matrix, matrix_to_columnar, sample_table, ColumnarTable};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TSV error: {0}")]
    Tsv(String),

    #[error("Malformed matrix: {0}")]
    Matrix(#[from] MatrixError),

    #[error("Column {index} out of range (table has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("Row {index} out of range (table has {count} rows)")]
    RowOutOfRange { index: usize, count: usize },

    #[error("Value {value} at row {row}, column {col} cannot be sent as JSON")]
    NonFiniteValue { row: usize, col: usize, value: f64 },

    #[error("Column '{name}' has non-numeric type {data_type}")]
    NonNumericColumn { name: String, data_type: DataType },
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Tsv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        match error {
            ArrowError::IoError(_, io_err) => DataError::Io(io_err),
            other => DataError::Arrow(other),
        }
    }
}

/// A table in either of its two shapes
///
/// JSON transfers produce row-oriented matrices, Arrow transfers produce
/// columnar tables. Both describe the same logical labeled table.
#[derive(Debug, Clone)]
pub enum TableData {
    Rows(Matrix),
    Columnar(ColumnarTable),
}

impl TableData {
    pub fn num_rows(&self) -> usize {
        match self {
            TableData::Rows(m) => m.num_rows(),
            TableData::Columnar(t) => t.num_rows(),
        }
    }

    pub fn num_columns(&self) -> usize {
        match self {
            TableData::Rows(m) => m.num_columns(),
            TableData::Columnar(t) => t.num_columns(),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        match self {
            TableData::Rows(m) => m.columns().to_vec(),
            TableData::Columnar(t) => t.column_names(),
        }
    }

    /// Row-oriented view, converting a columnar table if needed
    ///
    /// Row labels of a columnar table are synthetic `0..R-1`.
    pub fn to_matrix(&self) -> Result<Matrix, DataError> {
        match self {
            TableData::Rows(m) => Ok(m.clone()),
            TableData::Columnar(t) => columnar_to_matrix(t),
        }
    }

    /// Columnar view, converting a matrix if needed
    pub fn to_columnar(&self) -> Result<ColumnarTable, DataError> {
        match self {
            TableData::Rows(m) => matrix_to_columnar(m),
            TableData::Columnar(t) => Ok(t.clone()),
        }
    }

    /// Short description for status messages
    pub fn describe(&self) -> String {
        format!("{} rows x {} columns", self.num_rows(), self.num_columns())
    }
}

impl From<Matrix> for TableData {
    fn from(matrix: Matrix) -> Self {
        TableData::Rows(matrix)
    }
}

impl From<ColumnarTable> for TableData {
    fn from(table: ColumnarTable) -> Self {
        TableData::Columnar(table)
    }
}
