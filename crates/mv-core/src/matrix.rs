//! Canonical row-oriented matrix model

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Shape violations of a matrix
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix has {rows} data rows but {labels} row labels")]
    RowCount { rows: usize, labels: usize },

    #[error("row {row} has {len} values, expected {expected}")]
    RowWidth { row: usize, len: usize, expected: usize },
}

/// Label of a single matrix row
///
/// The backend sends row labels as JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowLabel {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::Int(v) => write!(f, "{}", v),
            RowLabel::Float(v) => write!(f, "{}", v),
            RowLabel::Text(v) => f.write_str(v),
        }
    }
}

impl From<usize> for RowLabel {
    fn from(value: usize) -> Self {
        RowLabel::Int(value as i64)
    }
}

impl From<i64> for RowLabel {
    fn from(value: i64) -> Self {
        RowLabel::Int(value)
    }
}

impl From<&str> for RowLabel {
    fn from(value: &str) -> Self {
        RowLabel::Text(value.to_string())
    }
}

impl From<String> for RowLabel {
    fn from(value: String) -> Self {
        RowLabel::Text(value)
    }
}

/// Labeled 2-D numeric table addressed as `data[row][col]`
///
/// Construction validates that there is one data row per row label and that
/// every row is exactly as wide as the column list. A matrix is an immutable
/// snapshot: edits produce a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    columns: Vec<String>,
    index: Vec<RowLabel>,
    data: Vec<Vec<f64>>,
}

/// Wire shape before validation
#[derive(Deserialize)]
struct RawMatrix {
    #[serde(deserialize_with = "column_names")]
    columns: Vec<String>,
    index: Vec<RowLabel>,
    data: Vec<Vec<f64>>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = MatrixError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        Matrix::new(raw.columns, raw.index, raw.data)
    }
}

/// Column names may arrive as numbers; they are kept as their string form.
fn column_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Name {
        Text(String),
        Number(serde_json::Number),
    }

    let names = Vec::<Name>::deserialize(deserializer)?;
    Ok(names
        .into_iter()
        .map(|name| match name {
            Name::Text(s) => s,
            Name::Number(n) => n.to_string(),
        })
        .collect())
}

impl Matrix {
    /// Create a matrix, checking the shape invariant
    pub fn new(
        columns: Vec<String>,
        index: Vec<RowLabel>,
        data: Vec<Vec<f64>>,
    ) -> Result<Self, MatrixError> {
        if data.len() != index.len() {
            return Err(MatrixError::RowCount {
                rows: data.len(),
                labels: index.len(),
            });
        }

        if let Some((row, values)) = data
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(MatrixError::RowWidth {
                row,
                len: values.len(),
                expected: columns.len(),
            });
        }

        Ok(Self { columns, index, data })
    }

    /// Create a matrix whose rows are labeled `0..R-1`
    pub fn with_default_index(
        columns: Vec<String>,
        data: Vec<Vec<f64>>,
    ) -> Result<Self, MatrixError> {
        let index = (0..data.len()).map(RowLabel::from).collect();
        Self::new(columns, index, data)
    }

    /// A matrix with no rows and no columns
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            index: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[RowLabel] {
        &self.index
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Values of one row, if it exists
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        self.data.get(row).map(Vec::as_slice)
    }

    /// Value at `(row, col)`, `None` outside the matrix
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|values| values.get(col)).copied()
    }

    /// Split into `(columns, index, data)`
    pub fn into_parts(self) -> (Vec<String>, Vec<RowLabel>, Vec<Vec<f64>>) {
        (self.columns, self.index, self.data)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::empty()
    }
}
