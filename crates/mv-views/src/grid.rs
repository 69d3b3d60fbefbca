//! Grid adapter: lazy cell access for the virtualized table
//!
//! A [`GridProps`] is what the table widget needs to draw: a row count, the
//! column headers, and a cell getter it can call for any visible cell in any
//! order. Nothing is materialized up front; each call reads straight from
//! the underlying matrix or columnar table.

use std::fmt;
use std::sync::Arc;

use mv_core::Matrix;
use mv_data::{ColumnarTable, TableData};

/// Anything that can hand out numeric cells by position
pub trait CellSource: Send + Sync {
    fn num_rows(&self) -> usize;

    /// Column display names, in order
    fn column_names(&self) -> Vec<String>;

    /// Value at `(col, row)`, `None` if the position does not exist
    fn value(&self, col: usize, row: usize) -> Option<f64>;
}

impl CellSource for Matrix {
    fn num_rows(&self) -> usize {
        Matrix::num_rows(self)
    }

    fn column_names(&self) -> Vec<String> {
        self.columns().to_vec()
    }

    fn value(&self, col: usize, row: usize) -> Option<f64> {
        Matrix::value(self, row, col)
    }
}

impl CellSource for ColumnarTable {
    fn num_rows(&self) -> usize {
        ColumnarTable::num_rows(self)
    }

    fn column_names(&self) -> Vec<String> {
        ColumnarTable::column_names(self)
    }

    fn value(&self, col: usize, row: usize) -> Option<f64> {
        ColumnarTable::value(self, col, row).ok().map(f64::from)
    }
}

impl CellSource for TableData {
    fn num_rows(&self) -> usize {
        TableData::num_rows(self)
    }

    fn column_names(&self) -> Vec<String> {
        TableData::column_names(self)
    }

    fn value(&self, col: usize, row: usize) -> Option<f64> {
        match self {
            TableData::Rows(m) => CellSource::value(m, col, row),
            TableData::Columnar(t) => CellSource::value(t, col, row),
        }
    }
}

/// Kind of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Number,
    /// Requested position is outside the table
    Missing,
}

/// One displayable cell
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub kind: CellKind,
    /// Value with exactly one fractional digit
    pub display_data: String,
    pub data: f64,
    /// Cells are read-only in the grid
    pub allow_overlay: bool,
}

impl GridCell {
    pub fn number(value: f64) -> Self {
        Self {
            kind: CellKind::Number,
            display_data: format_value(value),
            data: value,
            allow_overlay: false,
        }
    }

    pub fn missing() -> Self {
        Self {
            kind: CellKind::Missing,
            display_data: String::new(),
            data: 0.0,
            allow_overlay: false,
        }
    }
}

/// Column header, id and title are both the column name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn {
    pub id: String,
    pub title: String,
}

/// Format a value with one fractional digit, no padding
///
/// Exact ties round away from zero (`1.25` shows as `1.3`). Values that only
/// look like ties in decimal, such as `0.35`, round by their exact binary
/// value.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return format!("{:.1}", value);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    // A binary float sits exactly halfway between two tenths only when it is
    // an odd multiple of 0.25; `{:.1}` would round those to even.
    let quarters = magnitude * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        let tenths = (magnitude * 10.0).ceil() as u64;
        return format!("{}{}.{}", sign, tenths / 10, tenths % 10);
    }

    format!("{}{:.1}", sign, magnitude)
}

/// Row count, headers and cell getter for the table widget
#[derive(Clone)]
pub struct GridProps {
    num_rows: usize,
    columns: Vec<GridColumn>,
    source: Arc<dyn CellSource>,
}

impl GridProps {
    pub fn new(source: Arc<dyn CellSource>) -> Self {
        let columns = source
            .column_names()
            .into_iter()
            .map(|name| GridColumn {
                id: name.clone(),
                title: name,
            })
            .collect();

        Self {
            num_rows: source.num_rows(),
            columns,
            source,
        }
    }

    /// Grid with no rows and no columns
    pub fn empty() -> Self {
        Self::new(Arc::new(Matrix::empty()))
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    /// Cell at `(col, row)`
    ///
    /// Pure and total: positions outside the grid give [`GridCell::missing`].
    pub fn cell(&self, col: usize, row: usize) -> GridCell {
        if col >= self.columns.len() || row >= self.num_rows {
            return GridCell::missing();
        }
        self.source
            .value(col, row)
            .map(GridCell::number)
            .unwrap_or_else(GridCell::missing)
    }
}

impl fmt::Debug for GridProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridProps")
            .field("num_rows", &self.num_rows)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// Build grid props over a matrix, a columnar table or either
pub fn to_grid<S: CellSource + 'static>(source: Arc<S>) -> GridProps {
    GridProps::new(source)
}
