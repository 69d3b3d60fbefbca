//! Grid adapter and table view for the matrix viewer

pub mod grid;
mod table_view;

pub use grid::{format_value, to_grid, CellKind, CellSource, GridCell, GridColumn, GridProps};
pub use table_view::{MatrixTableView, TableConfig};
