//! Columnar table: one `Float32` Arrow column per matrix column

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float32Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use mv_core::Matrix;
use rand::Rng;
use tracing::debug;

use crate::DataError;

/// Field metadata key holding the display name of a column
pub const TITLE_METADATA_KEY: &str = "title";

/// Shape of the locally generated sample table
pub const DEFAULT_SAMPLE_COLUMNS: usize = 10;
pub const DEFAULT_SAMPLE_ROWS: usize = 500;

/// Column-major numeric table backed by a single Arrow record batch
///
/// Every column is `Float32`. Fields are keyed by position (`"0"`, `"1"`, ...);
/// the display name of a column lives in the field metadata so that the
/// wire schema stays positional while the grid can show real names.
#[derive(Debug, Clone)]
pub struct ColumnarTable {
    batch: RecordBatch,
}

impl ColumnarTable {
    /// Wrap a record batch, casting every numeric column to `Float32`
    pub fn try_new(batch: RecordBatch) -> Result<Self, DataError> {
        let schema = batch.schema();
        let mut fields = Vec::with_capacity(schema.fields().len());
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());

        for (field, column) in schema.fields().iter().zip(batch.columns()) {
            let column = match field.data_type() {
                DataType::Float32 => column.clone(),
                data_type if data_type.is_numeric() => {
                    debug!("Casting column '{}' from {} to Float32", field.name(), data_type);
                    cast(column.as_ref(), &DataType::Float32)?
                }
                data_type => {
                    return Err(DataError::NonNumericColumn {
                        name: field.name().clone(),
                        data_type: data_type.clone(),
                    })
                }
            };
            fields.push(
                Field::new(field.name(), DataType::Float32, field.is_nullable())
                    .with_metadata(field.metadata().clone()),
            );
            columns.push(column);
        }

        let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
        let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
        let batch = RecordBatch::try_new_with_options(Arc::new(schema), columns, &options)?;
        Ok(Self { batch })
    }

    /// Build a table from column-major values and display names
    ///
    /// `num_rows` is only needed to size a table without columns.
    pub fn from_columns(
        titles: &[String],
        columns: Vec<Vec<f32>>,
        num_rows: usize,
    ) -> Result<Self, DataError> {
        let fields: Vec<Field> = titles
            .iter()
            .enumerate()
            .map(|(position, title)| {
                Field::new(position.to_string(), DataType::Float32, false).with_metadata(
                    HashMap::from([(TITLE_METADATA_KEY.to_string(), title.clone())]),
                )
            })
            .collect();
        let arrays: Vec<ArrayRef> = columns
            .into_iter()
            .map(|values| Arc::new(Float32Array::from(values)) as ArrayRef)
            .collect();

        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(Self { batch })
    }

    /// Empty table with the given schema
    pub fn empty(schema: SchemaRef) -> Result<Self, DataError> {
        Self::try_new(RecordBatch::new_empty(schema))
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Display names in schema order
    ///
    /// Uses the `title` metadata when present, the field name otherwise.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| {
                field
                    .metadata()
                    .get(TITLE_METADATA_KEY)
                    .cloned()
                    .unwrap_or_else(|| field.name().clone())
            })
            .collect()
    }

    /// Column buffer at a position
    pub fn column(&self, index: usize) -> Result<&Float32Array, DataError> {
        let count = self.num_columns();
        if index >= count {
            return Err(DataError::ColumnOutOfRange { index, count });
        }

        self.batch
            .column(index)
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| {
                let field = self.batch.schema().field(index).clone();
                DataError::NonNumericColumn {
                    name: field.name().clone(),
                    data_type: field.data_type().clone(),
                }
            })
    }

    /// Value at `(col, row)`; null slots read as `0.0`
    pub fn value(&self, col: usize, row: usize) -> Result<f32, DataError> {
        let column = self.column(col)?;
        if row >= column.len() {
            return Err(DataError::RowOutOfRange {
                index: row,
                count: column.len(),
            });
        }
        Ok(if column.is_null(row) { 0.0 } else { column.value(row) })
    }
}

/// Project a matrix into column-major `Float32` buffers
///
/// Values are truncated to 32-bit floats without range checks. Columns are
/// keyed `"0".."C-1"`; the matrix column names become field titles.
pub fn matrix_to_columnar(matrix: &Matrix) -> Result<ColumnarTable, DataError> {
    let columns = (0..matrix.num_columns())
        .map(|col| matrix.data().iter().map(|row| row[col] as f32).collect())
        .collect();
    ColumnarTable::from_columns(matrix.columns(), columns, matrix.num_rows())
}

/// Rebuild a row-oriented matrix from a columnar table
///
/// Row labels are not part of the columnar schema: the result is labeled
/// `0..R-1` whatever the original labels were.
pub fn columnar_to_matrix(table: &ColumnarTable) -> Result<Matrix, DataError> {
    let columns = (0..table.num_columns())
        .map(|col| table.column(col))
        .collect::<Result<Vec<_>, _>>()?;

    let data = (0..table.num_rows())
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    if column.is_null(row) {
                        0.0
                    } else {
                        column.value(row) as f64
                    }
                })
                .collect()
        })
        .collect();

    Ok(Matrix::with_default_index(table.column_names(), data)?)
}

/// Random table with values in `[0, 20)` rounded to one decimal
pub fn sample_table<R: Rng + ?Sized>(
    columns: usize,
    rows: usize,
    rng: &mut R,
) -> Result<ColumnarTable, DataError> {
    let titles: Vec<String> = (0..columns).map(|c| c.to_string()).collect();
    let data = (0..columns)
        .map(|_| {
            (0..rows)
                .map(|_| (rng.gen::<f32>() * 200.0).round() / 10.0)
                .collect()
        })
        .collect();
    ColumnarTable::from_columns(&titles, data, rows)
}
