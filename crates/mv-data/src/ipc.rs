//! Arrow IPC encoding of columnar tables
//!
//! The backend writes Feather v2 (the Arrow IPC file format) and reads it back
//! on upload, so `encode` always produces the file format. `decode` also
//! accepts the streaming format.

use std::io::Cursor;

use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::ipc::reader::{FileReader, StreamReader};
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::{ColumnarTable, DataError};

/// Leading magic bytes of the IPC file format
const FILE_MAGIC: &[u8] = b"ARROW1";

/// Serialize a table (schema, field titles and buffers) to IPC file bytes
pub fn encode(table: &ColumnarTable) -> Result<Vec<u8>, DataError> {
    let mut writer = FileWriter::try_new(Vec::new(), table.schema().as_ref())?;
    writer.write(table.batch())?;
    writer.finish()?;
    let bytes = writer.into_inner()?;

    debug!(
        "Encoded {} rows x {} columns into {} bytes",
        table.num_rows(),
        table.num_columns(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decode IPC file or stream bytes into a table
///
/// Record batches are concatenated; a payload holding only a schema yields an
/// empty table.
pub fn decode(bytes: &[u8]) -> Result<ColumnarTable, DataError> {
    let (schema, batches) = if bytes.starts_with(FILE_MAGIC) {
        let reader = FileReader::try_new(Cursor::new(bytes), None)?;
        let schema = reader.schema();
        (schema, reader.collect::<Result<Vec<_>, _>>()?)
    } else {
        let reader = StreamReader::try_new(Cursor::new(bytes), None)?;
        let schema = reader.schema();
        (schema, reader.collect::<Result<Vec<_>, _>>()?)
    };

    debug!("Decoded {} record batches from {} bytes", batches.len(), bytes.len());
    ColumnarTable::try_new(single_batch(schema, batches)?)
}

fn single_batch(schema: SchemaRef, mut batches: Vec<RecordBatch>) -> Result<RecordBatch, DataError> {
    if batches.len() == 1 {
        if let Some(batch) = batches.pop() {
            return Ok(batch);
        }
    }
    Ok(concat_batches(&schema, &batches)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{columnar_to_matrix, matrix_to_columnar};
    use arrow::array::{Float32Array, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::ipc::writer::StreamWriter;
    use mv_core::{Matrix, RowLabel};
    use std::sync::Arc;

    #[test]
    fn test_binary_round_trip_2x2() {
        let m = Matrix::new(
            vec!["x".to_string(), "y".to_string()],
            vec!["r0".into(), "r1".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();

        let bytes = encode(&matrix_to_columnar(&m).unwrap()).unwrap();
        assert!(bytes.starts_with(FILE_MAGIC));

        let back = columnar_to_matrix(&decode(&bytes).unwrap()).unwrap();
        assert_eq!(back.data(), &[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(back.columns(), &["x".to_string(), "y".to_string()]);
        assert_eq!(back.index(), &[RowLabel::Int(0), RowLabel::Int(1)]);
    }

    #[test]
    fn test_schema_survives_encoding() {
        let m = Matrix::with_default_index(
            vec!["load".to_string(), "load".to_string()],
            vec![vec![0.5, 1.5]],
        )
        .unwrap();
        let table = matrix_to_columnar(&m).unwrap();
        let decoded = decode(&encode(&table).unwrap()).unwrap();

        assert_eq!(decoded.schema(), table.schema());
        assert_eq!(decoded.column_names(), vec!["load".to_string(), "load".to_string()]);
    }

    #[test]
    fn test_empty_table_round_trip() {
        let m = Matrix::with_default_index(vec!["a".to_string()], vec![]).unwrap();
        let decoded = decode(&encode(&matrix_to_columnar(&m).unwrap()).unwrap()).unwrap();
        assert_eq!(decoded.num_rows(), 0);
        assert_eq!(decoded.column_names(), vec!["a".to_string()]);
    }

    #[test]
    fn test_stream_with_several_batches() {
        let schema = Arc::new(Schema::new(vec![Field::new("0", DataType::Int64, false)]));
        let first = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![1, 2]))],
        )
        .unwrap();
        let second =
            RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(vec![3]))]).unwrap();

        let mut writer = StreamWriter::try_new(Vec::new(), &schema).unwrap();
        writer.write(&first).unwrap();
        writer.write(&second).unwrap();
        writer.finish().unwrap();
        let bytes = writer.into_inner().unwrap();

        let table = decode(&bytes).unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.column(0).unwrap(), &Float32Array::from(vec![1.0, 2.0, 3.0]));
        assert_eq!(table.column_names(), vec!["0".to_string()]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(decode(b"definitely not arrow").is_err());
        assert!(decode(b"ARROW1 truncated").is_err());
    }
}
