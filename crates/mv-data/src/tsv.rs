//! Tab separated text import/export
//!
//! Same layout as the backend's `tsv` storage format: the header row starts
//! with an empty cell followed by the column names, each data row starts
//! with its row label.

use std::io::{Read, Write};

use csv::{ReaderBuilder, WriterBuilder};
use mv_core::{Matrix, RowLabel};
use tracing::debug;

use crate::DataError;

/// Write a matrix as TSV
pub fn write_tsv<W: Write>(matrix: &Matrix, writer: W) -> Result<(), DataError> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(writer);

    let mut header = Vec::with_capacity(matrix.num_columns() + 1);
    header.push(String::new());
    header.extend(matrix.columns().iter().cloned());
    writer.write_record(&header)?;

    for (label, values) in matrix.index().iter().zip(matrix.data()) {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(label.to_string());
        record.extend(values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    debug!("Wrote {} TSV rows", matrix.num_rows());
    Ok(())
}

/// Read a matrix from TSV
///
/// Empty cells are read as `NaN`.
///
/// TSV carries no label types, so labels are inferred: integers first, then
/// floats, then text. A label does not always come back as the variant it
/// was written from. `RowLabel::Float(1.0)` is written as `1` and reads back
/// as `Int(1)`, and text labels such as `"12"`, `"nan"` or `"inf"` read back
/// as numbers.
pub fn read_tsv<R: Read>(reader: R) -> Result<Matrix, DataError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().skip(1).map(String::from).collect();
    let mut index = Vec::new();
    let mut data = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let mut fields = record.iter();
        index.push(fields.next().map(parse_label).unwrap_or(RowLabel::from(line)));

        let values = fields
            .enumerate()
            .map(|(col, field)| {
                parse_value(field).ok_or_else(|| {
                    DataError::Tsv(format!(
                        "line {}, column {}: '{}' is not a number",
                        line + 2,
                        col + 1,
                        field
                    ))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        data.push(values);
    }

    Ok(Matrix::new(columns, index, data)?)
}

fn parse_label(field: &str) -> RowLabel {
    if let Ok(v) = field.parse::<i64>() {
        RowLabel::Int(v)
    } else if let Ok(v) = field.parse::<f64>() {
        RowLabel::Float(v)
    } else {
        RowLabel::Text(field.to_string())
    }
}

fn parse_value(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        Some(f64::NAN)
    } else {
        field.parse().ok()
    }
}
