//! JSON encoding of matrices (`{columns, index, data}`)

use mv_core::Matrix;

use crate::DataError;

/// Parse and validate a JSON matrix body
pub fn matrix_from_json(bytes: &[u8]) -> Result<Matrix, DataError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Serialize a matrix to a JSON body
///
/// JSON has no NaN or infinity, so the first non-finite value is an error
/// rather than a `null` the backend would refuse.
pub fn matrix_to_json(matrix: &Matrix) -> Result<Vec<u8>, DataError> {
    for (row, values) in matrix.data().iter().enumerate() {
        if let Some((col, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DataError::NonFiniteValue { row, col, value });
        }
    }
    Ok(serde_json::to_vec(matrix)?)
}
