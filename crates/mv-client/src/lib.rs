//! Transport client for the matrix backend
//!
//! Every operation is a single asynchronous request: no retries, no backoff.
//! Failures come back as [`ClientError`] for the caller to report.

pub mod formats;
pub mod http;

use async_trait::async_trait;
use mv_data::{ColumnarTable, DataError, TableData};
use reqwest::StatusCode;
use thiserror::Error;

pub use formats::{StorageFormat, TransferFormat};
pub use http::{ClientConfig, HttpMatrixClient, DEFAULT_BASE_URL};

/// Errors that can occur while talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid response payload: {0}")]
    Decode(DataError),

    #[error("Cannot encode request payload: {0}")]
    Encode(DataError),

    #[error("Unknown format '{0}'")]
    UnknownFormat(String),
}

/// Backend operations on named matrices
#[async_trait]
pub trait MatrixService: Send + Sync {
    /// Ask the backend for a random `rows x columns` table
    async fn generate(&self, columns: usize, rows: usize) -> Result<ColumnarTable, ClientError>;

    /// Load a stored matrix
    ///
    /// Arrow transfers yield a columnar table, JSON transfers a row-oriented
    /// matrix.
    async fn fetch(
        &self,
        name: &str,
        storage: StorageFormat,
        transfer: TransferFormat,
    ) -> Result<TableData, ClientError>;

    /// Persist a matrix under `name`
    async fn store(
        &self,
        name: &str,
        storage: StorageFormat,
        transfer: TransferFormat,
        payload: &TableData,
    ) -> Result<(), ClientError>;
}
