//! HTTP implementation of [`MatrixService`]

use std::time::Duration;

use async_trait::async_trait;
use mv_data::{ipc, json, ColumnarTable, TableData};
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ClientError, MatrixService, StorageFormat, TransferFormat};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend, without a trailing path
    pub base_url: String,

    /// Whole-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// Backend client over HTTP
#[derive(Clone)]
pub struct HttpMatrixClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMatrixClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Use an already configured `reqwest` client
    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl MatrixService for HttpMatrixClient {
    async fn generate(&self, columns: usize, rows: usize) -> Result<ColumnarTable, ClientError> {
        debug!("Generating {}x{} matrix", rows, columns);
        let request = self
            .http
            .get(self.url("/matrix/generate"))
            .query(&[("cols", columns), ("rows", rows)]);

        let bytes = Self::send(request).await?.bytes().await?;
        let table = ipc::decode(&bytes).map_err(ClientError::Decode)?;
        info!(
            "Received generated table: {} rows x {} columns ({} bytes)",
            table.num_rows(),
            table.num_columns(),
            bytes.len()
        );
        Ok(table)
    }

    async fn fetch(
        &self,
        name: &str,
        storage: StorageFormat,
        transfer: TransferFormat,
    ) -> Result<TableData, ClientError> {
        debug!("Fetching '{}' ({}, via {})", name, storage, transfer);
        let request = self
            .http
            .get(self.url(transfer.path()))
            .query(&[("name", name), ("storage_format", storage.as_str())]);

        let bytes = Self::send(request).await?.bytes().await?;
        let data = match transfer {
            TransferFormat::Arrow => ipc::decode(&bytes).map(TableData::Columnar),
            TransferFormat::Json => json::matrix_from_json(&bytes).map(TableData::Rows),
        }
        .map_err(ClientError::Decode)?;

        info!("Fetched '{}': {} ({} bytes)", name, data.describe(), bytes.len());
        Ok(data)
    }

    async fn store(
        &self,
        name: &str,
        storage: StorageFormat,
        transfer: TransferFormat,
        payload: &TableData,
    ) -> Result<(), ClientError> {
        let body = match transfer {
            TransferFormat::Arrow => payload.to_columnar().and_then(|table| ipc::encode(&table)),
            TransferFormat::Json => payload.to_matrix().and_then(|matrix| json::matrix_to_json(&matrix)),
        }
        .map_err(ClientError::Encode)?;

        debug!("Storing '{}' ({}, via {}, {} bytes)", name, storage, transfer, body.len());
        let request = self
            .http
            .post(self.url(transfer.path()))
            .query(&[("name", name), ("storage_format", storage.as_str())])
            .header(CONTENT_TYPE, transfer.content_type())
            .body(body);

        Self::send(request).await?;
        info!("Stored '{}': {}", name, payload.describe());
        Ok(())
    }
}
