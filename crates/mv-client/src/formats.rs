use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Backend-side persistence representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    #[default]
    Hdf5,
    Tsv,
}

impl StorageFormat {
    pub const ALL: [StorageFormat; 2] = [StorageFormat::Hdf5, StorageFormat::Tsv];

    /// Value of the `storage_format` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageFormat::Hdf5 => "hdf5",
            StorageFormat::Tsv => "tsv",
        }
    }
}

/// Wire encoding of a request or response body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFormat {
    #[default]
    Arrow,
    Json,
}

impl TransferFormat {
    pub const ALL: [TransferFormat; 2] = [TransferFormat::Arrow, TransferFormat::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferFormat::Arrow => "arrow",
            TransferFormat::Json => "json",
        }
    }

    /// Endpoint serving this encoding
    pub fn path(&self) -> &'static str {
        match self {
            TransferFormat::Arrow => "/matrix/arrow",
            TransferFormat::Json => "/matrix/json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            TransferFormat::Arrow => "application/octet-stream",
            TransferFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TransferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorageFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::UnknownFormat(s.to_string()))
    }
}

impl FromStr for TransferFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransferFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("hdf5".parse::<StorageFormat>().unwrap(), StorageFormat::Hdf5);
        assert_eq!(" TSV ".parse::<StorageFormat>().unwrap(), StorageFormat::Tsv);
        assert_eq!("json".parse::<TransferFormat>().unwrap(), TransferFormat::Json);
        assert!("parquet".parse::<StorageFormat>().is_err());
    }

    #[test]
    fn test_transfer_endpoints() {
        assert_eq!(TransferFormat::Arrow.path(), "/matrix/arrow");
        assert_eq!(TransferFormat::Json.path(), "/matrix/json");
        assert_eq!(TransferFormat::Arrow.content_type(), "application/octet-stream");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&StorageFormat::Hdf5).unwrap(), "\"hdf5\"");
        let format: TransferFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, TransferFormat::Json);
    }
}
