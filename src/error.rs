//! Error types for mdlatex.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a render or a config load.
#[derive(Debug, Error)]
pub enum Error {
    /// A packed table cell could not be decoded. The table callback only ever
    /// sees records produced by the cell callback, so this means the row or
    /// cell delimiters drifted apart from what the packer emitted.
    #[error("malformed table cell record {record:?}: {source}")]
    MalformedCell {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    /// A packed table cell carries a record version this build cannot read.
    #[error("unsupported table cell record version {version}")]
    UnsupportedCellVersion { version: u32 },

    #[error("failed to read config '{}': {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
