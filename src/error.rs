use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("No data rows in input")]
    EmptyInput,

    #[error("Missing required column: {column}")]
    SchemaMismatch { column: String },

    #[error("Parse error on line {line}: {reason}")]
    ParseFailure { line: u64, reason: String },

    #[error("Unknown format key: {0}")]
    UnknownFormatKey(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Failed to import {filename}: {source}")]
    ImportFailed {
        filename: String,
        #[source]
        source: Box<TallyError>,
    },

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TallyError {
    /// True when the failure points at the input file rather than at
    /// configuration or storage.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::NotFound { .. }
            | Self::EmptyInput
            | Self::SchemaMismatch { .. }
            | Self::ParseFailure { .. }
            | Self::Csv(_) => true,
            Self::ImportFailed { source, .. } => source.is_data_error(),
            _ => false,
        }
    }

    pub fn import_failed(filename: impl Into<String>, source: TallyError) -> Self {
        Self::ImportFailed {
            filename: filename.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
