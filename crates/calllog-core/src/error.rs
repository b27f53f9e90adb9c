use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the call-log dashboard.
///
/// Only workbook-level failures abort an ingestion. Individual cells that
/// fail to parse are stored as `None` on the record instead.
#[derive(Error, Debug)]
pub enum CallLogError {
    /// The workbook file could not be opened or recognised.
    #[error("Failed to open workbook {path}: {reason}")]
    WorkbookOpen { path: PathBuf, reason: String },

    /// An in-memory workbook (e.g. uploaded bytes) could not be decoded.
    #[error("Failed to read workbook: {0}")]
    WorkbookRead(String),

    /// A sheet listed in the workbook could not be read.
    #[error("Failed to read sheet \"{sheet}\": {reason}")]
    SheetRead { sheet: String, reason: String },

    /// The dashboard could not be rendered as JSON.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for raw I/O errors (export, log files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the call-log crates.
pub type Result<T> = std::result::Result<T, CallLogError>;
