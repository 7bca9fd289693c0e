//! Error kinds surfaced by pipeline operations.
//!
//! Every error terminates only the operation in progress. The `Display`
//! output is the message shown to the user.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{0}")]
    Precondition(String),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PipelineError {
    pub fn precondition<S: Into<String>>(msg: S) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn not_loaded() -> Self {
        Self::precondition("Please load a comment file first!")
    }

    pub fn theme_not_applied() -> Self {
        Self::precondition("Please perform a theme search first!")
    }

    pub fn missing_api_key(var: &str) -> Self {
        Self::precondition(format!("Missing API key: set the {var} environment variable"))
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No file chosen")]
    NoFile,
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("{path} has no 'Comment' column")]
    MissingCommentColumn { path: PathBuf },
    #[error("{path}: row {row} has an empty 'Comment' value")]
    EmptyComment { path: PathBuf, row: usize },
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("API Error: {status}\n{body}")]
    Status { status: u16, body: String },
    #[error("API request failed: {0}")]
    Network(String),
    #[error("Unexpected API response format: {0}")]
    Format(#[from] ResponseFormatError),
}

/// Raised by the typed response decoders when a payload does not have the expected shape
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseFormatError {
    #[error("response is not valid JSON ({0})")]
    InvalidJson(String),
    #[error("expected {expected}, got {found}")]
    Shape { expected: &'static str, found: String },
    #[error("response contained no results")]
    Empty,
    #[error("result contained no labels")]
    NoLabels,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Error exporting results to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error exporting results to {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}
