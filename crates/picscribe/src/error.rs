use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PicscribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Annotation error: {0}")]
    Annotate(#[from] AnnotateError),

    #[error("Store error: {0}")]
    Store(#[from] crate::db::StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Malformed asset path: the tree layout contract requires at least
/// `<collection>/<type>/<filename>`. Fatal for the offending path only;
/// a record is never inserted with partial metadata.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Path '{path}' has fewer than three segments (expected .../<collection>/<type>/<filename>)")]
    TooFewSegments { path: String },

    #[error("Path '{path}' contains a non-UTF-8 segment")]
    NonUtf8Segment { path: String },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to walk asset tree at '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Store error during scan: {0}")]
    Store(#[from] crate::db::StoreError),
}

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Store error during annotation: {0}")]
    Store(#[from] crate::db::StoreError),
}

/// Captioning call failed. Recorded as a diagnostic; the record stays
/// pending and the run continues.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Captioning endpoint returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse captioning response: {0}")]
    ResponseParse(String),

    #[error("Provider returned an empty caption")]
    EmptyCaption,
}

pub type Result<T> = std::result::Result<T, PicscribeError>;
