//! Error taxonomy for the digest pipeline.
//!
//! Only [`NewsError::Config`] (plus YAML/I/O failures while loading the
//! configuration file) is fatal. Every other variant is absorbed at the
//! source, article, tone or recipient boundary where it occurs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid link pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("no content container found in {url}")]
    ContentNotFound { url: String },

    #[error("content too short in {url} ({len} characters)")]
    ContentTooShort { url: String, len: usize },

    #[error("malformed completion response: {0}")]
    Completion(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;
