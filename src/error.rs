//! Common error types for caption-curator

use std::path::PathBuf;
use thiserror::Error;

use crate::ollama::OllamaError;

/// Common result type for annotation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the annotation core
#[derive(Error, Debug)]
pub enum Error {
    /// The corpus directory holds no annotatable images.
    /// Terminal for the session: there is nothing to caption.
    #[error("no annotatable images found in {}", .0.display())]
    EmptyCorpus(PathBuf),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted JSON store could not be parsed
    #[error("malformed store file {}: {source}", .file.display())]
    MalformedStore {
        file: PathBuf,
        source: serde_json::Error,
    },

    /// Configuration loading or persistence error
    #[error("configuration error: {0}")]
    Config(String),

    /// External captioning backend failure
    #[error(transparent)]
    Ollama(#[from] OllamaError),
}
