//! Core library for caption-curator, a local tool for curating
//! image-captioning datasets.
//!
//! A corpus is one directory of images. Each image may carry a sidecar
//! `.txt` file holding its caption as a comma-separated tag list; a shared
//! tag library and a hidden-image set live beside them as JSON files. The
//! [`AnnotationSession`] value owns the synchronization between that
//! on-disk state and the in-memory view a caller navigates, and the
//! [`OllamaClient`] asks a local vision model for caption suggestions.

pub mod config;
pub mod error;
pub mod ollama;
pub mod state;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use ollama::{OllamaClient, OllamaError};
pub use state::progress::Progress;
pub use state::session::{AnnotationSession, CaptionOutcome, CaptionRequest};
