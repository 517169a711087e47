//! Ollama captioning client
//!
//! Runs a local vision model through the `ollama` command line tool and
//! turns its stdout into caption text. The subprocess call is wrapped in
//! `spawn_blocking` so a caller's event loop stays responsive while the
//! model thinks; whether a late result is still wanted is decided by the
//! session, not here.

use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Model asked for when the user has not configured one
pub const DEFAULT_MODEL: &str = "llava";

/// Instruction asked of the model when the user has not configured one
pub const DEFAULT_PROMPT: &str = "Describe this image as a training prompt, \
using short, precise terms separated by commas. You'll answer only with \
these descriptive terms.";

/// Captioning backend errors
#[derive(Debug, Error)]
pub enum OllamaError {
    /// The backend program is not installed or not on PATH
    #[error("captioning backend not found: {0}")]
    BinaryNotFound(String),

    /// The backend could not be started or did not finish
    #[error("failed to run captioning backend: {0}")]
    Invocation(String),

    /// The backend ran but exited non-zero; holds its stderr text
    #[error("captioning backend failed: {0}")]
    Backend(String),

    /// The backend succeeded but printed nothing usable
    #[error("captioning backend produced an empty caption")]
    EmptyCaption,

    /// The image to caption does not exist
    #[error("image file not found: {0}")]
    ImageNotFound(String),
}

/// Client for the local Ollama installation
#[derive(Debug, Clone)]
pub struct OllamaClient {
    binary_path: String,
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaClient {
    /// Client for the `ollama` binary on PATH
    pub fn new() -> Self {
        Self {
            binary_path: "ollama".to_string(),
        }
    }

    /// Client for a specific backend program
    pub fn with_binary(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Generate caption text for one image.
    ///
    /// Invokes `<binary> run <model> <image_path> <prompt>` and waits for
    /// it to finish. Trimmed stdout is the caption on exit code 0; a
    /// non-zero exit surfaces the backend's stderr. The caller's sidecar
    /// files are never touched here, so a failed call leaves the on-disk
    /// caption exactly as it was.
    pub async fn generate(
        &self,
        image_path: &Path,
        model: &str,
        prompt: &str,
    ) -> Result<String, OllamaError> {
        if !image_path.exists() {
            return Err(OllamaError::ImageNotFound(
                image_path.display().to_string(),
            ));
        }

        debug!(
            image = %image_path.display(),
            model,
            backend = %self.binary_path,
            "requesting caption"
        );

        let binary = self.binary_path.clone();
        let output = tokio::task::spawn_blocking({
            let binary = binary.clone();
            let image = image_path.to_path_buf();
            let model = model.to_string();
            let prompt = prompt.to_string();

            move || {
                Command::new(&binary)
                    .arg("run")
                    .arg(&model)
                    .arg(&image)
                    .arg(&prompt)
                    .output()
            }
        })
        .await
        .map_err(|e| OllamaError::Invocation(format!("task join error: {e}")))?
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OllamaError::BinaryNotFound(binary),
            _ => OllamaError::Invocation(e.to_string()),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OllamaError::Backend(stderr));
        }

        let caption = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if caption.is_empty() {
            return Err(OllamaError::EmptyCaption);
        }
        Ok(caption)
    }
}
