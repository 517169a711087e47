//! Hidden set store: the filenames excluded from the active corpus.
//!
//! Hiding never deletes anything from disk. The image file and its sidecar
//! stay where they are; the name just stops appearing in index results.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Name of the persisted hidden set, inside the corpus directory
pub const HIDDEN_IMAGES_FILE: &str = "hidden_images.json";

/// The set of image filenames excluded from annotation
#[derive(Debug)]
pub struct HiddenSet {
    path: PathBuf,
    names: HashSet<String>,
}

impl HiddenSet {
    /// Load the hidden set for a corpus directory.
    /// A missing file means nothing is hidden yet.
    pub fn load(directory: &Path) -> Result<Self> {
        let path = directory.join(HIDDEN_IMAGES_FILE);
        let names = match fs::read_to_string(&path) {
            Ok(text) => {
                let list: Vec<String> = serde_json::from_str(&text).map_err(|source| {
                    Error::MalformedStore {
                        file: path.clone(),
                        source,
                    }
                })?;
                list.into_iter().collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, names })
    }

    /// Persist the current set as a JSON array (order not meaningful).
    pub fn save(&self) -> Result<()> {
        let list: Vec<&String> = self.names.iter().collect();
        let text = serde_json::to_string_pretty(&list)
            .expect("hidden set serialization cannot fail");
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Hide an image and persist the set.
    /// Returns false (without rewriting the file) if it was already hidden.
    pub fn hide(&mut self, filename: &str) -> Result<bool> {
        if !self.names.insert(filename.to_string()) {
            return Ok(false);
        }
        self.save()?;
        debug!(image = filename, "image hidden");
        Ok(true)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.names.contains(filename)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Borrow the raw set, for index filtering
    pub fn names(&self) -> &HashSet<String> {
        &self.names
    }
}
