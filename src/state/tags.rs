//! Tag library store: the reusable, corpus-wide set of tag strings.
//!
//! The library is independent of any single caption. Adding or removing a
//! library tag never touches existing sidecar files; applying one copies
//! its value into the current image's caption.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Name of the persisted tag library, inside the corpus directory
pub const TAG_LIBRARY_FILE: &str = "tag_library.json";

/// The shared tag library, kept sorted for display
#[derive(Debug)]
pub struct TagLibrary {
    path: PathBuf,
    tags: BTreeSet<String>,
}

impl TagLibrary {
    /// Load the tag library for a corpus directory.
    /// A missing file means an empty library.
    pub fn load(directory: &Path) -> Result<Self> {
        let path = directory.join(TAG_LIBRARY_FILE);
        let tags = match fs::read_to_string(&path) {
            Ok(text) => {
                let list: Vec<String> = serde_json::from_str(&text).map_err(|source| {
                    Error::MalformedStore {
                        file: path.clone(),
                        source,
                    }
                })?;
                list.into_iter().collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, tags })
    }

    /// Persist the library as a sorted JSON array.
    pub fn save(&self) -> Result<()> {
        let list: Vec<&String> = self.tags.iter().collect();
        let text = serde_json::to_string_pretty(&list)
            .expect("tag library serialization cannot fail");
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Add a tag and persist.
    /// Blank input and duplicates are silent no-ops that skip the write.
    pub fn add(&mut self, tag: &str) -> Result<bool> {
        let tag = tag.trim();
        if tag.is_empty() || !self.tags.insert(tag.to_string()) {
            return Ok(false);
        }
        self.save()?;
        debug!(tag, "tag added to library");
        Ok(true)
    }

    /// Remove a tag and persist. Absent tags are a silent no-op.
    pub fn remove(&mut self, tag: &str) -> Result<bool> {
        if !self.tags.remove(tag.trim()) {
            return Ok(false);
        }
        self.save()?;
        debug!(tag, "tag removed from library");
        Ok(true)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}
