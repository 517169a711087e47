//! Corpus index: enumeration of the annotatable images in a folder
//! and cursor navigation over the resulting list.

use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Image formats eligible for annotation
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Direction of a cursor move through the active image list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// List the annotatable images in `directory`.
///
/// Keeps regular files whose extension matches the allow-list
/// (case-insensitive) and whose filename is not in `hidden`. The result is
/// sorted by file name so repeated scans of an unchanged folder always
/// agree, keeping cursor positions meaningful across re-indexing.
pub fn list_active_images(directory: &Path, hidden: &HashSet<String>) -> Result<Vec<String>> {
    let mut images = Vec::new();

    for entry in WalkDir::new(directory).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(extension) = path.extension() else {
            continue;
        };
        let ext = extension.to_string_lossy().to_lowercase();
        if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if hidden.contains(&name) {
            continue;
        }

        images.push(name);
    }

    if images.is_empty() {
        return Err(Error::EmptyCorpus(directory.to_path_buf()));
    }

    Ok(images)
}

/// Move a cursor one step through a list of `len` entries.
/// Clamped at both ends, never wraps around.
pub fn advance(cursor: usize, len: usize, direction: Direction) -> usize {
    match direction {
        Direction::Prev => cursor.saturating_sub(1),
        Direction::Next if cursor + 1 < len => cursor + 1,
        Direction::Next => cursor,
    }
}

/// Uniform random index into a list of `len` entries.
/// Must not be called with `len == 0`.
pub fn random_index(len: usize) -> usize {
    debug_assert!(len > 0, "random_index over an empty list");
    rand::thread_rng().gen_range(0..len)
}
