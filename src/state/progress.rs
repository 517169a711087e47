//! Progress tracker: how much of the corpus has a caption.
//!
//! The numerator is a raw count of sidecar files on disk, so orphaned
//! sidecars (for renamed or vanished images) still count. The denominator
//! includes hidden images: the ratio reads "fraction of the original corpus
//! captioned", not "fraction of the visible corpus".

use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;

/// Caption progress over one corpus directory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Sidecar files found in the directory
    pub captioned: usize,
    /// Active plus hidden images
    pub total: usize,
    /// `captioned / total`, or 0.0 for an empty total
    pub ratio: f64,
}

/// Compute progress for a corpus directory.
pub fn compute(directory: &Path, active_count: usize, hidden_count: usize) -> Result<Progress> {
    let mut captioned = 0;
    for entry in WalkDir::new(directory).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.path().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(".txt") {
            captioned += 1;
        }
    }

    let total = active_count + hidden_count;
    let ratio = if total > 0 {
        captioned as f64 / total as f64
    } else {
        0.0
    };

    Ok(Progress {
        captioned,
        total,
        ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_corpus_has_zero_progress() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.jpg", "c.jpeg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let progress = compute(dir.path(), 3, 0).unwrap();
        assert_eq!(progress.captioned, 0);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.ratio, 0.0);
    }

    #[test]
    fn test_hidden_images_stay_in_the_denominator() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "sky").unwrap();

        let progress = compute(dir.path(), 2, 1).unwrap();
        assert_eq!(progress.captioned, 1);
        assert_eq!(progress.total, 3);
        assert!((progress.ratio - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_orphaned_sidecars_inflate_the_count() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("gone.txt"), "orphan").unwrap();
        fs::write(dir.path().join("a.txt"), "sky").unwrap();

        let progress = compute(dir.path(), 1, 0).unwrap();
        assert_eq!(progress.captioned, 2);
    }

    #[test]
    fn test_json_stores_are_not_counted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tag_library.json"), "[]").unwrap();
        fs::write(dir.path().join("hidden_images.json"), "[]").unwrap();

        let progress = compute(dir.path(), 1, 0).unwrap();
        assert_eq!(progress.captioned, 0);
    }

    #[test]
    fn test_empty_total_has_zero_ratio() {
        let dir = TempDir::new().unwrap();
        let progress = compute(dir.path(), 0, 0).unwrap();
        assert_eq!(progress.total, 0);
        assert_eq!(progress.ratio, 0.0);
    }
}
