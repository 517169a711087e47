//! Caption store: per-image sidecar files holding comma-separated tags.
//!
//! Each image `photo.png` owns a sidecar `photo.txt` next to it. A missing
//! sidecar means "no caption yet", never an error. Captions are ordered tag
//! lists with set semantics: a tag appears at most once per image.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// Sidecar path for an image: same base name, `.txt` extension
pub fn sidecar_path(directory: &Path, image_name: &str) -> PathBuf {
    let mut path = directory.join(image_name);
    path.set_extension("txt");
    path
}

/// Split caption text on commas into trimmed, non-empty tags,
/// dropping duplicates while preserving first-occurrence order.
pub fn parse(text: &str) -> Vec<String> {
    normalize(text.split(','))
}

/// Trim each tag, drop empties, and de-duplicate preserving order.
pub fn normalize<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_string()) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Load an image's caption.
///
/// Hidden images always read as uncaptioned; their sidecar is not touched.
pub fn load(directory: &Path, image_name: &str, hidden: &HashSet<String>) -> Result<Vec<String>> {
    if hidden.contains(image_name) {
        return Ok(Vec::new());
    }
    match fs::read_to_string(sidecar_path(directory, image_name)) {
        Ok(text) => Ok(parse(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Save an image's caption, overwriting the sidecar.
///
/// Writing a hidden image's caption is a silent no-op. The stored text is
/// the normalized tag list joined with ", " and no trailing newline.
pub fn save(
    directory: &Path,
    image_name: &str,
    tags: &[String],
    hidden: &HashSet<String>,
) -> Result<()> {
    if hidden.contains(image_name) {
        return Ok(());
    }
    let normalized = normalize(tags);
    fs::write(sidecar_path(directory, image_name), normalized.join(", "))?;
    Ok(())
}

/// Append a tag unless the caption already holds it.
/// Returns whether the caption changed; applying twice changes nothing.
pub fn apply_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}

/// Outcome of a bulk tag application over the active corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkTagReport {
    /// Images whose sidecar was actually rewritten
    pub modified: usize,
    /// Images skipped because their sidecar could not be read or written
    pub failed: usize,
}

/// Append `tag` to the caption of every active image that lacks it.
///
/// Images already carrying the tag are left untouched and uncounted. A
/// failing image is logged, counted in `failed`, and skipped; the sweep
/// always runs to completion.
pub fn add_tag_to_all(
    directory: &Path,
    active_images: &[String],
    hidden: &HashSet<String>,
    tag: &str,
) -> BulkTagReport {
    let mut report = BulkTagReport::default();
    let tag = tag.trim();
    if tag.is_empty() {
        return report;
    }

    for image in active_images {
        let mut tags = match load(directory, image, hidden) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(image = %image, error = %e, "skipping unreadable caption");
                report.failed += 1;
                continue;
            }
        };
        if !apply_tag(&mut tags, tag) {
            continue;
        }
        match save(directory, image, &tags, hidden) {
            Ok(()) => report.modified += 1,
            Err(e) => {
                warn!(image = %image, error = %e, "skipping unwritable caption");
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_hidden() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_sidecar_shares_the_base_name() {
        let path = sidecar_path(Path::new("/corpus"), "photo.png");
        assert_eq!(path, PathBuf::from("/corpus/photo.txt"));
    }

    #[test]
    fn test_missing_sidecar_means_uncaptioned() {
        let dir = TempDir::new().unwrap();
        let tags = load(dir.path(), "a.png", &no_hidden()).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_save_normalizes_and_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let tags = vec![
            "sky".to_string(),
            "  cat ".to_string(),
            "cat".to_string(),
            " ".to_string(),
        ];
        save(dir.path(), "a.png", &tags, &no_hidden()).unwrap();

        let stored = std::fs::read_to_string(dir.path().join("a.txt")).unwrap();
        assert_eq!(stored, "sky, cat");

        let loaded = load(dir.path(), "a.png", &no_hidden()).unwrap();
        assert_eq!(loaded, vec!["sky", "cat"]);
    }

    #[test]
    fn test_apply_tag_is_idempotent() {
        let mut tags = vec!["sky".to_string()];
        assert!(apply_tag(&mut tags, "cat"));
        assert!(!apply_tag(&mut tags, "cat"));
        assert_eq!(tags, vec!["sky", "cat"]);
    }

    #[test]
    fn test_apply_blank_tag_is_a_no_op() {
        let mut tags = vec!["sky".to_string()];
        assert!(!apply_tag(&mut tags, "   "));
        assert_eq!(tags, vec!["sky"]);
    }

    #[test]
    fn test_hidden_image_caption_io_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "old").unwrap();
        let hidden: HashSet<String> = ["b.jpg".to_string()].into_iter().collect();

        save(dir.path(), "b.jpg", &["new".to_string()], &hidden).unwrap();
        let stored = std::fs::read_to_string(dir.path().join("b.txt")).unwrap();
        assert_eq!(stored, "old");

        let loaded = load(dir.path(), "b.jpg", &hidden).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_add_tag_to_all_counts_only_real_changes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "dog, sky").unwrap();
        // c.jpeg has no sidecar yet
        let active = vec!["a.png".to_string(), "c.jpeg".to_string()];

        let report = add_tag_to_all(dir.path(), &active, &no_hidden(), "dog");
        assert_eq!(report.modified, 1);
        assert_eq!(report.failed, 0);

        let a = std::fs::read_to_string(dir.path().join("a.txt")).unwrap();
        assert_eq!(a, "dog, sky");
        let c = std::fs::read_to_string(dir.path().join("c.txt")).unwrap();
        assert_eq!(c, "dog");
    }

    #[test]
    fn test_add_tag_to_all_with_blank_tag_does_nothing() {
        let dir = TempDir::new().unwrap();
        let active = vec!["a.png".to_string()];
        let report = add_tag_to_all(dir.path(), &active, &no_hidden(), "  ");
        assert_eq!(report, BulkTagReport::default());
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_add_tag_to_all_survives_a_broken_image() {
        let dir = TempDir::new().unwrap();
        // a sidecar that is a directory cannot be read or written as a file
        std::fs::create_dir(dir.path().join("a.txt")).unwrap();
        let active = vec!["a.png".to_string(), "b.jpg".to_string()];

        let report = add_tag_to_all(dir.path(), &active, &no_hidden(), "dog");
        assert_eq!(report.modified, 1);
        assert_eq!(report.failed, 1);
        let b = std::fs::read_to_string(dir.path().join("b.txt")).unwrap();
        assert_eq!(b, "dog");
    }
}
