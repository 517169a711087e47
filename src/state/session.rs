//! The annotation session: one explicit value holding everything the tool
//! knows about an open corpus.
//!
//! Callers (a window, a CLI, a test) own an `AnnotationSession` and drive it
//! through its methods; every filesystem side effect happens inside the
//! session so in-memory and on-disk state cannot drift apart.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::state::captions::{self, BulkTagReport};
use crate::state::corpus::{self, Direction};
use crate::state::hidden::HiddenSet;
use crate::state::progress::{self, Progress};
use crate::state::tags::TagLibrary;

/// A pending request for a generated caption.
///
/// Issued by [`AnnotationSession::begin_caption_request`] before the backend
/// call and handed back to [`AnnotationSession::apply_generated_caption`]
/// afterwards. The session only honors the newest request, and only while
/// the image it names is still the current one; anything else is discarded.
#[derive(Debug)]
pub struct CaptionRequest {
    epoch: u64,
    image: String,
    path: PathBuf,
}

impl CaptionRequest {
    /// Image the caption was requested for
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Full path to hand to the captioning backend
    pub fn image_path(&self) -> &Path {
        &self.path
    }
}

/// What happened to a generated caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionOutcome {
    /// The caption was merged; holds the image's full tag list afterwards
    Applied(Vec<String>),
    /// The request was stale; nothing was written
    Discarded,
}

/// An open corpus and all of its annotation state
#[derive(Debug)]
pub struct AnnotationSession {
    directory: PathBuf,
    images: Vec<String>,
    cursor: usize,
    tag_library: TagLibrary,
    hidden: HiddenSet,
    caption_epoch: u64,
}

impl AnnotationSession {
    /// Open a corpus directory, loading the hidden set, the tag library,
    /// and the active image list.
    ///
    /// Fails with `EmptyCorpus` when the folder holds no annotatable
    /// images; the caller has nothing to work on and should say so.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        let hidden = HiddenSet::load(&directory)?;
        let tag_library = TagLibrary::load(&directory)?;
        let images = corpus::list_active_images(&directory, hidden.names())?;

        info!(
            folder = %directory.display(),
            active = images.len(),
            hidden = hidden.len(),
            "corpus opened"
        );

        Ok(Self {
            directory,
            images,
            cursor: 0,
            tag_library,
            hidden,
            caption_epoch: 0,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Active (non-hidden) images in display order
    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Filename of the currently selected image, if any remain
    pub fn current_image(&self) -> Option<&str> {
        self.images.get(self.cursor).map(String::as_str)
    }

    /// Full path of the currently selected image
    pub fn current_image_path(&self) -> Option<PathBuf> {
        self.current_image().map(|name| self.directory.join(name))
    }

    // ----- navigation -----

    /// Step the cursor one image forward or back, clamped at the ends.
    pub fn advance(&mut self, direction: Direction) {
        self.cursor = corpus::advance(self.cursor, self.images.len(), direction);
    }

    /// Jump to a uniformly random active image.
    pub fn jump_random(&mut self) {
        if !self.images.is_empty() {
            self.cursor = corpus::random_index(self.images.len());
        }
    }

    /// Point the cursor at a named active image.
    /// Returns false (cursor untouched) if the name is not active.
    pub fn select_image(&mut self, filename: &str) -> bool {
        match self.images.iter().position(|name| name == filename) {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    /// Re-scan the corpus directory, keeping the cursor in range.
    /// Fails with `EmptyCorpus` if nothing annotatable remains.
    pub fn reload(&mut self) -> Result<()> {
        match corpus::list_active_images(&self.directory, self.hidden.names()) {
            Ok(images) => {
                self.images = images;
                if self.cursor >= self.images.len() {
                    self.cursor = self.images.len() - 1;
                }
                Ok(())
            }
            Err(e) => {
                self.images.clear();
                self.cursor = 0;
                Err(e)
            }
        }
    }

    // ----- hiding -----

    /// Hide an image: persist it in the hidden set and drop it from the
    /// active list. The image file and its sidecar stay on disk.
    ///
    /// Hiding the current image leaves the cursor on the next valid entry.
    /// If nothing remains the hide still sticks, and `EmptyCorpus` tells
    /// the caller the session is exhausted.
    pub fn hide(&mut self, filename: &str) -> Result<()> {
        if !self.hidden.hide(filename)? {
            return Ok(());
        }
        if let Some(index) = self.images.iter().position(|name| name == filename) {
            // removing an image before the cursor shifts the rest left;
            // keep pointing at the same picture
            if index < self.cursor {
                self.cursor -= 1;
            }
        }
        self.reload()
    }

    /// Hide the currently selected image. No-op on an exhausted session.
    pub fn hide_current(&mut self) -> Result<()> {
        match self.current_image() {
            Some(name) => {
                let name = name.to_string();
                self.hide(&name)
            }
            None => Ok(()),
        }
    }

    /// Hidden image count, for progress and display
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    // ----- captions -----

    /// Caption of the current image; empty if uncaptioned or exhausted.
    pub fn load_current_caption(&self) -> Result<Vec<String>> {
        match self.current_image() {
            Some(name) => captions::load(&self.directory, name, self.hidden.names()),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite the current image's caption with a normalized tag list.
    pub fn save_current_caption(&self, tags: &[String]) -> Result<()> {
        match self.current_image() {
            Some(name) => captions::save(&self.directory, name, tags, self.hidden.names()),
            None => Ok(()),
        }
    }

    /// Caption of a named image (hidden images read as uncaptioned).
    pub fn load_caption(&self, filename: &str) -> Result<Vec<String>> {
        captions::load(&self.directory, filename, self.hidden.names())
    }

    /// Append one tag to the current caption and persist, skipping the
    /// write when the tag is blank or already present.
    /// Returns the caption as it stands afterwards.
    pub fn apply_tag_to_current(&self, tag: &str) -> Result<Vec<String>> {
        let Some(name) = self.current_image() else {
            return Ok(Vec::new());
        };
        let mut tags = captions::load(&self.directory, name, self.hidden.names())?;
        if captions::apply_tag(&mut tags, tag) {
            captions::save(&self.directory, name, &tags, self.hidden.names())?;
        }
        Ok(tags)
    }

    /// Drop one tag from the current caption and persist if it was there.
    /// Returns the caption as it stands afterwards.
    pub fn remove_tag_from_current(&self, tag: &str) -> Result<Vec<String>> {
        let Some(name) = self.current_image() else {
            return Ok(Vec::new());
        };
        let mut tags = captions::load(&self.directory, name, self.hidden.names())?;
        let before = tags.len();
        let tag = tag.trim();
        tags.retain(|t| t != tag);
        if tags.len() != before {
            captions::save(&self.directory, name, &tags, self.hidden.names())?;
        }
        Ok(tags)
    }

    /// Append a tag to every active image that lacks it.
    pub fn add_tag_to_all(&self, tag: &str) -> BulkTagReport {
        captions::add_tag_to_all(&self.directory, &self.images, self.hidden.names(), tag)
    }

    // ----- tag library -----

    pub fn tag_library(&self) -> &TagLibrary {
        &self.tag_library
    }

    pub fn add_library_tag(&mut self, tag: &str) -> Result<bool> {
        self.tag_library.add(tag)
    }

    pub fn remove_library_tag(&mut self, tag: &str) -> Result<bool> {
        self.tag_library.remove(tag)
    }

    // ----- progress -----

    pub fn progress(&self) -> Result<Progress> {
        progress::compute(&self.directory, self.images.len(), self.hidden.len())
    }

    // ----- generated captions -----

    /// Start a captioning request for the current image.
    ///
    /// Supersedes any request still in flight: only the ticket returned
    /// here will be honored from now on. Returns `None` on an exhausted
    /// session.
    pub fn begin_caption_request(&mut self) -> Option<CaptionRequest> {
        let image = self.current_image()?.to_string();
        self.caption_epoch += 1;
        Some(CaptionRequest {
            epoch: self.caption_epoch,
            path: self.directory.join(&image),
            image,
        })
    }

    /// Merge a generated caption into the image the request named.
    ///
    /// The result is discarded, and no sidecar is written, unless the
    /// request is still the newest one and its image is still current.
    /// Comma-separated terms in the generated text become individual tags;
    /// terms the caption already holds are skipped.
    pub fn apply_generated_caption(
        &self,
        request: CaptionRequest,
        caption: &str,
    ) -> Result<CaptionOutcome> {
        if request.epoch != self.caption_epoch
            || self.current_image() != Some(request.image.as_str())
        {
            debug!(image = %request.image, "discarding stale generated caption");
            return Ok(CaptionOutcome::Discarded);
        }

        let mut tags = captions::load(&self.directory, &request.image, self.hidden.names())?;
        let mut changed = false;
        for tag in caption.split(',') {
            if captions::apply_tag(&mut tags, tag) {
                changed = true;
            }
        }
        if changed {
            captions::save(&self.directory, &request.image, &tags, self.hidden.names())?;
        }
        Ok(CaptionOutcome::Applied(tags))
    }
}
