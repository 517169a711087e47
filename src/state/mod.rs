//! Annotation state management
//!
//! This module owns everything the tool knows about an open corpus:
//! - Image enumeration and cursor navigation (corpus.rs)
//! - Hidden-image exclusion (hidden.rs)
//! - The reusable tag library (tags.rs)
//! - Per-image sidecar captions (captions.rs)
//! - Progress accounting (progress.rs)
//! - The session value tying it all together (session.rs)

pub mod captions;
pub mod corpus;
pub mod hidden;
pub mod progress;
pub mod session;
pub mod tags;
