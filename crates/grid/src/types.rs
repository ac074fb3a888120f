//! Core data types shared across the pipeline stages.

use std::path::PathBuf;

/// A Steam game in a library. May or may not be installed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Game {
    /// Official Steam id.
    pub id: String,
    /// Display name. May be empty when the title only appears in the local
    /// categories file, and may contain Unicode characters.
    pub name: String,
    /// Tags, including user-created categories and Steam's "Favorite" tag.
    /// Order is significant for overlay composition; duplicates are allowed.
    pub tags: Vec<String>,
    /// Path of the working grid image, assigned once resolution starts.
    pub image_path: Option<PathBuf>,
    /// Raw bytes of the encoded image (usually jpg). Overwritten by each
    /// overlay composition.
    pub image_bytes: Option<Vec<u8>>,
}

impl Game {
    /// Returns the display name, or a synthesized label when the name is
    /// unknown.
    pub fn display_label(&self) -> String {
        if self.name.is_empty() {
            format!("unknown game with id {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

/// Raw artwork returned by a source, with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkPayload {
    pub bytes: Vec<u8>,
    /// True when the image came from a best-effort text search rather than a
    /// canonical per-title endpoint. Flagged for user review.
    pub from_search: bool,
}

/// Outcome of a cache lookup or fetch for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Found { from_search: bool },
    NotFound,
}
