//! Grid artwork pipeline core.
//!
//! Resolves cover art for Steam games from a prioritized list of sources,
//! maintains a pristine backup next to each working image, and composites
//! category overlays onto the working copy.

pub mod cache;
pub mod error;
pub mod overlay;
pub mod sources;
pub mod types;

pub use cache::GridCache;
pub use error::GridError;
pub use overlay::{OverlayMap, apply_overlay, load_overlays, normalize_name};
pub use sources::SourceResolver;
pub use types::{ArtworkPayload, FetchOutcome, Game};
