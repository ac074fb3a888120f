//! Grid pipeline error types.

/// Errors produced while resolving, caching, or compositing artwork.
///
/// A game without artwork anywhere is not an error; that outcome is carried
/// by [`crate::types::FetchOutcome::NotFound`].
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("failed to download image {url}: HTTP {status}")]
    Download { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
