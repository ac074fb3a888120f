//! Category overlay loading and compositing.
//!
//! Overlays are small translucent images named after a game category. They
//! are loaded once per run into an immutable map and composited onto the
//! working copy of any game whose tags match.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage, imageops};

use crate::error::GridError;
use crate::types::Game;

/// Overlay images keyed by normalized category name.
pub type OverlayMap = HashMap<String, DynamicImage>;

/// Re-encode quality for composited working copies.
const JPEG_QUALITY: u8 = 90;

/// Normalizes a tag or overlay filename stem for matching: lower-cased, with
/// one trailing "s" stripped so singular and plural variants collide.
pub fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    match lower.strip_suffix('s') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Loads every overlay image in `dir`, keyed by normalized filename stem.
///
/// A missing directory is a valid empty configuration. Entries are loaded in
/// filename order, so a collision between normalized names deterministically
/// keeps the lexicographically later file.
pub fn load_overlays(dir: &Path) -> Result<OverlayMap, GridError> {
    let mut overlays = OverlayMap::new();

    if !dir.exists() {
        tracing::info!(dir = %dir.display(), "no overlay directory, continuing without overlays");
        return Ok(overlays);
    }

    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let img = image::open(&path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        overlays.insert(normalize_name(&stem), img);
    }

    Ok(overlays)
}

/// Composites matching overlays onto the game's artwork, one per matching
/// tag in tag order, then rewrites the working copy.
///
/// Games without resolved artwork pass through untouched. The backup file is
/// never written here. Tags without a matching overlay are skipped; matches
/// stack, each compositing over the previous result.
pub fn apply_overlay(mut game: Game, overlays: &OverlayMap) -> Result<Game, GridError> {
    let Some(path) = game.image_path.clone() else {
        return Ok(game);
    };
    let Some(mut bytes) = game.image_bytes.take() else {
        return Ok(game);
    };

    for tag in &game.tags {
        let Some(overlay) = overlays.get(&normalize_name(tag)) else {
            continue;
        };
        bytes = compose(&bytes, overlay)?;
    }

    fs::write(&path, &bytes)?;
    game.image_bytes = Some(bytes);
    Ok(game)
}

/// Draws `overlay` over the decoded `bytes` on a canvas sized to the union of
/// both bounding boxes and re-encodes the result as JPEG.
fn compose(bytes: &[u8], overlay: &DynamicImage) -> Result<Vec<u8>, GridError> {
    let base = image::load_from_memory(bytes)?.into_rgba8();
    let top = overlay.to_rgba8();

    let width = base.width().max(top.width());
    let height = base.height().max(top.height());
    let mut canvas = RgbaImage::new(width, height);

    imageops::replace(&mut canvas, &base, 0, 0);
    imageops::overlay(&mut canvas, &top, 0, 0);

    let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode_image(&rgb)?;
    Ok(out)
}
