//! Disk cache for grid images.
//!
//! Each game gets two files in the grid directory: a working copy that
//! overlays are composited onto, and a pristine backup that is written once
//! and never modified afterwards. The backup keeps overlay compositing
//! repeatable from a known-good original across runs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GridError;
use crate::sources::SourceResolver;
use crate::types::{FetchOutcome, Game};

/// Cache of working and backup grid images inside one grid directory.
pub struct GridCache {
    grid_dir: PathBuf,
}

impl GridCache {
    pub fn new(grid_dir: impl Into<PathBuf>) -> Self {
        Self {
            grid_dir: grid_dir.into(),
        }
    }

    pub fn grid_dir(&self) -> &Path {
        &self.grid_dir
    }

    /// Returns the working image path for a game.
    pub fn image_path(&self, game_id: &str) -> PathBuf {
        self.grid_dir.join(format!("{game_id}.jpg"))
    }

    /// Returns the pristine backup path for a game.
    pub fn backup_path(&self, game_id: &str) -> PathBuf {
        self.grid_dir.join(format!("{game_id} (original).jpg"))
    }

    /// Loads the game's artwork from cache, fetching it when absent.
    ///
    /// Cache states, in order:
    /// - backup present: the backup is the authoritative original; load it
    ///   without touching the network.
    /// - working copy only: a legacy cache state. The working copy is treated
    ///   as pristine and backed up before anything composites over it.
    /// - neither: resolve via `resolver`, then write the working copy and the
    ///   backup. A crash between the two writes leaves the backup missing,
    ///   which the next run repairs through the legacy path above.
    pub async fn resolve_or_fetch(
        &self,
        resolver: &SourceResolver,
        mut game: Game,
    ) -> Result<(Game, FetchOutcome), GridError> {
        let image_path = self.image_path(&game.id);
        let backup_path = self.backup_path(&game.id);
        game.image_path = Some(image_path.clone());

        if backup_path.exists() {
            game.image_bytes = Some(fs::read(&backup_path)?);
            return Ok((game, FetchOutcome::Found { from_search: false }));
        }

        if image_path.exists() {
            let bytes = fs::read(&image_path)?;
            fs::write(&backup_path, &bytes)?;
            game.image_bytes = Some(bytes);
            return Ok((game, FetchOutcome::Found { from_search: false }));
        }

        let Some(payload) = resolver.resolve(&game).await? else {
            return Ok((game, FetchOutcome::NotFound));
        };

        fs::write(&image_path, &payload.bytes)?;
        fs::write(&backup_path, &payload.bytes)?;
        tracing::debug!(game = %game.id, from_search = payload.from_search, "artwork fetched");

        let from_search = payload.from_search;
        game.image_bytes = Some(payload.bytes);
        Ok((game, FetchOutcome::Found { from_search }))
    }
}
