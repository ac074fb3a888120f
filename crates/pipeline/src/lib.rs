//! Sequential artwork pipeline.
//!
//! For every user and every game: check the cache, fetch artwork when
//! missing, persist it, composite overlays, and record the outcome. The
//! first hard error from any game aborts the whole run; absent artwork is an
//! expected outcome collected for the final report.

pub mod driver;
pub mod report;

pub use driver::{GameSource, Pipeline, PipelineEvent};
pub use report::{GameRef, RunReport};

use steamgrid_grid::GridError;
use steamgrid_steam::SteamError;

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("steam error: {0}")]
    Steam(#[from] SteamError),

    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}
