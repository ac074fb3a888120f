//! Final run report.

use serde::{Deserialize, Serialize};
use steamgrid_grid::Game;
use std::fmt::Write;

/// A lightweight reference to a processed game, kept for reporting after the
/// full game record is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRef {
    pub id: String,
    pub name: String,
}

impl GameRef {
    /// Returns the display name, or a synthesized label when unknown.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("unknown game with id {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

impl From<&Game> for GameRef {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id.clone(),
            name: game.name.clone(),
        }
    }
}

/// Accumulated outcome of a pipeline run, for the notification layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Games for which no source had artwork.
    pub not_found: Vec<GameRef>,
    /// Games whose artwork came from the low-confidence search fallback.
    pub search_found: Vec<GameRef>,
}

impl RunReport {
    /// True when every game got artwork from a canonical source.
    pub fn is_clean(&self) -> bool {
        self.not_found.is_empty() && self.search_found.is_empty()
    }

    /// Renders the human-readable end-of-run message.
    pub fn summary(&self) -> String {
        let mut message = String::new();

        if self.is_clean() {
            message.push_str("All grid images downloaded and overlays applied!\n\n");
        } else {
            if !self.search_found.is_empty() {
                let _ = writeln!(
                    message,
                    "{} images were found with a search and may not be accurate:",
                    self.search_found.len()
                );
                for game in &self.search_found {
                    let _ = writeln!(message, "* {} (steam id {})", game.label(), game.id);
                }
                message.push_str("\n\n");
            }

            if !self.not_found.is_empty() {
                let _ = writeln!(
                    message,
                    "{} images could not be found anywhere:",
                    self.not_found.len()
                );
                for game in &self.not_found {
                    let _ = writeln!(message, "* {} (steam id {})", game.label(), game.id);
                }
                message.push_str("\n\n");
            }
        }

        message.push_str("Open Steam in grid view to see the results!");
        message
    }
}
