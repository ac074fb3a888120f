//! Multi-source artwork resolution.
//!
//! Tries a fixed priority list of sources for a game's cover image and
//! short-circuits on the first hit: the Akamai CDN, the Steam CDN, and
//! finally a best-effort image search by game name. The search result is
//! flagged so callers can report lower-confidence images.

use std::time::Duration;

use once_cell::sync::Lazy;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use reqwest::StatusCode;

use crate::error::GridError;
use crate::types::{ArtworkPayload, Game};

/// Primary CDN for grid images. Found to contain more images and answer
/// faster than the Steam CDN.
const AKAMAI_BASE: &str = "https://steamcdn-a.akamaihd.net";

const STEAM_CDN_BASE: &str = "http://cdn.steampowered.com";

/// Deprecated search API, last resort only. The request volume from a single
/// library run is small enough not to trigger any rate limiting.
const SEARCH_BASE: &str = "https://ajax.googleapis.com";

/// Applied per request; a source that stalls longer than this counts as
/// unreachable.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Matches a 460x215 result entry in the search response. Deliberately loose;
/// the endpoint is undocumented.
static SEARCH_RESULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""width":"460","height":"215",[^}]+"unescapedUrl":"(.+?)""#)
        .expect("search result pattern is valid")
});

/// Resolves artwork for a game by trying sources in priority order.
pub struct SourceResolver {
    http: reqwest::Client,
    primary_base: String,
    secondary_base: String,
    search_base: String,
}

impl SourceResolver {
    /// Creates a resolver with the default endpoints.
    pub fn new() -> Result<Self, GridError> {
        let http = reqwest::Client::builder()
            .timeout(RESPONSE_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            primary_base: AKAMAI_BASE.to_string(),
            secondary_base: STEAM_CDN_BASE.to_string(),
            search_base: SEARCH_BASE.to_string(),
        })
    }

    /// Replaces the endpoint base URLs, keeping the path templates.
    pub fn with_bases(
        mut self,
        primary: impl Into<String>,
        secondary: impl Into<String>,
        search: impl Into<String>,
    ) -> Self {
        self.primary_base = primary.into();
        self.secondary_base = secondary.into();
        self.search_base = search.into();
        self
    }

    /// Tries each source in order and returns the first hit.
    ///
    /// `Ok(None)` means no source has artwork for this game, which is an
    /// expected outcome. Unexpected HTTP statuses abort resolution with an
    /// error instead of falling through to lower-priority sources.
    pub async fn resolve(&self, game: &Game) -> Result<Option<ArtworkPayload>, GridError> {
        if let Some(bytes) = self.try_download(&self.primary_url(&game.id)).await? {
            return Ok(Some(ArtworkPayload {
                bytes,
                from_search: false,
            }));
        }

        if let Some(bytes) = self.try_download(&self.secondary_url(&game.id)).await? {
            return Ok(Some(ArtworkPayload {
                bytes,
                from_search: false,
            }));
        }

        // Without a name there is nothing to search for.
        if game.name.is_empty() {
            return Ok(None);
        }

        let Some(candidate) = self.search_image_url(&game.name).await? else {
            return Ok(None);
        };
        if let Some(bytes) = self.try_download(&candidate).await? {
            return Ok(Some(ArtworkPayload {
                bytes,
                from_search: true,
            }));
        }

        Ok(None)
    }

    /// Fetches a URL, returning `None` when this source should be skipped.
    ///
    /// DNS/connect failures and 404 mean the source has nothing for us; any
    /// other status >= 400 is a hard error worth reporting.
    async fn try_download(&self, url: &str) -> Result<Option<Vec<u8>>, GridError> {
        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(url, error = %e, "source unreachable, trying next");
                return Ok(None);
            }
        };

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status.as_u16() >= 400 {
            return Err(GridError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Some(resp.bytes().await?.to_vec()))
    }

    /// Returns the first grid-sized image URL found by searching for the game
    /// name, if any.
    async fn search_image_url(&self, name: &str) -> Result<Option<String>, GridError> {
        let Some(body) = self.try_download(&self.search_url(name)).await? else {
            return Ok(None);
        };

        let text = String::from_utf8_lossy(&body);
        Ok(SEARCH_RESULT_PATTERN
            .captures(&text)
            .map(|caps| caps[1].to_string()))
    }

    fn primary_url(&self, game_id: &str) -> String {
        format!("{}/steam/apps/{game_id}/header.jpg", self.primary_base)
    }

    fn secondary_url(&self, game_id: &str) -> String {
        format!("{}/v/gfx/apps/{game_id}/header.jpg", self.secondary_base)
    }

    fn search_url(&self, name: &str) -> String {
        let term = format!("steam grid OR header{name}");
        let query = utf8_percent_encode(&term, NON_ALPHANUMERIC);
        format!(
            "{}/ajax/services/search/images?v=1.0&rsz=8&q={query}",
            self.search_base
        )
    }
}
