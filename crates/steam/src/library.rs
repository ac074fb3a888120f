//! Game library enumeration.
//!
//! The game list comes from the user's public community profile page, and
//! category tags come from the local sharedconfig.vdf. Both are undocumented
//! formats extracted by pattern matching, so everything here tolerates
//! missing pieces: games without names, games without tags, and tags for
//! games the profile never mentioned.

use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use steamgrid_grid::Game;

use crate::SteamError;
use crate::paths::Paths;
use crate::users::User;

const COMMUNITY_BASE: &str = "http://steamcommunity.com";

/// The Steam website has the terrible habit of returning 200 OK when
/// requests fail, signaling the error in HTML. We check for the message and
/// cross our fingers that it doesn't change.
const PROFILE_ERROR_MESSAGE: &str = "The specified profile could not be found.";

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Game declarations in the public profile. It's JSON embedded in
/// Javascript, but this way is easier to extract.
static PROFILE_GAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{"appid":\s*(\d+),\s*"name":\s*"(.+?)""#).expect("profile pattern is valid")
});

/// VDF shape: "appid" { ... "tags" { "0" "category" } }
static GAME_TAGS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([0-9]+)"\s*\{[^}]+?"tags"\s*\{([^}]+?)\}"#).expect("tags pattern is valid")
});

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[0-9]+"\s*"(.+?)""#).expect("tag pattern is valid"));

/// Fetches game lists from the Steam community site.
pub struct Library {
    http: reqwest::Client,
    community_base: String,
}

impl Library {
    /// Creates a library client against the Steam community site.
    pub fn new() -> Result<Self, SteamError> {
        let http = reqwest::Client::builder()
            .timeout(RESPONSE_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            community_base: COMMUNITY_BASE.to_string(),
        })
    }

    /// Replaces the community site base URL.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.community_base = base.into();
        self
    }

    /// Returns all games of a user, merging the public profile's game list
    /// with the categories stored in the local sharedconfig.vdf.
    pub async fn get_games(&self, paths: &Paths, user: &User) -> Result<Vec<Game>, SteamError> {
        let profile = self.fetch_profile(user).await?;
        let mut games = parse_profile_games(&profile);

        let shared_config_path = paths.shared_config_path(&user.steam_id32);
        if shared_config_path.exists() {
            let text = fs::read(&shared_config_path)?;
            merge_shared_config_tags(&String::from_utf8_lossy(&text), &mut games);
        } else {
            tracing::debug!(user = %user.steam_id32, "no categories file, skipping tags");
        }

        Ok(games.into_values().collect())
    }

    /// Returns the HTML profile page of a user.
    async fn fetch_profile(&self, user: &User) -> Result<String, SteamError> {
        let url = format!(
            "{}/profiles/{}/games?tab=all",
            self.community_base, user.steam_id64
        );
        let resp = self.http.get(&url).send().await?;
        if resp.status().as_u16() >= 400 {
            return Err(SteamError::ProfileNotFound);
        }

        let profile = resp.text().await?;
        if profile.contains(PROFILE_ERROR_MESSAGE) {
            return Err(SteamError::ProfileNotFound);
        }

        Ok(profile)
    }
}

/// Extracts the game list embedded in a profile page, keyed by game id.
pub fn parse_profile_games(profile: &str) -> BTreeMap<String, Game> {
    let mut games = BTreeMap::new();
    for caps in PROFILE_GAME_PATTERN.captures_iter(profile) {
        let id = caps[1].to_string();
        games.insert(
            id.clone(),
            Game {
                id,
                name: caps[2].to_string(),
                ..Default::default()
            },
        );
    }
    games
}

/// Merges category tags from a sharedconfig.vdf body into the game map.
///
/// Tags for a game id the profile didn't list create a new entry without a
/// name; the artwork search copes with that downstream.
pub fn merge_shared_config_tags(shared_config: &str, games: &mut BTreeMap<String, Game>) {
    for game_caps in GAME_TAGS_PATTERN.captures_iter(shared_config) {
        let game_id = &game_caps[1];
        let tags_text = &game_caps[2];

        for tag_caps in TAG_PATTERN.captures_iter(tags_text) {
            let tag = tag_caps[1].to_string();
            games
                .entry(game_id.to_string())
                .or_insert_with(|| Game {
                    id: game_id.to_string(),
                    ..Default::default()
                })
                .tags
                .push(tag);
        }
    }
}
