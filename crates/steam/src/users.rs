use std::fs;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::SteamError;
use crate::paths::Paths;

/// Used to convert between SteamId32 and SteamId64.
const ID_CONVERSION_CONSTANT: u64 = 76_561_197_960_265_728;

static PERSONA_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""PersonaName"\s*"(.+?)""#).expect("persona pattern is valid"));

/// A user in the local Steam installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub steam_id32: String,
    pub steam_id64: String,
}

/// Returns all users of this Steam installation.
///
/// A user directory without a readable localconfig.vdf is skipped: without it
/// there is no username to report and no profile to fetch. The grid directory
/// is created for every user returned.
pub fn get_users(paths: &Paths) -> Result<Vec<User>, SteamError> {
    let entries = fs::read_dir(paths.user_data_dir())?;

    let mut users = Vec::new();
    for entry in entries {
        let entry = entry?;
        let user_id = entry.file_name().to_string_lossy().into_owned();

        let Ok(steam_id32) = user_id.parse::<u64>() else {
            continue;
        };

        let config_path = paths.local_config_path(&user_id);
        if !config_path.exists() {
            tracing::debug!(user = %user_id, "no localconfig.vdf, skipping user dir");
            continue;
        }

        let config = fs::read(&config_path)?;
        let config = String::from_utf8_lossy(&config);
        let Some(caps) = PERSONA_NAME_PATTERN.captures(&config) else {
            continue;
        };
        let name = caps[1].to_string();

        // Directory names near u64::MAX are not real account ids.
        let Some(steam_id64) = steam_id32.checked_add(ID_CONVERSION_CONSTANT) else {
            tracing::debug!(user = %user_id, "id out of range, skipping user dir");
            continue;
        };
        let steam_id64 = steam_id64.to_string();

        paths.ensure_grid_dir(&user_id)?;

        users.push(User {
            name,
            steam_id32: user_id,
            steam_id64,
        });
    }

    Ok(users)
}
