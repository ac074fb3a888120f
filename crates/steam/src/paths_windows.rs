use std::path::PathBuf;

use crate::SteamError;

/// Returns the Steam base directory on Windows.
///
/// Handles internationalized systems, 32 and 64 bit installs, and users who
/// moved their Program Files folder.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    for var in ["ProgramFiles(x86)", "ProgramFiles"] {
        let Some(program_files) = std::env::var_os(var) else {
            continue;
        };
        let steam_dir = PathBuf::from(program_files).join("Steam");
        if steam_dir.exists() {
            return Ok(steam_dir);
        }
    }

    Err(SteamError::NotFound)
}
