use std::fs;
use std::path::{Path, PathBuf};

use crate::SteamError;

/// Provides access to Steam directory paths.
#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Creates a new `Paths` instance with auto-detected Steam directory.
    pub fn new() -> Result<Self, SteamError> {
        let base_dir = get_base_dir()?;
        Ok(Self { base_dir })
    }

    /// Creates a new `Paths` instance with a custom base directory.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the Steam base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the userdata directory.
    pub fn user_data_dir(&self) -> PathBuf {
        self.base_dir.join("userdata")
    }

    /// Returns the directory for a specific user.
    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        self.user_data_dir().join(user_id)
    }

    /// Returns the config directory for a user.
    pub fn config_dir(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("config")
    }

    /// Returns the path to localconfig.vdf for a user.
    pub fn local_config_path(&self, user_id: &str) -> PathBuf {
        self.config_dir(user_id).join("localconfig.vdf")
    }

    /// Returns the path to the categories file for a user.
    ///
    /// The "7" segment is the app id of the Steam client itself.
    pub fn shared_config_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id)
            .join("7")
            .join("remote")
            .join("sharedconfig.vdf")
    }

    /// Returns the grid artwork directory for a user.
    pub fn grid_dir(&self, user_id: &str) -> PathBuf {
        self.config_dir(user_id).join("grid")
    }

    /// Creates the grid directory if it doesn't exist.
    pub fn ensure_grid_dir(&self, user_id: &str) -> Result<(), SteamError> {
        let grid_dir = self.grid_dir(user_id);
        fs::create_dir_all(&grid_dir)?;

        // The Linux build of Steam ships the grid dir without the executable
        // bit, which denies access to everything inside it.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&grid_dir, fs::Permissions::from_mode(0o777))?;
        }

        Ok(())
    }
}

// Platform-specific base directory detection.
#[cfg(unix)]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_unix::get_base_dir()
}

#[cfg(target_os = "windows")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_windows::get_base_dir()
}

#[cfg(not(any(unix, target_os = "windows")))]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    Err(SteamError::NotFound)
}
