//! Steam installation probing and library enumeration.
//!
//! Finds the local Steam directory, lists its users, and gathers each user's
//! game list from the public community profile plus the local categories
//! file. The upstream formats are undocumented; parsing is best-effort
//! pattern matching and tolerates missing names and tags.

pub mod library;
pub mod paths;
#[cfg(unix)]
pub mod paths_unix;
#[cfg(target_os = "windows")]
pub mod paths_windows;
pub mod users;

// Re-export primary types.
pub use library::Library;
pub use paths::Paths;
pub use users::{User, get_users};

/// Errors for Steam probing and enumeration.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("profile not found; make sure the Steam profile is public")]
    ProfileNotFound,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
