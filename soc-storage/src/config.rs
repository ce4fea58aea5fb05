//! Database location configuration
//!
//! The study database ships next to the application as
//! `<install root>/soc_data/soc_data.db`. Environment variables:
//! - `SOC_DB_PATH`: explicit database file path (wins over everything else)
//! - `SOC_HOME`: install root (default: directory of the running executable)
//! - `SOC_DB_BUSY_TIMEOUT_MS`: how long a read waits on a locked file (default: 5000)

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding the database file, relative to the install root.
pub const DATA_DIR: &str = "soc_data";

/// Database file name inside [`DATA_DIR`].
pub const DB_FILE: &str = "soc_data.db";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Where the study database lives and how connections to it behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Database file path
    pub path: PathBuf,
    /// Busy timeout applied to every connection
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// Configuration for a database at `path` with default timeouts.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    /// Create a configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup("SOC_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_db_path(&install_root_from(&lookup)));

        let busy_timeout = Duration::from_millis(
            lookup("SOC_DB_BUSY_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        );

        Self { path, busy_timeout }
    }
}

/// `<root>/soc_data/soc_data.db`
pub fn default_db_path(root: &Path) -> PathBuf {
    root.join(DATA_DIR).join(DB_FILE)
}

/// Install root taken from the process environment.
pub fn install_root() -> PathBuf {
    install_root_from(|key| std::env::var(key).ok())
}

fn install_root_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(home) = lookup("SOC_HOME").filter(|h| !h.trim().is_empty()) {
        return PathBuf::from(home);
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
