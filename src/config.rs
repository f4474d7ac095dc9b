//! Lobby configuration.
//!
//! ```toml
//! snapshot = "/var/lib/tabletop/lobby.json"
//! no_persist = false
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::state::{GameCatalog, JsonFileStore, Lobby, StoreError};

/// Default snapshot file name.
pub const SNAPSHOT_FILENAME: &str = "lobby.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_snapshot() -> PathBuf {
    PathBuf::from(SNAPSHOT_FILENAME)
}

/// Where the world lives and whether it is written back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LobbyConfig {
    /// Snapshot file path
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,

    /// Never write the snapshot, even after mutations
    #[serde(default)]
    pub no_persist: bool,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
            no_persist: false,
        }
    }
}

impl LobbyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn open_store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.snapshot)
    }

    /// Load the snapshot and build the lobby.
    pub fn open_lobby(&self, catalog: GameCatalog) -> Result<Lobby<JsonFileStore>, StoreError> {
        let lobby = Lobby::open(self.open_store(), catalog)?;
        if self.no_persist {
            lobby.guarded().force_no_persist();
        }
        tracing::info!(
            snapshot = %self.snapshot.display(),
            persist = !self.no_persist,
            "Lobby opened"
        );
        Ok(lobby)
    }
}

/// Pick the snapshot file.
///
/// Without an explicit path, prefer `lobby.json` in `cwd` when it exists and
/// fall back to `home`. An explicit directory (or a path ending in a
/// separator) gets the default file name appended.
pub fn resolve_snapshot_path(explicit: Option<&Path>, cwd: &Path, home: &Path) -> PathBuf {
    match explicit {
        None => {
            let local = cwd.join(SNAPSHOT_FILENAME);
            if local.is_file() {
                local
            } else {
                home.join(SNAPSHOT_FILENAME)
            }
        }
        Some(path) => {
            let ends_with_separator = path
                .to_str()
                .is_some_and(|s| s.ends_with(std::path::MAIN_SEPARATOR) || s.ends_with('/'));
            if ends_with_separator || path.is_dir() {
                path.join(SNAPSHOT_FILENAME)
            } else {
                path.to_path_buf()
            }
        }
    }
}
