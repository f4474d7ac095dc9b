//! Durable storage for the world snapshot.
//!
//! The whole world is read once at startup and rewritten in full after each
//! successful mutation. [`JsonFileStore`] is the on-disk store;
//! [`MemoryStore`] keeps the snapshot in process for ephemeral lobbies and
//! tests.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use super::world::World;

/// Failures reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid snapshot: {0}")]
    Invalid(String),

    #[error("snapshot write rejected: {0}")]
    Unavailable(String),
}

/// Where the world snapshot lives.
pub trait SnapshotStore: Send + Sync {
    /// Read the last snapshot, or `None` if nothing was ever written.
    fn load(&self) -> Result<Option<World>, StoreError>;

    /// Overwrite the snapshot with `world`.
    fn save(&self, world: &World) -> Result<(), StoreError>;
}

/// Snapshot stored as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Serialize with four-space indentation.
pub fn to_snapshot_json(world: &World) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    world.serialize(&mut ser)?;
    Ok(buf)
}

/// Parse a snapshot document.
///
/// Only an object is a snapshot. Derived struct deserializers also accept
/// sequences, so the object shape of the world, each player and the session
/// is checked before conversion.
pub fn parse_snapshot(bytes: &[u8]) -> Result<World, StoreError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let Some(root) = value.as_object() else {
        return Err(StoreError::Invalid("snapshot is not a JSON object".into()));
    };

    if let Some(players) = root.get("players") {
        let Some(players) = players.as_object() else {
            return Err(StoreError::Invalid("players is not a JSON object".into()));
        };
        if let Some((key, _)) = players.iter().find(|(_, player)| !player.is_object()) {
            return Err(StoreError::Invalid(format!("player {} is not a JSON object", key)));
        }
    }

    for key in ["session", "game"] {
        if let Some(session) = root.get(key) {
            if !session.is_object() {
                return Err(StoreError::Invalid(format!("{} is not a JSON object", key)));
            }
        }
    }

    Ok(serde_json::from_value(value)?)
}

impl JsonFileStore {
    /// Write the new snapshot through `write` into a temporary file beside
    /// the snapshot, then rename it over the snapshot. The old snapshot is
    /// untouched unless the whole new one made it to disk.
    fn replace_with<F>(&self, write: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        write(temp.as_file_mut()).map_err(|e| self.io_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        temp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::debug!(path = %self.path.display(), "World snapshot saved");
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<World>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        parse_snapshot(&bytes).map(Some)
    }

    fn save(&self, world: &World) -> Result<(), StoreError> {
        let json = to_snapshot_json(world)?;
        self.replace_with(|file| file.write_all(&json))
    }
}

/// In-process snapshot holder.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<World>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_snapshot(world: World) -> Self {
        Self {
            snapshot: Mutex::new(Some(world)),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub(crate) fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far (diagnostics).
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The last written snapshot.
    pub fn snapshot(&self) -> Option<World> {
        self.snapshot.lock().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<World>, StoreError> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, world: &World) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is failing writes".into()));
        }
        *self.snapshot.lock() = Some(world.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::player::{Player, PlayerId};
    use pretty_assertions::assert_eq;

    fn sample_world() -> World {
        let mut world = World::new();
        world.insert_player(Player::with_id(PlayerId::from("a"), "Ann".into()));
        world
    }

    #[test]
    fn test_file_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lobby.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lobby.json"));

        let world = sample_world();
        store.save(&world).unwrap();
        assert_eq!(store.load().unwrap(), Some(world));

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("{\n    \"players\": {\n        \"a\": {"));
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lobby.json"));

        store.save(&sample_world()).unwrap();
        store.save(&World::new()).unwrap();
        assert_eq!(store.load().unwrap(), Some(World::new()));
    }

    #[test]
    fn test_file_store_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lobby.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_file_store_rejects_non_object_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lobby.json");
        let store = JsonFileStore::new(&path);

        for text in [
            "[]",
            "[{}]",
            "null",
            r#"{"players": []}"#,
            r#"{"players": {"a": ["a", "Ann"]}}"#,
            r#"{"players": {}, "session": ["Checkers", []]}"#,
            r#"{"players": {}, "game": ["Checkers", []]}"#,
        ] {
            fs::write(&path, text).unwrap();
            assert!(
                matches!(store.load(), Err(StoreError::Invalid(_))),
                "accepted {}",
                text
            );
        }
    }

    #[test]
    fn test_file_store_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lobby.json");
        let store = JsonFileStore::new(&path);

        fs::write(&path, r#"{"players": {}, "sesion": {"gameName": "Checkers", "players": []}}"#)
            .unwrap();
        assert!(matches!(store.load(), Err(StoreError::Json(_))));

        fs::write(&path, r#"{"players": {"a": {"id": "a", "name": "Ann", "nick": "A"}}}"#).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_failed_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lobby.json"));
        store.save(&sample_world()).unwrap();

        let mut bigger = sample_world();
        bigger.insert_player(Player::with_id(PlayerId::from("b"), "Bob".into()));
        let json = to_snapshot_json(&bigger).unwrap();

        let result = store.replace_with(|file| {
            file.write_all(&json[..json.len() / 2])?;
            Err(io::Error::other("disk full"))
        });
        assert!(matches!(result, Err(StoreError::Io { .. })));

        assert_eq!(store.load().unwrap(), Some(sample_world()));
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_file_store_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing").join("lobby.json"));
        assert!(matches!(store.save(&World::new()), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_memory_store_failure_injection() {
        let store = MemoryStore::new();
        store.save(&sample_world()).unwrap();
        assert_eq!(store.save_count(), 1);

        store.set_fail_writes(true);
        assert!(matches!(store.save(&World::new()), Err(StoreError::Unavailable(_))));
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot(), Some(sample_world()));
    }
}
