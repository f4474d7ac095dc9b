//! Exclusive, scoped access to the world.
//!
//! Every access, read or write, takes the same lock for its whole duration,
//! so callers always see a consistent world and concurrent operations run in
//! some total order. A mutating scope that returns `Ok` is written to the
//! snapshot store before the lock is released; a scope that returns `Err`
//! writes nothing.
//!
//! An `Err` does not roll back in-memory changes. Scopes must finish every
//! check before touching the world.

use parking_lot::Mutex;

use super::catalog::GameCatalog;
use super::store::{SnapshotStore, StoreError};
use super::world::World;

/// Whether a scope may change the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Mutate,
}

/// The world behind a lock, paired with the store it persists to.
#[derive(Debug)]
pub struct GuardedWorld<S> {
    world: Mutex<World>,
    store: S,
}

impl<S: SnapshotStore> GuardedWorld<S> {
    /// Wrap an already-built world.
    pub fn new(world: World, store: S) -> Self {
        Self {
            world: Mutex::new(world),
            store,
        }
    }

    /// Load the last snapshot from `store`, or start empty if there is none.
    ///
    /// A snapshot that fails to parse or violates the world invariants is an
    /// error; the lobby must not start on it.
    pub fn open(store: S, catalog: &GameCatalog) -> Result<Self, StoreError> {
        let world = match store.load()? {
            Some(world) => {
                world.validate(catalog)?;
                tracing::info!(
                    players = world.players.len(),
                    session = world.session.is_some(),
                    "Loaded world snapshot"
                );
                world
            }
            None => {
                tracing::info!("No world snapshot found, starting empty");
                World::new()
            }
        };
        Ok(Self::new(world, store))
    }

    /// Run `f` with exclusive access to the world.
    ///
    /// With [`Access::Mutate`], a successful scope is persisted unless the
    /// world has persistence turned off. A failed write is returned as the
    /// scope's error; the in-memory change stays applied.
    pub fn with_world<T, E, F>(&self, access: Access, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut World) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut world = self.world.lock();
        let value = f(&mut *world)?;

        if access == Access::Mutate && world.persists() {
            if let Err(e) = self.store.save(&world) {
                tracing::error!(error = %e, "Failed to persist world snapshot");
                return Err(e.into());
            }
        }

        Ok(value)
    }

    /// Run a read-only scope.
    pub fn read<T>(&self, f: impl FnOnce(&World) -> T) -> T {
        let world = self.world.lock();
        f(&*world)
    }

    /// Clone of the current world.
    pub fn snapshot(&self) -> World {
        self.read(World::clone)
    }

    /// Stop writing snapshots for the rest of this world's life.
    pub fn force_no_persist(&self) {
        self.world.lock().no_persist = true;
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::player::Player;
    use crate::state::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    enum TestError {
        Rejected,
        Store,
    }

    impl From<StoreError> for TestError {
        fn from(_: StoreError) -> Self {
            Self::Store
        }
    }

    fn add_ann(world: &mut World) -> Result<(), TestError> {
        world.insert_player(Player::new("Ann".into()));
        Ok(())
    }

    #[test]
    fn test_open_empty_store() {
        let guarded = GuardedWorld::open(MemoryStore::new(), &GameCatalog::default()).unwrap();
        assert_eq!(guarded.snapshot(), World::new());
    }

    #[test]
    fn test_open_rejects_invalid_snapshot() {
        let mut world = World::new();
        world.insert_player(Player::new("Ann".into()));
        world.insert_player(Player::new("Ann".into()));

        let result = GuardedWorld::open(MemoryStore::with_snapshot(world), &GameCatalog::default());
        assert!(matches!(result, Err(StoreError::Invalid(_))));
    }

    #[test]
    fn test_mutate_persists() {
        let guarded = GuardedWorld::new(World::new(), MemoryStore::new());
        guarded.with_world(Access::Mutate, add_ann).unwrap();

        assert_eq!(guarded.store().save_count(), 1);
        assert_eq!(guarded.store().snapshot(), Some(guarded.snapshot()));
    }

    #[test]
    fn test_read_does_not_persist() {
        let guarded = GuardedWorld::new(World::new(), MemoryStore::new());
        let count = guarded
            .with_world(Access::Read, |w| Ok::<_, TestError>(w.players.len()))
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(guarded.store().save_count(), 0);
    }

    #[test]
    fn test_error_does_not_persist() {
        let guarded = GuardedWorld::new(World::new(), MemoryStore::new());
        let result: Result<(), TestError> =
            guarded.with_world(Access::Mutate, |_| Err(TestError::Rejected));

        assert!(matches!(result, Err(TestError::Rejected)));
        assert_eq!(guarded.store().save_count(), 0);
    }

    #[test]
    fn test_no_persist_world_skips_store() {
        let guarded = GuardedWorld::new(World::ephemeral(), MemoryStore::new());
        guarded.with_world(Access::Mutate, add_ann).unwrap();

        assert_eq!(guarded.store().save_count(), 0);
        assert_eq!(guarded.snapshot().players.len(), 1);
    }

    #[test]
    fn test_write_failure_keeps_mutation() {
        let guarded = GuardedWorld::new(World::new(), MemoryStore::new());
        guarded.store().set_fail_writes(true);

        let result = guarded.with_world(Access::Mutate, add_ann);
        assert!(matches!(result, Err(TestError::Store)));
        assert_eq!(guarded.snapshot().players.len(), 1);
        assert_eq!(guarded.store().snapshot(), None);
    }
}
