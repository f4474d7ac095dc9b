//! Lobby operations.
//!
//! [`Lobby`] owns the guarded world and the game catalog and exposes every
//! operation the request layer can invoke. Each operation holds the world
//! lock for its full duration, runs all of its checks, and only then
//! mutates. A rejected operation leaves the world exactly as it was.

use thiserror::Error;

use super::catalog::{GameCatalog, GameInclude, GameInfo};
use super::guard::{Access, GuardedWorld};
use super::player::{is_valid_name, Player, PlayerId};
use super::session::Session;
use super::store::{SnapshotStore, StoreError};
use super::world::World;

/// Expected, recoverable rejections. The tag from [`LobbyError::code`] is
/// what callers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("name already in use")]
    NameInUse,

    #[error("unknown player, or player not valid for this operation")]
    InvalidPlayer,

    #[error("invalid name")]
    InvalidName,

    #[error("a game is already set up")]
    InUse,

    #[error("no game in setup")]
    NotInSetup,

    #[error("no game in play")]
    NotInPlay,

    #[error("too many players")]
    TooManyPlayers,

    #[error("too few players")]
    TooFewPlayers,
}

impl LobbyError {
    /// Result tag reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NameInUse => "NameInUse",
            Self::InvalidPlayer => "InvalidPlayer",
            Self::InvalidName => "InvalidName",
            Self::InUse => "InUse",
            Self::NotInSetup => "NotInSetup",
            Self::NotInPlay => "NotInPlay",
            Self::TooManyPlayers => "TooManyPlayers",
            Self::TooFewPlayers => "TooFewPlayers",
        }
    }
}

/// Failure of a lobby operation: either a domain rejection or a storage
/// failure after the change was applied in memory.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Domain(#[from] LobbyError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl OperationError {
    /// The domain error, if this is one.
    pub fn domain(&self) -> Option<LobbyError> {
        match self {
            Self::Domain(e) => Some(*e),
            Self::Store(_) => None,
        }
    }
}

pub type LobbyResult<T> = Result<T, OperationError>;

fn reject<T>(operation: &'static str, error: LobbyError) -> LobbyResult<T> {
    tracing::debug!(operation, error = error.code(), "Operation rejected");
    Err(error.into())
}

/// Session setup, enrollment and turn-taking over one shared world.
#[derive(Debug)]
pub struct Lobby<S> {
    world: GuardedWorld<S>,
    catalog: GameCatalog,
}

impl<S: SnapshotStore> Lobby<S> {
    /// Build a lobby around an existing world.
    pub fn new(world: World, store: S, catalog: GameCatalog) -> Self {
        Self {
            world: GuardedWorld::new(world, store),
            catalog,
        }
    }

    /// Load the world from `store` (or start empty) and build a lobby.
    pub fn open(store: S, catalog: GameCatalog) -> Result<Self, StoreError> {
        let world = GuardedWorld::open(store, &catalog)?;
        Ok(Self { world, catalog })
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn guarded(&self) -> &GuardedWorld<S> {
        &self.world
    }

    /// Clone of the whole world.
    pub fn snapshot(&self) -> World {
        self.world.snapshot()
    }

    /// Supported games, sorted by name.
    pub fn list_games(&self) -> Vec<GameInfo> {
        self.catalog.sorted()
    }

    /// Register a new player under a unique, non-empty name.
    pub fn register_player(&self, name: &str) -> LobbyResult<Player> {
        self.world.with_world(Access::Mutate, |world| {
            if !is_valid_name(name) {
                return reject("register_player", LobbyError::InvalidName);
            }
            if world.name_in_use(name) {
                return reject("register_player", LobbyError::NameInUse);
            }

            let player = Player::new(name.to_string());
            world.insert_player(player.clone());
            tracing::info!(player = %player.id, name = %player.name, "Player registered");
            Ok(player)
        })
    }

    /// Look up a player by id.
    pub fn validate_player(&self, id: &PlayerId) -> LobbyResult<Player> {
        self.world.with_world(Access::Read, |world| match world.player(id) {
            Some(player) => Ok(player.clone()),
            None => reject("validate_player", LobbyError::InvalidPlayer),
        })
    }

    /// The current session, if any.
    pub fn session_state(&self) -> LobbyResult<Option<Session>> {
        self.world
            .with_world(Access::Read, |world| Ok(world.session.clone()))
    }

    /// Create a session for `game_name` with `id` as its first player.
    pub fn setup_session(&self, id: &PlayerId, game_name: &str) -> LobbyResult<()> {
        self.world.with_world(Access::Mutate, |world| {
            if !world.has_player(id) {
                return reject("setup_session", LobbyError::InvalidPlayer);
            }
            if !self.catalog.contains(game_name) {
                return reject("setup_session", LobbyError::InvalidName);
            }
            if world.session.is_some() {
                return reject("setup_session", LobbyError::InUse);
            }

            world.session = Some(Session::new(game_name.to_string(), id.clone()));
            tracing::info!(player = %id, game = game_name, "Session set up");
            Ok(())
        })
    }

    /// Add a player to the session being set up.
    pub fn enroll_player(&self, id: &PlayerId) -> LobbyResult<()> {
        self.world.with_world(Access::Mutate, |world| {
            if !world.has_player(id) {
                return reject("enroll_player", LobbyError::InvalidPlayer);
            }
            let Some(session) = world.session.as_mut().filter(|s| s.is_setup()) else {
                return reject("enroll_player", LobbyError::NotInSetup);
            };
            if session.is_enrolled(id) {
                return reject("enroll_player", LobbyError::InvalidPlayer);
            }
            let Some(game) = self.catalog.find(&session.game_name) else {
                return reject("enroll_player", LobbyError::InvalidName);
            };
            if session.player_count() >= game.max_players {
                return reject("enroll_player", LobbyError::TooManyPlayers);
            }

            session.players.push(id.clone());
            tracing::info!(player = %id, enrolled = session.player_count(), "Player enrolled");
            Ok(())
        })
    }

    /// Remove a player from the session being set up.
    pub fn withdraw_player(&self, id: &PlayerId) -> LobbyResult<()> {
        self.world.with_world(Access::Mutate, |world| {
            let Some(session) = world.session.as_mut().filter(|s| s.is_setup()) else {
                return reject("withdraw_player", LobbyError::NotInSetup);
            };
            if !session.is_enrolled(id) {
                return reject("withdraw_player", LobbyError::InvalidPlayer);
            }

            session.withdraw(id);
            tracing::info!(player = %id, enrolled = session.player_count(), "Player withdrew");
            Ok(())
        })
    }

    /// Start play. The first enrolled player takes the first turn.
    pub fn start_session(&self, id: &PlayerId) -> LobbyResult<()> {
        self.world.with_world(Access::Mutate, |world| {
            let Some(session) = world.session.as_mut().filter(|s| s.is_setup()) else {
                return reject("start_session", LobbyError::NotInSetup);
            };
            if !session.is_enrolled(id) {
                return reject("start_session", LobbyError::InvalidPlayer);
            }
            let Some(game) = self.catalog.find(&session.game_name) else {
                return reject("start_session", LobbyError::InvalidName);
            };
            if session.player_count() < game.min_players {
                return reject("start_session", LobbyError::TooFewPlayers);
            }

            let Some(first) = session.players.first().cloned() else {
                return reject("start_session", LobbyError::TooFewPlayers);
            };
            tracing::info!(player = %id, first = %first, game = %session.game_name, "Session started");
            session.current = Some(first);
            Ok(())
        })
    }

    /// Record the current player's turn and pass play to the next player.
    pub fn submit_turn(&self, id: &PlayerId, state: serde_json::Value) -> LobbyResult<()> {
        self.world.with_world(Access::Mutate, |world| {
            let Some(session) = world.session.as_mut().filter(|s| s.is_active()) else {
                return reject("submit_turn", LobbyError::NotInPlay);
            };
            if !session.is_current(id) {
                return reject("submit_turn", LobbyError::InvalidPlayer);
            }
            let Some(next) = session.next_after(id).cloned() else {
                return reject("submit_turn", LobbyError::InvalidPlayer);
            };

            tracing::debug!(player = %id, next = %next, "Turn submitted");
            session.state = Some(state);
            session.current = Some(next);
            Ok(())
        })
    }

    /// End the session, in any phase.
    pub fn stop_session(&self, id: &PlayerId) -> LobbyResult<()> {
        self.world.with_world(Access::Mutate, |world| {
            let Some(session) = world.session.as_ref() else {
                return reject("stop_session", LobbyError::NotInPlay);
            };
            if !session.is_enrolled(id) {
                return reject("stop_session", LobbyError::InvalidPlayer);
            }

            tracing::info!(player = %id, game = %session.game_name, phase = %session.phase(), "Session stopped");
            world.session = None;
            Ok(())
        })
    }

    /// Content reference and entry point of the session's game.
    pub fn describe_active_game(&self) -> LobbyResult<GameInclude> {
        self.world.with_world(Access::Read, |world| {
            let Some(session) = world.session.as_ref() else {
                return reject("describe_active_game", LobbyError::NotInPlay);
            };
            match self.catalog.find(&session.game_name) {
                Some(game) => Ok(game.to_include()),
                None => reject("describe_active_game", LobbyError::InvalidName),
            }
        })
    }
}
