//! Lobby state.
//!
//! - `player` - Registered players and their identifiers
//! - `session` - The single game session and its phase
//! - `catalog` - Supported games and their player-count bounds
//! - `world` - The persisted aggregate of players and session
//! - `store` - Durable snapshot storage
//! - `guard` - Locked, scoped access to the world with persist-on-commit
//! - `lobby` - The operations callers invoke
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              Lobby                               │
//! │                                                                  │
//! │  ┌────────────────────────────────────┐   ┌───────────────────┐  │
//! │  │            GuardedWorld            │   │    GameCatalog    │  │
//! │  │                                    │   │                   │  │
//! │  │  Mutex<World>                      │   │  name →           │  │
//! │  │    players: id → Player            │   │    min/max,       │  │
//! │  │    session: Option<Session>        │   │    include,       │  │
//! │  │                                    │   │    function       │  │
//! │  │  store: SnapshotStore              │   │                   │  │
//! │  └──────────┬─────────────────────────┘   └───────────────────┘  │
//! │             ▼                                                    │
//! │          lobby.json                                              │
//! │                                                                  │
//! │   (none) ──setup──▶ Setup ──start──▶ Active ──stop──▶ (none)     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod guard;
pub mod lobby;
pub mod player;
pub mod session;
pub mod store;
pub mod world;

// Re-export commonly used types
pub use catalog::{GameCatalog, GameInclude, GameInfo};
pub use guard::{Access, GuardedWorld};
pub use lobby::{Lobby, LobbyError, LobbyResult, OperationError};
pub use player::{Player, PlayerId};
pub use session::{Session, SessionPhase};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore, StoreError};
pub use world::World;
