//! Tabletop Lobby Library
//!
//! This crate coordinates one shared, turn-based game lobby.
//!
//! # Overview
//!
//! - **Player Registry** - Players register once under a unique name and are
//!   identified afterwards by an opaque id.
//!
//! - **Session State Machine** - At most one game session exists. It is set
//!   up from the game catalog, players enroll or withdraw while it is in
//!   Setup, it starts, turns rotate round-robin, and it is stopped.
//!
//! - **Guarded World** - All state lives in one `World` behind one lock.
//!   Successful mutations are written to a JSON snapshot before the lock is
//!   released.
//!
//! # Design Principles
//!
//! 1. **Check, then mutate** - Every operation validates everything before
//!    it changes anything, so a rejected operation leaves no trace.
//!
//! 2. **Two kinds of failure** - Domain rejections (`LobbyError`) are normal
//!    results with stable tags; storage failures (`StoreError`) are not.
//!
//! 3. **No networking** - Request routing and transport live elsewhere.
//!
//! 4. **Opaque game state** - Turn payloads are stored verbatim as JSON.
//!
//! # Example
//!
//! ```rust
//! use tabletop_lobby::state::{GameCatalog, Lobby, MemoryStore, World};
//!
//! let lobby = Lobby::new(World::new(), MemoryStore::new(), GameCatalog::default());
//!
//! let ann = lobby.register_player("Ann").unwrap().id;
//! let bob = lobby.register_player("Bob").unwrap().id;
//!
//! lobby.setup_session(&ann, "Tic Tac Toe").unwrap();
//! lobby.enroll_player(&bob).unwrap();
//! lobby.start_session(&ann).unwrap();
//!
//! lobby.submit_turn(&ann, serde_json::json!({"board": ["X"]})).unwrap();
//! let session = lobby.session_state().unwrap().unwrap();
//! assert_eq!(session.current, Some(bob));
//! ```

pub mod config;
pub mod state;

// Re-export everything from state module at crate root
pub use config::{resolve_snapshot_path, ConfigError, LobbyConfig};
pub use state::*;
