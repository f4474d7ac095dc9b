//! The game session.
//!
//! At most one session exists at a time. Its phase is never stored; it is
//! derived from whether a current player is assigned.
//!
//! # Phases
//!
//! ```text
//!                  enroll/withdraw      submit
//!                      ┌─┐               ┌─┐
//!                      ▼ │               ▼ │
//!   (none) ──setup──▶ Setup ──start──▶ Active
//!     ▲                 │                │
//!     └────stop─────────┴────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Session phase, derived from field presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Players are being enrolled; no turn holder yet
    Setup,
    /// Play is under way; `current` holds the turn
    Active,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active or being-configured game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Session {
    /// Catalog name of the game being played
    #[serde(alias = "name")]
    pub game_name: String,

    /// Enrolled players in turn order
    pub players: Vec<PlayerId>,

    /// Turn holder; present only while Active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<PlayerId>,

    /// Latest game state submitted with a turn, stored verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
}

impl Session {
    /// Create a session in Setup with its first player.
    pub fn new(game_name: String, first_player: PlayerId) -> Self {
        Self {
            game_name,
            players: vec![first_player],
            current: None,
            state: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.current.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::Setup
        }
    }

    pub fn is_setup(&self) -> bool {
        self.phase() == SessionPhase::Setup
    }

    pub fn is_active(&self) -> bool {
        self.phase() == SessionPhase::Active
    }

    /// Check if a player is enrolled.
    pub fn is_enrolled(&self, id: &PlayerId) -> bool {
        self.players.contains(id)
    }

    /// Check if it's a player's turn.
    pub fn is_current(&self, id: &PlayerId) -> bool {
        self.current.as_ref() == Some(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// The player whose turn follows `id`, cycling back to the first.
    ///
    /// Returns `None` if `id` is not enrolled.
    pub fn next_after(&self, id: &PlayerId) -> Option<&PlayerId> {
        let index = self.players.iter().position(|p| p == id)?;
        self.players.get((index + 1) % self.players.len())
    }

    /// Remove a player from the enrollment, keeping the others in order.
    pub fn withdraw(&mut self, id: &PlayerId) -> bool {
        match self.players.iter().position(|p| p == id) {
            Some(index) => {
                self.players.remove(index);
                true
            }
            None => false,
        }
    }
}
