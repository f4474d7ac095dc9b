//! The persisted world: player registry plus the optional session.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::catalog::GameCatalog;
use super::player::{Player, PlayerId};
use super::session::Session;
use super::store::StoreError;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Everything the lobby knows, as one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct World {
    /// Registered players by id
    #[serde(default)]
    pub players: BTreeMap<PlayerId, Player>,

    /// The game set up or in play, if any
    #[serde(default, alias = "game", skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,

    /// When set, mutations are never written to durable storage
    #[serde(default, alias = "noSave", skip_serializing_if = "is_false")]
    pub no_persist: bool,
}

impl World {
    /// An empty world: no players, no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty world that never writes to durable storage.
    pub fn ephemeral() -> Self {
        Self {
            no_persist: true,
            ..Self::default()
        }
    }

    pub fn persists(&self) -> bool {
        !self.no_persist
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn has_player(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    /// Check if any player already uses `name`.
    pub fn name_in_use(&self, name: &str) -> bool {
        self.players.values().any(|p| p.name == name)
    }

    /// Insert a player keyed by its id.
    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    /// Check the structural invariants a loaded snapshot must satisfy.
    pub fn validate(&self, catalog: &GameCatalog) -> Result<(), StoreError> {
        let invalid = |reason: String| Err(StoreError::Invalid(reason));

        let mut names = HashSet::new();
        for (key, player) in &self.players {
            if *key != player.id {
                return invalid(format!("player key {} does not match id {}", key, player.id));
            }
            if !super::player::is_valid_name(&player.name) {
                return invalid(format!("player {} has an empty name", key));
            }
            if !names.insert(player.name.as_str()) {
                return invalid(format!("duplicate player name {:?}", player.name));
            }
        }

        let Some(session) = &self.session else {
            return Ok(());
        };

        let Some(game) = catalog.find(&session.game_name) else {
            return invalid(format!("unknown game {:?}", session.game_name));
        };
        if session.players.len() > game.max_players {
            return invalid(format!(
                "{} players enrolled in {:?}, maximum is {}",
                session.players.len(),
                game.name,
                game.max_players
            ));
        }

        let mut enrolled = HashSet::new();
        for id in &session.players {
            if !self.has_player(id) {
                return invalid(format!("session player {} is not registered", id));
            }
            if !enrolled.insert(id) {
                return invalid(format!("session player {} is enrolled twice", id));
            }
        }

        if let Some(current) = &session.current {
            if !session.is_enrolled(current) {
                return invalid(format!("current player {} is not enrolled", current));
            }
        }

        Ok(())
    }
}
