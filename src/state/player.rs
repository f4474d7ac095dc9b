//! Registered players.
//!
//! A player is created once by registration and never changes afterwards.
//! The identifier is an opaque string (a v4 UUID for players created here);
//! the display name is unique across the whole registry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque player identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Generate a fresh, unique identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Player {
    /// Unique identifier (also the key in the world's player map)
    pub id: PlayerId,

    /// Display name, unique across all players
    pub name: String,
}

impl Player {
    /// Create a new player with a freshly generated identifier.
    pub fn new(name: String) -> Self {
        Self {
            id: PlayerId::generate(),
            name,
        }
    }

    /// Create a player with a known identifier (for restoring state).
    pub fn with_id(id: PlayerId, name: String) -> Self {
        Self { id, name }
    }
}

/// Check that a display name is acceptable.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_ids_are_unique() {
        let a = Player::new("Ann".to_string());
        let b = Player::new("Ann".to_string());
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn test_player_json_shape() {
        let player = Player::with_id(PlayerId::from("p-1"), "Ann".to_string());
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json, serde_json::json!({"id": "p-1", "name": "Ann"}));

        let back: Player = serde_json::from_value(json).unwrap();
        assert_eq!(back, player);
    }

    #[test]
    fn test_player_rejects_unknown_fields() {
        let json = serde_json::json!({"id": "p-1", "name": "Ann", "registered": "2024-01-01"});
        assert!(serde_json::from_value::<Player>(json).is_err());
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("Bob"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PlayerId::from("abc")), "abc");
    }
}
