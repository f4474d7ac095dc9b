//! Game catalog.
//!
//! Static, read-only table of the games the lobby can host. Lookup is a
//! linear scan by exact name; the table is tiny.

use serde::{Deserialize, Serialize};

/// A supported game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub name: String,

    /// Front-end content to load for this game
    pub include: String,

    /// Entry point inside the included content
    pub function: String,

    pub min_players: usize,
    pub max_players: usize,
}

impl GameInfo {
    pub fn new(
        name: impl Into<String>,
        include: impl Into<String>,
        function: impl Into<String>,
        min_players: usize,
        max_players: usize,
    ) -> Self {
        Self {
            name: name.into(),
            include: include.into(),
            function: function.into(),
            min_players,
            max_players,
        }
    }

    /// Content reference and entry point for the front end.
    pub fn to_include(&self) -> GameInclude {
        GameInclude {
            include: self.include.clone(),
            function: self.function.clone(),
        }
    }
}

/// What the front end needs to load the active game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInclude {
    pub include: String,
    pub function: String,
}

impl GameInclude {
    /// Render the include directive served to the front end.
    pub fn script(&self) -> String {
        format!("include '{}'\n", self.include)
    }
}

/// The ordered set of supported games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCatalog {
    games: Vec<GameInfo>,
}

impl GameCatalog {
    pub fn new(games: Vec<GameInfo>) -> Self {
        Self { games }
    }

    /// Find a game by exact name.
    pub fn find(&self, name: &str) -> Option<&GameInfo> {
        self.games.iter().find(|game| game.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// All games in the order they were supplied.
    pub fn games(&self) -> &[GameInfo] {
        &self.games
    }

    /// All games sorted by name.
    pub fn sorted(&self) -> Vec<GameInfo> {
        let mut games = self.games.clone();
        games.sort_by(|a, b| a.name.cmp(&b.name));
        games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for GameCatalog {
    /// The games bundled with the lobby front end.
    fn default() -> Self {
        Self::new(vec![
            GameInfo::new("Checkers", "games/checkers.bare", "checkersMain", 2, 2),
            GameInfo::new("Tic Tac Toe", "games/ticTacToe.bare", "ticTacToeMain", 2, 2),
        ])
    }
}
