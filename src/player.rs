//! Player name validation and leaderboard row formatting

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::persistence;

/// Longest name the leaderboard layout has room for
pub const MAX_NAME_LEN: usize = 12;

/// Why a name was rejected. `Display` is the message shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "Name cannot be empty."),
            NameError::TooLong => {
                write!(f, "Name cannot be longer than {MAX_NAME_LEN} characters.")
            }
        }
    }
}

impl std::error::Error for NameError {}

/// A validated, trimmed player name (1-12 characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    const STORAGE_KEY: &'static str = "stack_tower_player";

    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let name = raw.trim();
        let len = name.chars().count();
        if len == 0 {
            return Err(NameError::Empty);
        }
        if len > MAX_NAME_LEN {
            return Err(NameError::TooLong);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name remembered from a previous visit, if it is still valid
    pub fn load() -> Option<Self> {
        let raw = persistence::load_string(Self::STORAGE_KEY)?;
        Self::parse(&raw).ok()
    }

    pub fn save(&self) {
        if !persistence::save_string(Self::STORAGE_KEY, &self.0) {
            log::debug!("Player name not persisted");
        }
    }

    pub fn forget() {
        persistence::remove(Self::STORAGE_KEY);
    }
}

impl TryFrom<String> for PlayerName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlayerName> for String {
    fn from(name: PlayerName) -> Self {
        name.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One leaderboard line: `rank. name.....score` with the score padded to
/// six digits and dots filling out a fixed-width column.
pub fn format_row(rank: usize, name: &str, score: u32) -> String {
    let dots = ".".repeat((MAX_NAME_LEN + 3).saturating_sub(name.chars().count()));
    format!("{rank}. {name}{dots}{score:06}")
}

/// Podium colour for the top three ranks (1-indexed)
pub fn rank_color(rank: usize) -> &'static str {
    match rank {
        1 => "gold",
        2 => "silver",
        3 => "brown",
        _ => "white",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let name = PlayerName::parse("  Ada  ").unwrap();
        assert_eq!(name.as_str(), "Ada");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(PlayerName::parse(""), Err(NameError::Empty));
        assert_eq!(PlayerName::parse("   "), Err(NameError::Empty));
        assert_eq!(NameError::Empty.to_string(), "Name cannot be empty.");
    }

    #[test]
    fn test_parse_length_limit() {
        assert!(PlayerName::parse("abcdefghijkl").is_ok());
        assert_eq!(PlayerName::parse("abcdefghijklm"), Err(NameError::TooLong));
        assert_eq!(
            NameError::TooLong.to_string(),
            "Name cannot be longer than 12 characters."
        );
    }

    #[test]
    fn test_parse_counts_characters_not_bytes() {
        assert!(PlayerName::parse("ÄÖÜäöüßéèêëï").is_ok());
    }

    #[test]
    fn test_serde_validates() {
        let name: PlayerName = serde_json::from_str(r#""Ada""#).unwrap();
        assert_eq!(name.as_str(), "Ada");
        assert!(serde_json::from_str::<PlayerName>(r#""""#).is_err());
        assert_eq!(serde_json::to_string(&name).unwrap(), r#""Ada""#);
    }

    #[test]
    fn test_format_row() {
        assert_eq!(format_row(1, "Ada", 42), "1. Ada............000042");
        assert_eq!(format_row(10, "abcdefghijkl", 7), "10. abcdefghijkl...000007");
    }

    #[test]
    fn test_rank_color() {
        assert_eq!(rank_color(1), "gold");
        assert_eq!(rank_color(3), "brown");
        assert_eq!(rank_color(4), "white");
    }
}
