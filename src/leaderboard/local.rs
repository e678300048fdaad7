//! On-device leaderboard
//!
//! Used when no leaderboard service is configured. Keeps one best score
//! per identity, sorted highest first, persisted to LocalStorage.

use std::cell::RefCell;

use rand::Rng;

use super::{Identity, Leaderboard, LeaderboardError, PersonalScore, ScoreEntry};
use crate::persistence;
use crate::player::PlayerName;

/// Most entries kept on the device
pub const MAX_LOCAL_ENTRIES: usize = 100;

#[derive(Debug, Default)]
pub struct LocalLeaderboard {
    entries: RefCell<Vec<ScoreEntry>>,
    persist: bool,
}

impl LocalLeaderboard {
    /// LocalStorage keys (only written in wasm32)
    const STORAGE_KEY: &'static str = "stack_tower_leaderboard";
    const UID_KEY: &'static str = "stack_tower_uid";

    /// Empty, in-memory only
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from LocalStorage; later submissions are written back
    pub fn load() -> Self {
        let entries: Vec<ScoreEntry> = persistence::load_json(Self::STORAGE_KEY).unwrap_or_default();
        log::info!("Loaded {} local scores", entries.len());
        let board = Self {
            entries: RefCell::new(entries),
            persist: true,
        };
        board.normalize();
        board
    }

    /// Anonymous identity for this device, created on first use
    pub fn identity(name: PlayerName) -> Identity {
        let uid = persistence::load_string(Self::UID_KEY).unwrap_or_else(|| {
            let uid = format!("local-{:016x}", rand::rng().random::<u64>());
            persistence::save_string(Self::UID_KEY, &uid);
            uid
        });
        Identity { uid, name }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Highest first; ties keep submission order
    fn normalize(&self) {
        let mut entries = self.entries.borrow_mut();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_LOCAL_ENTRIES);
    }

    fn save(&self) {
        if self.persist && persistence::save_json(Self::STORAGE_KEY, &*self.entries.borrow()) {
            log::debug!("Local scores saved ({} entries)", self.len());
        }
    }

    /// Rank a score would hold (1-indexed)
    fn rank_of(entries: &[ScoreEntry], score: u32) -> usize {
        entries.iter().filter(|e| e.score > score).count() + 1
    }
}

impl Leaderboard for LocalLeaderboard {
    async fn submit_score(&self, identity: &Identity, score: u32) -> Result<(), LeaderboardError> {
        {
            let mut entries = self.entries.borrow_mut();
            match entries.iter_mut().find(|e| e.uid == identity.uid) {
                Some(existing) if score > existing.score => {
                    existing.score = score;
                    existing.username = identity.name.to_string();
                }
                Some(_) => return Ok(()),
                None => entries.push(ScoreEntry {
                    uid: identity.uid.clone(),
                    username: identity.name.to_string(),
                    score,
                }),
            }
        }
        self.normalize();
        self.save();
        Ok(())
    }

    async fn fetch_top(&self, n: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        Ok(self.entries.borrow().iter().take(n).cloned().collect())
    }

    async fn fetch_personal(&self, identity: &Identity) -> Result<PersonalScore, LeaderboardError> {
        let entries = self.entries.borrow();
        let score = entries
            .iter()
            .find(|e| e.uid == identity.uid)
            .map(|e| e.score)
            .unwrap_or(0);
        Ok(PersonalScore {
            score,
            rank: Self::rank_of(&entries, score),
        })
    }
}
