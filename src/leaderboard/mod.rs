//! Leaderboard: best score per anonymous identity
//!
//! The game never waits on the leaderboard. Submissions run as detached
//! tasks whose failures are logged and dropped, so the game stays fully
//! playable offline.

pub mod local;
#[cfg(target_arch = "wasm32")]
pub mod remote;

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::player::{self, PlayerName};

pub use local::LocalLeaderboard;
#[cfg(target_arch = "wasm32")]
pub use remote::{RemoteConfig, RemoteLeaderboard};

/// Rows shown in the leaderboard overlay
pub const TOP_N: usize = 10;

/// Who a score belongs to: a stable anonymous id plus a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub name: PlayerName,
}

/// A stored best score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub uid: String,
    pub username: String,
    pub score: u32,
}

/// The player's own best score and its 1-indexed rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalScore {
    pub score: u32,
    pub rank: usize,
}

/// Errors from leaderboard calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    /// No anonymous session has been established yet
    NotAuthenticated,
    /// The request never completed
    Network(String),
    /// The service answered with a non-success HTTP status
    Status(u16),
    /// The response body could not be decoded
    Decode(String),
    /// No leaderboard service is configured or reachable
    Unavailable,
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::NotAuthenticated => write!(f, "Not signed in"),
            LeaderboardError::Network(msg) => write!(f, "Network error: {msg}"),
            LeaderboardError::Status(code) => write!(f, "Leaderboard returned HTTP {code}"),
            LeaderboardError::Decode(msg) => write!(f, "Unreadable leaderboard data: {msg}"),
            LeaderboardError::Unavailable => write!(f, "Leaderboard unavailable"),
        }
    }
}

impl std::error::Error for LeaderboardError {}

impl From<serde_json::Error> for LeaderboardError {
    fn from(e: serde_json::Error) -> Self {
        LeaderboardError::Decode(e.to_string())
    }
}

/// Leaderboard service client.
///
/// Every call is asynchronous, including submission; callers must not
/// assume any of them completes promptly, or at all.
#[allow(async_fn_in_trait)]
pub trait Leaderboard {
    /// Record `score` if it beats the identity's stored best
    async fn submit_score(&self, identity: &Identity, score: u32) -> Result<(), LeaderboardError>;

    /// Best `n` scores, highest first
    async fn fetch_top(&self, n: usize) -> Result<Vec<ScoreEntry>, LeaderboardError>;

    async fn fetch_personal(&self, identity: &Identity) -> Result<PersonalScore, LeaderboardError>;
}

/// Whichever leaderboard the build could reach
pub enum Board {
    Local(LocalLeaderboard),
    #[cfg(target_arch = "wasm32")]
    Remote(RemoteLeaderboard),
}

impl Leaderboard for Board {
    async fn submit_score(&self, identity: &Identity, score: u32) -> Result<(), LeaderboardError> {
        match self {
            Board::Local(board) => board.submit_score(identity, score).await,
            #[cfg(target_arch = "wasm32")]
            Board::Remote(board) => board.submit_score(identity, score).await,
        }
    }

    async fn fetch_top(&self, n: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        match self {
            Board::Local(board) => board.fetch_top(n).await,
            #[cfg(target_arch = "wasm32")]
            Board::Remote(board) => board.fetch_top(n).await,
        }
    }

    async fn fetch_personal(&self, identity: &Identity) -> Result<PersonalScore, LeaderboardError> {
        match self {
            Board::Local(board) => board.fetch_personal(identity).await,
            #[cfg(target_arch = "wasm32")]
            Board::Remote(board) => board.fetch_personal(identity).await,
        }
    }
}

/// Run a task without waiting for it.
///
/// In the browser this queues it on the page's microtask loop. Natively
/// the only boards are in-memory, so the task is driven to completion in
/// place.
pub fn spawn_detached<F: Future<Output = ()> + 'static>(task: F) {
    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(task);

    #[cfg(not(target_arch = "wasm32"))]
    futures_lite::future::block_on(task);
}

/// Submit a score, logging the outcome. Returns whether the board accepted it.
pub async fn submit_logged<L: Leaderboard>(board: &L, identity: &Identity, score: u32) -> bool {
    match board.submit_score(identity, score).await {
        Ok(()) => {
            log::info!("Submitted score {} for {}", score, identity.name);
            true
        }
        Err(e) => {
            log::warn!("Score submission failed: {}", e);
            false
        }
    }
}

/// Fire-and-forget score submission; failures are logged, never raised
pub fn submit_detached<L: Leaderboard + 'static>(board: Rc<L>, identity: Identity, score: u32) {
    spawn_detached(async move {
        submit_logged(board.as_ref(), &identity, score).await;
    });
}

/// One rendered line of the leaderboard overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    pub text: String,
    pub color: &'static str,
    /// The viewing player's own row
    pub own: bool,
}

/// Overlay lines: the top entries, then the player's own row when they are
/// not among them.
pub fn standings(
    top: &[ScoreEntry],
    identity: &Identity,
    personal: Option<PersonalScore>,
) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = top
        .iter()
        .enumerate()
        .map(|(i, entry)| StandingRow {
            text: player::format_row(i + 1, &entry.username, entry.score),
            color: player::rank_color(i + 1),
            own: entry.uid == identity.uid,
        })
        .collect();

    let listed = rows.iter().any(|row| row.own);
    if let (false, Some(personal)) = (listed, personal) {
        rows.push(StandingRow {
            text: player::format_row(personal.rank, identity.name.as_str(), personal.score),
            color: player::rank_color(personal.rank),
            own: true,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    fn entry(uid: &str, score: u32) -> ScoreEntry {
        ScoreEntry {
            uid: uid.to_string(),
            username: uid.to_uppercase(),
            score,
        }
    }

    fn identity(uid: &str, name: &str) -> Identity {
        Identity {
            uid: uid.to_string(),
            name: PlayerName::parse(name).unwrap(),
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(LeaderboardError::Status(503).to_string(), "Leaderboard returned HTTP 503");
        let msg = LeaderboardError::Network("offline".into()).to_string();
        assert!(msg.contains("offline"), "got: {msg}");
    }

    #[test]
    fn test_standings_marks_own_row() {
        let top = vec![entry("a", 30), entry("me", 20), entry("c", 10)];
        let rows = standings(&top, &identity("me", "Me"), None);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].color, "gold");
        assert!(rows[1].own);
        assert!(!rows[0].own && !rows[2].own);
        assert_eq!(rows[1].text, "2. ME.............000020");
    }

    #[test]
    fn test_standings_appends_personal_row() {
        let top = vec![entry("a", 30), entry("b", 20)];
        let personal = PersonalScore { score: 4, rank: 17 };
        let rows = standings(&top, &identity("me", "Me"), Some(personal));
        assert_eq!(rows.len(), 3);
        assert!(rows[2].own);
        assert_eq!(rows[2].text, "17. Me.............000004");
    }

    #[test]
    fn test_standings_empty_board() {
        let rows = standings(&[], &identity("me", "Me"), None);
        assert!(rows.is_empty());
    }

    struct Broken;

    impl Leaderboard for Broken {
        async fn submit_score(&self, _: &Identity, _: u32) -> Result<(), LeaderboardError> {
            Err(LeaderboardError::Unavailable)
        }
        async fn fetch_top(&self, _: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
            Err(LeaderboardError::Unavailable)
        }
        async fn fetch_personal(&self, _: &Identity) -> Result<PersonalScore, LeaderboardError> {
            Err(LeaderboardError::Unavailable)
        }
    }

    #[test]
    fn test_submit_detached_swallows_failures() {
        submit_detached(Rc::new(Broken), identity("me", "Me"), 12);
    }

    #[test]
    fn test_submit_logged_reports_outcome() {
        let me = identity("me", "Me");
        assert!(!block_on(submit_logged(&Broken, &me, 12)));

        let local = LocalLeaderboard::new();
        assert!(block_on(submit_logged(&local, &me, 12)));
        assert_eq!(block_on(local.fetch_personal(&me)).unwrap().score, 12);
    }
}
