//! Hosted leaderboard over REST
//!
//! Anonymous sign-in against the identity service yields a uid and a token;
//! scores live in a realtime database under `leaderboard/<uid>`.
//! Endpoints are baked in at build time from the environment.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{Identity, Leaderboard, LeaderboardError, PersonalScore, ScoreEntry};
use crate::player::PlayerName;

const SIGN_UP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";

/// Service endpoints
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_key: String,
    pub database_url: String,
}

impl RemoteConfig {
    /// Read `STACK_TOWER_API_KEY` / `STACK_TOWER_DATABASE_URL` captured at build time
    pub fn from_build_env() -> Option<Self> {
        let api_key = option_env!("STACK_TOWER_API_KEY")?;
        let database_url = option_env!("STACK_TOWER_DATABASE_URL")?;
        Some(Self {
            api_key: api_key.to_string(),
            database_url: database_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Clone)]
struct AuthSession {
    uid: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    id_token: String,
}

/// Stored shape of `leaderboard/<uid>`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    username: String,
    score: u32,
    #[serde(default)]
    uid: String,
}

pub struct RemoteLeaderboard {
    config: RemoteConfig,
    auth: RefCell<Option<AuthSession>>,
}

fn js_error(e: JsValue) -> LeaderboardError {
    LeaderboardError::Network(format!("{:?}", e))
}

impl RemoteLeaderboard {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            auth: RefCell::new(None),
        }
    }

    /// Establish an anonymous session and return this player's identity
    pub async fn sign_in(&self, name: PlayerName) -> Result<Identity, LeaderboardError> {
        let url = format!("{}?key={}", SIGN_UP_URL, self.config.api_key);
        let body = fetch_text("POST", &url, Some(r#"{"returnSecureToken":true}"#.to_string())).await?;
        let response: SignUpResponse = serde_json::from_str(&body)?;

        log::info!("Signed in anonymously: {}", response.local_id);
        let identity = Identity {
            uid: response.local_id.clone(),
            name,
        };
        *self.auth.borrow_mut() = Some(AuthSession {
            uid: response.local_id,
            id_token: response.id_token,
        });
        Ok(identity)
    }

    fn session(&self) -> Result<AuthSession, LeaderboardError> {
        self.auth
            .borrow()
            .clone()
            .ok_or(LeaderboardError::NotAuthenticated)
    }

    fn url(&self, path: &str, query: &str, token: &str) -> String {
        let separator = if query.is_empty() { "" } else { "&" };
        format!(
            "{}/{}.json?{}{}auth={}",
            self.config.database_url, path, query, separator, token
        )
    }

    async fn record(&self, uid: &str, token: &str) -> Result<Option<Record>, LeaderboardError> {
        let url = self.url(&format!("leaderboard/{uid}"), "", token);
        let body = fetch_text("GET", &url, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Entries matching an ordered query, highest score first
    async fn query(&self, query: &str, token: &str) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        let url = self.url("leaderboard", query, token);
        let body = fetch_text("GET", &url, None).await?;
        let records: Option<HashMap<String, Record>> = serde_json::from_str(&body)?;

        let mut entries: Vec<ScoreEntry> = records
            .unwrap_or_default()
            .into_iter()
            .map(|(uid, record)| ScoreEntry {
                uid,
                username: record.username,
                score: record.score,
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.uid.cmp(&b.uid)));
        Ok(entries)
    }
}

impl Leaderboard for RemoteLeaderboard {
    async fn submit_score(&self, identity: &Identity, score: u32) -> Result<(), LeaderboardError> {
        let session = self.session()?;
        if let Some(existing) = self.record(&identity.uid, &session.id_token).await? {
            if score <= existing.score {
                return Ok(());
            }
        }

        let record = Record {
            username: identity.name.to_string(),
            score,
            uid: identity.uid.clone(),
        };
        let url = self.url(&format!("leaderboard/{}", identity.uid), "", &session.id_token);
        fetch_text("PATCH", &url, Some(serde_json::to_string(&record)?)).await?;
        log::info!("Score {} stored for {}", score, session.uid);
        Ok(())
    }

    async fn fetch_top(&self, n: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        let session = self.session()?;
        let mut entries = self
            .query(&format!("orderBy=%22score%22&limitToLast={n}"), &session.id_token)
            .await?;
        entries.truncate(n);
        Ok(entries)
    }

    async fn fetch_personal(&self, identity: &Identity) -> Result<PersonalScore, LeaderboardError> {
        let session = self.session()?;
        let score = self
            .record(&identity.uid, &session.id_token)
            .await?
            .filter(|record| record.username == identity.name.as_str())
            .map(|record| record.score)
            .unwrap_or(0);

        let above = self
            .query(
                &format!("orderBy=%22score%22&startAt={}", score.saturating_add(1)),
                &session.id_token,
            )
            .await?;
        Ok(PersonalScore {
            score,
            rank: above.len() + 1,
        })
    }
}

/// Issue a JSON request and return the response body
async fn fetch_text(method: &str, url: &str, body: Option<String>) -> Result<String, LeaderboardError> {
    let init = RequestInit::new();
    init.set_method(method);
    init.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        init.set_body(&JsValue::from_str(&body));
    }

    let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_error)?;

    let window = web_sys::window().ok_or(LeaderboardError::Unavailable)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;

    if !response.ok() {
        return Err(LeaderboardError::Status(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    text.as_string()
        .ok_or_else(|| LeaderboardError::Decode("response body is not text".to_string()))
}
