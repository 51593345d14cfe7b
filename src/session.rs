//! Login sessions
//!
//! Sessions live for the lifetime of the process: there is no expiry and
//! no logout.

use chrono::{DateTime, Utc};
use rand::RngCore;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::users::UserDirectory;

/// Random bytes per session token
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unknown user")]
    UnknownUser,

    #[error("Bad password")]
    BadPassword,
}

/// An authenticated identity bound to a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Generate an upper-case hex token
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

/// Token to session map, written only by login
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify credentials and mint a new token
    pub async fn login(
        &self,
        users: &UserDirectory,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let user = users.verify(username, password)?;

        let session = Session {
            username: user.username().to_string(),
            created_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().await;
        let mut token = generate_token();
        while sessions.contains_key(&token) {
            token = generate_token();
        }
        sessions.insert(token.clone(), session);

        Ok(token)
    }

    pub async fn lookup(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
