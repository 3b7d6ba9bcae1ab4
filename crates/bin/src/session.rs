//! Session management for the editing API
//!
//! Maps session tokens (stored in a cookie) to the logged-in operator and
//! whether they have edit mode switched on. Sessions are ephemeral and lost on
//! server restart.

use std::{collections::HashMap, sync::Arc};

use sitecms::auth::Session;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

/// What the server remembers about a logged-in operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session: Session,
    pub edit_mode: bool,
}

/// In-memory session store
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, SessionData>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session and return its token.
    pub async fn create_session(&self, session: Session) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            token.clone(),
            SessionData {
                session,
                edit_mode: false,
            },
        );
        token
    }

    pub async fn get(&self, token: &str) -> Option<SessionData> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Set the session's edit-mode flag.
    ///
    /// Returns whether any session has edit mode on afterwards, or `None` if
    /// the token is unknown.
    pub async fn set_edit_mode(&self, token: &str, enabled: bool) -> Option<bool> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(token)?.edit_mode = enabled;
        Some(sessions.values().any(|data| data.edit_mode))
    }

    /// Destroy a session, returning what it held.
    pub async fn destroy_session(&self, token: &str) -> Option<SessionData> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token)
    }

    /// Whether any remaining session has edit mode on.
    pub async fn any_editing(&self) -> bool {
        let sessions = self.sessions.read().await;
        sessions.values().any(|data| data.edit_mode)
    }

    /// Get the number of active sessions (for debugging)
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
