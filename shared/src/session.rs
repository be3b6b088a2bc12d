use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::capabilities::{KeyNamespace, KvError, KvKey};
use crate::model::AuthUser;

pub const TOKEN_STORAGE_KEY: &str = "travelapp_token";

pub fn token_key() -> Result<KvKey, KvError> {
    KvKey::new(KeyNamespace::Session, TOKEN_STORAGE_KEY)
}

/// Bearer token and the identity it belongs to.
#[derive(Default)]
pub struct Session {
    token: Option<SecretString>,
    user: Option<AuthUser>,
    fetching_user: bool,
    hydrated: bool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .field("fetching_user", &self.fetching_user)
            .field("hydrated", &self.hydrated)
            .finish()
    }
}

impl Session {
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_fetching_user(&self) -> bool {
        self.fetching_user
    }

    /// Whether the stored token has been read back yet.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn mark_hydrated(&mut self) {
        self.hydrated = true;
    }

    /// Blank tokens clear the session. Returns whether a token is now held.
    pub fn set_token(&mut self, token: Option<String>) -> bool {
        match token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
            Some(token) => {
                self.token = Some(SecretString::new(token));
                true
            }
            None => {
                self.logout();
                false
            }
        }
    }

    /// Bytes persisted under [`TOKEN_STORAGE_KEY`].
    pub fn token_bytes(&self) -> Option<Vec<u8>> {
        self.token
            .as_ref()
            .map(|t| t.expose_secret().as_bytes().to_vec())
    }

    pub fn begin_fetch_user(&mut self) {
        self.fetching_user = true;
    }

    pub fn finish_fetch_user(&mut self, user: Option<AuthUser>) {
        self.fetching_user = false;
        match user {
            Some(user) => self.set_user(user),
            None => self.logout(),
        }
    }

    /// Ignored once the token is gone, so a late response cannot sign a
    /// closed session back in.
    pub fn set_user(&mut self, user: AuthUser) {
        if self.token.is_none() {
            debug!("no token, identity dropped");
            return;
        }
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        if self.token.is_some() || self.user.is_some() {
            info!("session cleared");
        }
        self.token = None;
        self.user = None;
    }
}
