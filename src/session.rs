use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CURRENCY;
use crate::error::{ClientError, ClientResult};
use crate::models::{TokenPair, UserProfile};

/// The logged-in user's credentials and cached profile.
///
/// Passed explicitly to whatever needs it; dropping or clearing it is the
/// logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub tokens: TokenPair,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl Session {
    pub fn new(tokens: TokenPair) -> Self {
        Self {
            tokens,
            profile: None,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.tokens.access
    }

    pub fn currency(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.currency.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    /// Expiry of the access token, read from its `exp` claim.
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        jwt_expiry(&self.tokens.access)
    }

    /// Tokens without a readable expiry are treated as still valid and left
    /// for the backend to reject.
    pub fn access_expired(&self, now: DateTime<Utc>) -> bool {
        self.access_expires_at().is_some_and(|exp| exp <= now)
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Persists the session as JSON so it survives between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> ClientResult<Option<Session>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let session = serde_json::from_slice(&bytes).map_err(|e| {
                    ClientError::Storage(format!("corrupt session file: {}", e))
                })?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, bytes).await?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Remove the persisted session. Clearing an absent session is a no-op.
    pub async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!("session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
