use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::info;

use crate::types::Session;

pub const DEFAULT_SESSION_FILE: &str = ".meetbot-session.json";

/// Keeps the last session on disk between CLI invocations.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub async fn load(&self) -> anyhow::Result<Option<Session>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let raw = fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let session = serde_json::from_slice(&raw)
            .with_context(|| format!("Corrupt session file {}", self.path.display()))?;
        Ok(Some(session))
    }

    /// Like [`SessionStore::load`], but an expired session is removed from
    /// disk and reported as no session.
    pub async fn load_active(&self, now: DateTime<Utc>) -> anyhow::Result<Option<Session>> {
        match self.load().await? {
            Some(session) if session.is_expired(now) => {
                info!("Stored session expired, signing out");
                self.clear().await?;
                Ok(None)
            }
            session => Ok(session),
        }
    }

    pub async fn save(&self, session: &Session) -> anyhow::Result<()> {
        let raw = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, raw)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        if fs::try_exists(&self.path).await? {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}
