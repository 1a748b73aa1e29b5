use std::time::Duration;

use anyhow::{anyhow, Context};
use shuttle_runtime::SecretStore;

pub const DEFAULT_RECALL_API_URL: &str = "https://us-west-2.recall.ai/api/v1/bot";
pub const DEFAULT_RECALL_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub recall_api_token: String,
    pub recall_api_url: String,
    pub recall_timeout: Duration,
    /// Gate for the function routes; when unset every caller is let through.
    pub supabase_jwt_secret: Option<String>,
}

impl AppConfig {
    pub fn new(secret_store: &SecretStore) -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| secret_store.get(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let recall_api_token = lookup("RECALL_API_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| anyhow!("RECALL_API_TOKEN not found"))?;

        let recall_api_url =
            lookup("RECALL_API_URL").unwrap_or_else(|| DEFAULT_RECALL_API_URL.to_string());

        let recall_timeout = match lookup("RECALL_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .with_context(|| format!("RECALL_TIMEOUT_SECS is not a number: {}", secs))?,
            ),
            None => Duration::from_secs(DEFAULT_RECALL_TIMEOUT_SECS),
        };

        let supabase_jwt_secret = lookup("SUPABASE_JWT_SECRET").filter(|secret| !secret.is_empty());

        Ok(AppConfig {
            recall_api_token,
            recall_api_url,
            recall_timeout,
            supabase_jwt_secret,
        })
    }
}

/// Settings for the client side, read from the process environment at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let supabase_url = lookup("SUPABASE_URL")
            .ok_or_else(|| anyhow!("SUPABASE_URL not found"))?
            .trim_end_matches('/')
            .to_owned();

        let supabase_anon_key =
            lookup("SUPABASE_ANON_KEY").ok_or_else(|| anyhow!("SUPABASE_ANON_KEY not found"))?;

        Ok(ClientConfig {
            supabase_url,
            supabase_anon_key,
        })
    }

    pub fn deploy_url(&self) -> String {
        format!("{}/functions/v1/deploy-recall-bot", self.supabase_url)
    }
}
