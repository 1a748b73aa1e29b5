use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::DeployError;
use crate::types::{BotRecord, CreateBotRequest};

/// Creates a meeting bot at the upstream provider.
#[async_trait]
pub trait BotDeployer: Send + Sync {
    /// Issues exactly one creation call. Implementations never retry.
    async fn create_bot(&self, meeting_url: &str) -> Result<BotRecord, DeployError>;
}

#[derive(Clone, Debug)]
pub struct RecallClient {
    client: Client,
    api_url: String,
    api_token: String,
    timeout: Duration,
}

impl RecallClient {
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>, timeout: Duration) -> Self {
        RecallClient {
            client: Client::new(),
            api_url: api_url.into(),
            api_token: api_token.into(),
            timeout,
        }
    }

    pub fn from_config(app_config: &AppConfig) -> Self {
        Self::new(
            app_config.recall_api_url.clone(),
            app_config.recall_api_token.clone(),
            app_config.recall_timeout,
        )
    }

    fn map_send_error(&self, e: reqwest::Error) -> DeployError {
        if e.is_timeout() {
            error!("Recall API did not answer within {:?}", self.timeout);
            DeployError::UpstreamTimeout(self.timeout)
        } else {
            error!("HTTP request error: {}", e);
            DeployError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl BotDeployer for RecallClient {
    async fn create_bot(&self, meeting_url: &str) -> Result<BotRecord, DeployError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Token {}", self.api_token))
            .timeout(self.timeout)
            .json(&CreateBotRequest::new(meeting_url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            error!("Error response from Recall: {} {}", status.as_u16(), body);
            return Err(DeployError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        let record = serde_json::from_slice::<BotRecord>(&bytes).map_err(|e| {
            error!("Failed to parse Recall bot record: {}", e);
            DeployError::InvalidResponse(e.to_string())
        })?;

        info!("Recall created bot {} for {}", record.id, meeting_url);
        Ok(record)
    }
}
