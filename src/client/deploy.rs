use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::client::in_flight::InFlight;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::types::DeployBotResponse;

pub const DEPLOY_FAILED: &str = "Failed to deploy bot";

/// Calls the deploy function with the service's public key.
#[derive(Clone, Debug)]
pub struct DeployClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl DeployClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        DeployClient {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.deploy_url(), config.supabase_anon_key.clone())
    }

    pub async fn deploy(&self, meeting_url: &str) -> Result<DeployBotResponse, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({ "meeting_url": meeting_url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The function answers errors as `{ "error": ... }`, anything else gets the fallback
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_owned))
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| DEPLOY_FAILED.to_string());
            error!("Deploy rejected with {}: {}", status.as_u16(), message);
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let deployed = response.json::<DeployBotResponse>().await?;
        info!("Deployed bot {}", deployed.bot_id);
        Ok(deployed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionStatus {
    Success { bot_id: String, message: String },
    Failure(String),
}

/// State behind the meeting URL form: one field, an in-flight flag, and the
/// outcome of the last submission.
#[derive(Debug, Default)]
pub struct DeployForm {
    pub meeting_url: String,
    in_flight: InFlight,
    status: Option<SubmissionStatus>,
}

impl DeployForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_meeting_url(&mut self, meeting_url: impl Into<String>) {
        self.meeting_url = meeting_url.into();
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_set()
    }

    /// The submit control is disabled while a submission is in flight.
    pub fn can_submit(&self) -> bool {
        !self.in_flight.is_set()
    }

    /// Handle on the in-flight flag that stays readable during `submit`.
    pub fn in_flight(&self) -> InFlight {
        self.in_flight.clone()
    }

    pub fn status(&self) -> Option<&SubmissionStatus> {
        self.status.as_ref()
    }

    pub async fn submit(&mut self, client: &DeployClient) -> &SubmissionStatus {
        self.status = None;
        let _submitting = self.in_flight.enter();

        let result = client.deploy(&self.meeting_url).await;

        let status = match result {
            Ok(deployed) => {
                self.meeting_url.clear();
                SubmissionStatus::Success {
                    message: format!("Bot deployed successfully! Bot ID: {}", deployed.bot_id),
                    bot_id: deployed.bot_id,
                }
            }
            Err(e) => SubmissionStatus::Failure(e.to_string()),
        };

        self.status.insert(status)
    }
}
