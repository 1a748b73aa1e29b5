use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::types::{Credentials, Profile, Session, SignUpResponse, User};

/// REST client for the hosted identity provider (auth endpoints and the
/// `profiles` table).
#[derive(Clone, Debug)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        IdentityClient {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.supabase_url.clone(), config.supabase_anon_key.clone())
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    fn request(&self, builder: RequestBuilder, bearer: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, ClientError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let response = self
            .request(self.client.post(&url), &self.anon_key)
            .json(&Credentials {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .send()
            .await?;

        parse_json(response).await
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .request(self.client.post(&url), &self.anon_key)
            .json(&Credentials {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .send()
            .await?;

        parse_json(response).await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), ClientError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .request(self.client.post(&url), access_token)
            .send()
            .await?;

        ensure_success(response).await.map(|_| ())
    }

    /// Resolves the user behind an access token, i.e. validates a stored session.
    pub async fn get_user(&self, access_token: &str) -> Result<User, ClientError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .request(self.client.get(&url), access_token)
            .send()
            .await?;

        parse_json(response).await
    }

    pub async fn insert_profile(&self, profile: &Profile, bearer: &str) -> Result<(), ClientError> {
        let url = format!("{}/rest/v1/profiles", self.base_url);
        let response = self
            .request(self.client.post(&url), bearer)
            .header("Prefer", "return=minimal")
            .json(&[profile])
            .send()
            .await?;

        ensure_success(response).await?;
        debug!("Inserted profile for {}", profile.id);
        Ok(())
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read response body".to_string());
    error!("Error response from identity provider: {} {}", status.as_u16(), body);

    Err(ClientError::Rejected {
        status: status.as_u16(),
        message: provider_message(&body),
    })
}

/// The auth endpoints and the table API each name their message field differently.
fn provider_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .find_map(|field| value.get(*field).and_then(Value::as_str))
        })
        .map(str::to_owned)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Authentication failed".to_string()
            } else {
                body.to_string()
            }
        })
}
