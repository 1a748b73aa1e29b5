use actix_web::{options, post, web, HttpResponse};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::DeployError;
use crate::middleware::auth::AuthenticatedClient;
use crate::types::{DeployBotRequest, DeployBotResponse, ErrorBody};
use crate::AppState;

/// Deploy a transcription bot into a meeting
#[utoipa::path(
    post,
    path = "/functions/v1/deploy-recall-bot",
    request_body = DeployBotRequest,
    responses(
        (status = 200, description = "Bot created", body = DeployBotResponse),
        (status = 400, description = "Missing meeting_url", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 500, description = "Unparseable body, Recall API or transport failure", body = ErrorBody),
        (status = 504, description = "Recall API did not answer in time", body = ErrorBody),
    )
)]
#[post("/deploy-recall-bot")]
pub async fn deploy_recall_bot(
    app_state: web::Data<Arc<AppState>>,
    authenticated_client: AuthenticatedClient,
    body: web::Bytes,
) -> Result<web::Json<DeployBotResponse>, DeployError> {
    let meeting_url = parse_meeting_url(&body)?;

    info!(
        "Deploying bot for {} (caller role: {})",
        meeting_url, authenticated_client.role
    );

    let record = app_state.deployer.create_bot(&meeting_url).await?;

    Ok(web::Json(DeployBotResponse {
        success: true,
        status: record.initial_status(),
        bot_id: record.id,
        meeting_url: record.meeting_url,
    }))
}

#[options("/deploy-recall-bot")]
pub async fn deploy_recall_bot_preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

fn parse_meeting_url(body: &[u8]) -> Result<String, DeployError> {
    let request: DeployBotRequest = serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected deploy body: {}", e);
        DeployError::InvalidBody(e.to_string())
    })?;

    // Blank counts as missing, but the URL is forwarded as sent
    request
        .meeting_url
        .filter(|url| !url.trim().is_empty())
        .ok_or(DeployError::MissingMeetingUrl)
}
