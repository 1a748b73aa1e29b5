use std::time::Duration;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::types::ErrorBody;

/// Failures of the deploy handler. Every variant is terminal for the request.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("meeting_url is required")]
    MissingMeetingUrl,

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Recall API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Recall API timed out after {}s", .0.as_secs())]
    UpstreamTimeout(Duration),

    #[error("Invalid response from Recall API: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Transport(String),
}

impl ResponseError for DeployError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingMeetingUrl => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidBody(_)
            | Self::Upstream { .. }
            | Self::InvalidResponse(_)
            | Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// Failures seen by the client side: the deploy adapter and the identity client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }

    /// The provider refused the credentials, as opposed to being unreachable.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}
