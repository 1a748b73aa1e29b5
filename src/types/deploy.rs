use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct DeployBotRequest {
    pub meeting_url: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct DeployBotResponse {
    pub success: bool,
    pub bot_id: String,
    pub status: String,
    /// Echoed from the bot record as the provider returned it
    #[schema(value_type = Object)]
    pub meeting_url: Value,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ErrorBody {
    pub error: String,
}
