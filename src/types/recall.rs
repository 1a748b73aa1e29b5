use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status reported for a bot the provider created but has not moved along yet.
pub const DEFAULT_BOT_STATUS: &str = "created";

#[derive(Serialize, Debug, Clone)]
pub struct CreateBotRequest {
    pub meeting_url: String,
    pub recording_config: RecordingConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecordingConfig {
    pub transcript: TranscriptConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TranscriptConfig {
    pub provider: TranscriptProvider,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TranscriptProvider {
    pub recallai_streaming: RecallAiStreaming,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecallAiStreaming {
    pub mode: String,
    pub language_code: String,
}

impl RecordingConfig {
    /// Real-time English transcription tuned for latency over accuracy.
    pub fn low_latency_english() -> Self {
        RecordingConfig {
            transcript: TranscriptConfig {
                provider: TranscriptProvider {
                    recallai_streaming: RecallAiStreaming {
                        mode: "prioritize_low_latency".to_string(),
                        language_code: "en".to_string(),
                    },
                },
            },
        }
    }
}

impl CreateBotRequest {
    pub fn new(meeting_url: &str) -> Self {
        CreateBotRequest {
            meeting_url: meeting_url.to_owned(),
            recording_config: RecordingConfig::low_latency_english(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct StatusChange {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub sub_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BotRecord {
    pub id: String,
    #[serde(default)]
    pub status_changes: Vec<StatusChange>,
    #[serde(default)]
    pub meeting_url: Value,
}

impl BotRecord {
    /// Code of the first status change, or "created" when there is none.
    pub fn initial_status(&self) -> String {
        self.status_changes
            .first()
            .and_then(|change| change.code.as_deref())
            .filter(|code| !code.is_empty())
            .unwrap_or(DEFAULT_BOT_STATUS)
            .to_string()
    }
}
