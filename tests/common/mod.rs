#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer};
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use meetbot::types::BotRecord;
use meetbot::{configure, AppConfig, AppState, BotDeployer, DeployError};

pub const JWT_SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

type Script = Box<dyn Fn(&str) -> Result<BotRecord, DeployError> + Send + Sync>;

/// Stands in for the Recall API and remembers every meeting URL it was asked for.
pub struct FakeDeployer {
    script: Script,
    calls: Mutex<Vec<String>>,
}

impl FakeDeployer {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<BotRecord, DeployError> + Send + Sync + 'static,
    {
        Arc::new(FakeDeployer {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answers like the provider: one `joining` status change, URL echoed back.
    pub fn joining(bot_id: &'static str) -> Arc<Self> {
        Self::new(move |meeting_url| Ok(bot_record(bot_id, &["joining"], meeting_url)))
    }

    pub fn failing<F>(make_error: F) -> Arc<Self>
    where
        F: Fn() -> DeployError + Send + Sync + 'static,
    {
        Self::new(move |_| Err(make_error()))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotDeployer for FakeDeployer {
    async fn create_bot(&self, meeting_url: &str) -> Result<BotRecord, DeployError> {
        self.calls.lock().unwrap().push(meeting_url.to_owned());
        (self.script)(meeting_url)
    }
}

pub fn bot_record(id: &str, codes: &[&str], meeting_url: &str) -> BotRecord {
    let status_changes: Vec<_> = codes.iter().map(|code| json!({ "code": code })).collect();
    serde_json::from_value(json!({
        "id": id,
        "status_changes": status_changes,
        "meeting_url": meeting_url,
    }))
    .unwrap()
}

pub fn app_config(jwt_secret: Option<&str>) -> AppConfig {
    AppConfig {
        recall_api_token: "test-recall-token".to_string(),
        recall_api_url: "http://127.0.0.1:9/api/v1/bot".to_string(),
        recall_timeout: Duration::from_secs(5),
        supabase_jwt_secret: jwt_secret.map(str::to_owned),
    }
}

/// A token shaped like the project's anon key.
pub fn anon_key(secret: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    encode(
        &Header::default(),
        &json!({ "iss": "supabase", "role": "anon", "exp": exp }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Serves the whole app on an ephemeral port and returns its base URL.
pub fn spawn_app(config: AppConfig, deployer: Arc<dyn BotDeployer>) -> String {
    let app_config = Arc::new(config);
    let app_state = Arc::new(AppState::new(deployer));

    let server = HttpServer::new(move || {
        App::new().configure(configure(app_config.clone(), app_state.clone()))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

async fn stall() -> HttpResponse {
    actix_web::rt::time::sleep(Duration::from_secs(5)).await;
    HttpResponse::Ok().finish()
}

/// Serves a `POST` route at `path` that only answers after five seconds.
pub fn spawn_stalling(path: &'static str) -> String {
    let server = HttpServer::new(move || App::new().route(path, web::post().to(stall)))
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}
