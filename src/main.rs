use std::sync::Arc;

use actix_web::web;
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;
use tracing::info;

use meetbot::{configure, AppConfig, AppState};

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secret_store: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static> {
    let app_config = AppConfig::new(&secret_store)?;

    info!(
        "Forwarding bot requests to {} (timeout {:?}, caller gate {})",
        app_config.recall_api_url,
        app_config.recall_timeout,
        if app_config.supabase_jwt_secret.is_some() { "on" } else { "off" }
    );

    let app_state = Arc::new(AppState::from_config(&app_config));

    Ok(configure(Arc::new(app_config), app_state).into())
}
