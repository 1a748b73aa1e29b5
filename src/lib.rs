//! Meeting bot deployment: an HTTP function that proxies bot creation to the
//! Recall API, plus the client-side pieces that call it (submission adapter,
//! identity provider client and auth state).

use std::sync::Arc;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod recall;
pub mod routes;
pub mod types;

pub use config::{AppConfig, ClientConfig};
pub use error::{ClientError, DeployError};
pub use recall::{BotDeployer, RecallClient};

use middleware::auth::Authentication;
use middleware::cors::cors_headers;
use types::{DeployBotRequest, DeployBotResponse, ErrorBody};

pub struct AppState {
    pub deployer: Arc<dyn BotDeployer>,
}

impl AppState {
    pub fn new(deployer: Arc<dyn BotDeployer>) -> Self {
        AppState { deployer }
    }

    pub fn from_config(app_config: &AppConfig) -> Self {
        Self::new(Arc::new(RecallClient::from_config(app_config)))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(routes::deploy::deploy_recall_bot),
    components(schemas(DeployBotRequest, DeployBotResponse, ErrorBody))
)]
pub struct ApiDoc;

/// Registers every route. Shared by the Shuttle entry point and the tests.
pub fn configure(
    app_config: Arc<AppConfig>,
    app_state: Arc<AppState>,
) -> impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(app_state))
            .service(routes::health::health_check)
            .service(Scalar::with_url("/scalar", ApiDoc::openapi()))
            .service(
                web::scope("/functions/v1")
                    .wrap(Authentication { app_config })
                    .wrap(cors_headers())
                    .service(routes::deploy::deploy_recall_bot)
                    .service(routes::deploy::deploy_recall_bot_preflight),
            );
    }
}
