use std::{
    future::{ready, Ready},
    sync::Arc,
};

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::AUTHORIZATION, Method},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::DeployError, AppConfig};

/// Claims carried by provider-issued tokens: the anon key and user access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: usize,
}

/// Caller of a gated route, as established by [`Authentication`].
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    pub role: String,
    pub user_id: Option<String>,
}

impl AuthenticatedClient {
    fn anonymous() -> Self {
        AuthenticatedClient {
            role: "anon".to_string(),
            user_id: None,
        }
    }
}

pub struct Authentication {
    pub app_config: Arc<AppConfig>,
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service,
            app_config: self.app_config.clone(),
        }))
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
    app_config: Arc<AppConfig>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Pre-flight requests never carry credentials
        if *req.method() != Method::OPTIONS {
            if let Some(secret) = self.app_config.supabase_jwt_secret.as_deref() {
                let token = req
                    .headers()
                    .get(AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "));

                match token {
                    Some(token) => match verify_token(token, secret) {
                        Ok(claims) => {
                            debug!("Authenticated caller with role {}", claims.role);
                            req.extensions_mut().insert(AuthenticatedClient {
                                role: claims.role,
                                user_id: claims.sub,
                            });
                        }
                        Err(e) => {
                            warn!("Invalid token: {:?}", e);
                        }
                    },
                    None => {
                        debug!("No bearer token on {}", req.path());
                    }
                }
            }
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    // User tokens carry `aud: authenticated`, the anon key carries none
    validation.validate_aud = false;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)
}

impl FromRequest for AuthenticatedClient {
    type Error = DeployError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(client) = req.extensions().get::<AuthenticatedClient>() {
            return ready(Ok(client.clone()));
        }

        let gated = req
            .app_data::<web::Data<Arc<AppConfig>>>()
            .map(|config| config.supabase_jwt_secret.is_some())
            .unwrap_or(false);

        if gated {
            ready(Err(DeployError::Unauthorized(
                "Missing or invalid authorization header".to_string(),
            )))
        } else {
            ready(Ok(AuthenticatedClient::anonymous()))
        }
    }
}
