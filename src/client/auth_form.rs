use tracing::{info, warn};

use crate::client::identity::IdentityClient;
use crate::client::in_flight::InFlight;
use crate::client::session::{AuthEvent, AuthState};
use crate::error::ClientError;
use crate::types::{Profile, Session};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

/// How a sign-in or sign-up attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Account created; the user still has to sign in.
    Created,
    SignedIn(Session),
    Failed(String),
}

impl AuthOutcome {
    pub fn message(&self) -> String {
        match self {
            AuthOutcome::Created => "Account created! You can now sign in.".to_string(),
            AuthOutcome::SignedIn(session) => format!(
                "Signed in as {}",
                session.user.email.as_deref().unwrap_or("unknown user")
            ),
            AuthOutcome::Failed(reason) => reason.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, AuthOutcome::Failed(_))
    }
}

#[derive(Debug, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    in_flight: InFlight,
    outcome: Option<AuthOutcome>,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        AuthForm {
            mode,
            ..Default::default()
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_set()
    }

    pub fn in_flight(&self) -> InFlight {
        self.in_flight.clone()
    }

    pub fn outcome(&self) -> Option<&AuthOutcome> {
        self.outcome.as_ref()
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.outcome = None;
    }

    pub async fn submit(&mut self, identity: &IdentityClient, auth_state: &AuthState) -> &AuthOutcome {
        self.outcome = None;
        let _submitting = self.in_flight.enter();

        let outcome = match self.validate() {
            Err(reason) => AuthOutcome::Failed(reason),
            Ok(()) => match self.mode {
                AuthMode::SignUp => match sign_up(identity, &self.email, &self.password).await {
                    Ok(()) => {
                        self.email.clear();
                        self.password.clear();
                        self.mode = AuthMode::SignIn;
                        AuthOutcome::Created
                    }
                    Err(e) => AuthOutcome::Failed(e.to_string()),
                },
                AuthMode::SignIn => {
                    match identity
                        .sign_in_with_password(&self.email, &self.password)
                        .await
                    {
                        Ok(session) => {
                            auth_state.apply(AuthEvent::SignedIn(session.clone()));
                            AuthOutcome::SignedIn(session)
                        }
                        Err(e) => AuthOutcome::Failed(e.to_string()),
                    }
                }
            },
        };

        if let AuthOutcome::Failed(reason) = &outcome {
            warn!("Authentication failed: {}", reason);
        }

        self.outcome.insert(outcome)
    }

    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("Email is required".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        Ok(())
    }
}

/// Creates the account and its profile row.
async fn sign_up(identity: &IdentityClient, email: &str, password: &str) -> Result<(), ClientError> {
    let response = identity.sign_up(email, password).await?;
    let user = response.user();

    // Without a session yet the table API only sees the anon key
    let bearer = response
        .session()
        .map(|session| session.access_token.as_str())
        .unwrap_or(identity.anon_key());
    identity.insert_profile(&Profile::from(user), bearer).await?;

    info!("Created account {}", user.id);
    Ok(())
}
