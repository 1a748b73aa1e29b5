//! Client side of the deploy flow: the submission adapter that calls the
//! deploy function, and the identity provider pieces behind sign-in.

pub mod auth_form;
pub mod deploy;
pub mod identity;
pub mod in_flight;
pub mod session;
pub mod store;

pub use auth_form::{AuthForm, AuthMode, AuthOutcome};
pub use deploy::{DeployClient, DeployForm, SubmissionStatus};
pub use identity::IdentityClient;
pub use in_flight::InFlight;
pub use session::{AuthEvent, AuthState, AuthSubscription};
pub use store::SessionStore;
