use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use meetbot::client::{
    store::DEFAULT_SESSION_FILE, AuthEvent, AuthForm, AuthMode, AuthOutcome, AuthState,
    DeployClient, DeployForm, IdentityClient, SessionStore, SubmissionStatus,
};
use meetbot::ClientConfig;

#[derive(Parser)]
#[command(name = "meetbot")]
#[command(about = "Deploy transcription bots into video meetings")]
struct Args {
    /// Where the signed-in session is kept between runs
    #[arg(long, default_value = DEFAULT_SESSION_FILE)]
    session_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    SignUp {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "MEETBOT_PASSWORD")]
        password: String,
    },
    /// Sign in with email and password
    SignIn {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "MEETBOT_PASSWORD")]
        password: String,
    },
    SignOut,
    /// Show the signed-in user
    Whoami,
    /// Send a bot into a meeting
    Deploy {
        /// e.g. https://meet.google.com/abc-defg-hij
        meeting_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = ClientConfig::from_env()?;
    let identity = IdentityClient::from_config(&config);
    let store = SessionStore::new(&args.session_file);

    let auth_state = AuthState::new(store.load_active(Utc::now()).await?);
    let subscription = auth_state.subscribe(|user| match user {
        Some(user) => info!("Signed in as {}", user.email.as_deref().unwrap_or("unknown user")),
        None => info!("Signed out"),
    });

    let result = run(args.command, &config, &identity, &store, &auth_state).await;

    subscription.unsubscribe();
    result
}

async fn run(
    command: Command,
    config: &ClientConfig,
    identity: &IdentityClient,
    store: &SessionStore,
    auth_state: &AuthState,
) -> Result<()> {
    match command {
        Command::SignUp { email, password } => {
            authenticate(AuthMode::SignUp, email, password, identity, store, auth_state).await
        }
        Command::SignIn { email, password } => {
            authenticate(AuthMode::SignIn, email, password, identity, store, auth_state).await
        }
        Command::SignOut => {
            if let Some(session) = auth_state.session() {
                identity.sign_out(&session.access_token).await?;
            }
            auth_state.apply(AuthEvent::SignedOut);
            store.clear().await?;
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            let Some(session) = auth_state.session() else {
                bail!("Not signed in");
            };
            match identity.get_user(&session.access_token).await {
                Ok(user) => {
                    auth_state.apply(AuthEvent::UserUpdated(user.clone()));
                    println!("{} ({})", user.email.as_deref().unwrap_or("-"), user.id);
                    Ok(())
                }
                Err(e) if e.is_auth_rejection() => {
                    auth_state.apply(AuthEvent::SignedOut);
                    store.clear().await?;
                    bail!("Session is no longer valid: {}", e)
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::Deploy { meeting_url } => {
            if !auth_state.is_signed_in() {
                bail!("Sign in first");
            }

            let client = DeployClient::from_config(config);
            let mut form = DeployForm::new();
            form.set_meeting_url(meeting_url);

            match form.submit(&client).await {
                SubmissionStatus::Success { message, .. } => {
                    println!("{}", message);
                    Ok(())
                }
                SubmissionStatus::Failure(message) => bail!("{}", message),
            }
        }
    }
}

async fn authenticate(
    mode: AuthMode,
    email: String,
    password: String,
    identity: &IdentityClient,
    store: &SessionStore,
    auth_state: &AuthState,
) -> Result<()> {
    let mut form = AuthForm::new(mode);
    form.email = email;
    form.password = password;

    let outcome = form.submit(identity, auth_state).await;
    if let AuthOutcome::SignedIn(session) = outcome {
        store.save(session).await?;
    }

    match outcome {
        AuthOutcome::Failed(reason) => bail!("{}", reason),
        outcome => {
            println!("{}", outcome.message());
            Ok(())
        }
    }
}
