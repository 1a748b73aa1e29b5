use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::types::{Session, User};

#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Session),
    UserUpdated(User),
    SignedOut,
}

/// Who is signed in. Cloning shares the same underlying state.
#[derive(Clone, Debug)]
pub struct AuthState {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl AuthState {
    /// Starts from a stored session, if one survived from an earlier run.
    pub fn new(initial: Option<Session>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        AuthState { tx: Arc::new(tx) }
    }

    pub fn session(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().as_ref().map(|session| session.user.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn apply(&self, event: AuthEvent) {
        debug!("Auth event: {}", event_name(&event));
        self.tx.send_modify(|current| match event {
            AuthEvent::SignedIn(session) => {
                *current = Some(session);
            }
            AuthEvent::UserUpdated(user) => {
                if let Some(session) = current.as_mut() {
                    session.user = user;
                }
            }
            AuthEvent::SignedOut => {
                *current = None;
            }
        });
    }

    /// Runs `callback` with the new user after every change until the returned
    /// handle is unsubscribed or dropped. Must be called inside a tokio runtime.
    pub fn subscribe<F>(&self, mut callback: F) -> AuthSubscription
    where
        F: FnMut(Option<&User>) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let user = rx
                    .borrow_and_update()
                    .as_ref()
                    .map(|session| session.user.clone());
                callback(user.as_ref());
            }
        });

        AuthSubscription {
            handle: Some(handle),
        }
    }
}

fn event_name(event: &AuthEvent) -> &'static str {
    match event {
        AuthEvent::SignedIn(_) => "SIGNED_IN",
        AuthEvent::UserUpdated(_) => "USER_UPDATED",
        AuthEvent::SignedOut => "SIGNED_OUT",
    }
}

#[must_use = "dropping the subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct AuthSubscription {
    handle: Option<JoinHandle<()>>,
}

impl AuthSubscription {
    pub fn unsubscribe(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}
