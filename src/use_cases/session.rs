use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::{AuthApi, LoginRequest, SessionError, SignUpRequest, TokenStore, UserProfile};

/// Holder for the one live session token, passed explicitly to whoever needs it.
///
/// Clones share the same slot. Presence of a token means "logged in" for
/// display purposes only; expiry is the backend's business.
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn set(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// Startup: load the persisted token into the session.
pub struct RestoreSessionUseCase<S> {
    pub store: S,
    pub session: Session,
}

impl<S> RestoreSessionUseCase<S>
where
    S: TokenStore,
{
    pub async fn execute(&self) -> Result<bool, SessionError> {
        let token = self.store.load().await.map_err(|err| {
            tracing::warn!(error = %err, "failed to read saved session.");
            SessionError::StorageFailure
        })?;

        match token {
            Some(token) if !token.trim().is_empty() => {
                self.session.set(token);
                tracing::info!("session restored.");
                Ok(true)
            }
            _ => {
                self.session.clear();
                Ok(false)
            }
        }
    }
}

// Account creation. Does not log the user in.
pub struct SignUpUseCase<A> {
    pub auth: A,
}

impl<A> SignUpUseCase<A>
where
    A: AuthApi,
{
    pub async fn execute(&self, req: SignUpRequest) -> Result<UserProfile, SessionError> {
        req.validate()?;
        let profile = self.auth.sign_up(&req).await?;
        tracing::info!(user_id = profile.id, "account created.");
        Ok(profile)
    }
}

// Log in, persist the issued token, and make it the live session.
pub struct LogInUseCase<A, S> {
    pub auth: A,
    pub store: S,
    pub session: Session,
}

impl<A, S> LogInUseCase<A, S>
where
    A: AuthApi,
    S: TokenStore,
{
    pub async fn execute(&self, req: LoginRequest) -> Result<(), SessionError> {
        req.validate()?;
        let issued = self.auth.log_in(&req).await?;

        // Persistence is best-effort: the session works for this run either way.
        if let Err(err) = self.store.save(&issued.access_token).await {
            tracing::warn!(error = %err, "failed to persist session token.");
        }
        self.session.set(issued.access_token);
        tracing::info!("logged in.");
        Ok(())
    }
}

// Teardown: forget the token in memory and on disk.
pub struct LogOutUseCase<S> {
    pub store: S,
    pub session: Session,
}

impl<S> LogOutUseCase<S>
where
    S: TokenStore,
{
    pub async fn execute(&self) -> Result<(), SessionError> {
        self.session.clear();
        self.store.clear().await.map_err(|err| {
            tracing::warn!(error = %err, "failed to clear saved session.");
            SessionError::StorageFailure
        })?;
        tracing::info!("logged out.");
        Ok(())
    }
}
