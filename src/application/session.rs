use crate::domain::models::AuthSession;
use crate::infrastructure::auth_client::{
    AuthHttpClient, AuthTokenResponse, PasswordSignInRequest, RefreshSessionRequest, SignUpRequest,
};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::session_store::SessionStore;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

const SESSION_LEEWAY_SECONDS: i64 = 60;

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;
type SessionListener = Box<dyn Fn(Option<&AuthSession>) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureSessionResult {
    Existing(AuthSession),
    Refreshed(AuthSession),
    SignInRequired,
}

/// Owns the authenticated/unauthenticated transition: password sign-in and
/// sign-up, session persistence, silent refresh, and change notification.
/// Everything behind it is gated on the session this manager hands out.
pub struct SessionManager<S, C>
where
    S: SessionStore,
    C: AuthHttpClient,
{
    session_store: Arc<S>,
    auth_client: Arc<C>,
    listeners: Mutex<Vec<SessionListener>>,
    now_provider: NowProvider,
}

impl<S, C> SessionManager<S, C>
where
    S: SessionStore,
    C: AuthHttpClient,
{
    pub fn new(session_store: Arc<S>, auth_client: Arc<C>) -> Self {
        Self {
            session_store,
            auth_client,
            listeners: Mutex::new(Vec::new()),
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    /// Registers a listener invoked with `Some` on sign-in and refresh and
    /// with `None` on sign-out.
    pub fn on_session_change(&self, listener: impl Fn(Option<&AuthSession>) + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Box::new(listener));
        }
    }

    fn notify(&self, session: Option<&AuthSession>) {
        let Ok(listeners) = self.listeners.lock() else {
            return;
        };
        for listener in listeners.iter() {
            listener(session);
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, InfraError> {
        ensure_non_empty(email, "email")?;
        ensure_non_empty(password, "password")?;

        let response = self
            .auth_client
            .sign_in_with_password(PasswordSignInRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        let session = self.session_from_response(response, None, None)?;
        self.session_store.save_session(&session)?;
        self.notify(Some(&session));
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), InfraError> {
        ensure_non_empty(email, "email")?;
        ensure_non_empty(password, "password")?;

        self.auth_client
            .sign_up(SignUpRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await
    }

    /// Revocation is best effort; the local session is always cleared and
    /// listeners always observe the sign-out.
    pub async fn sign_out(&self) -> Result<(), InfraError> {
        if let Some(session) = self.session_store.load_session()? {
            let _ = self.auth_client.sign_out(&session.access_token).await;
        }
        self.session_store.delete_session()?;
        self.notify(None);
        Ok(())
    }

    pub async fn ensure_session(&self) -> Result<EnsureSessionResult, InfraError> {
        let Some(stored) = self.session_store.load_session()? else {
            return Ok(EnsureSessionResult::SignInRequired);
        };

        if stored.is_valid_at((self.now_provider)(), SESSION_LEEWAY_SECONDS) {
            return Ok(EnsureSessionResult::Existing(stored));
        }

        let Some(refresh_token) = stored.refresh_token.clone() else {
            return Ok(EnsureSessionResult::SignInRequired);
        };

        match self
            .auth_client
            .refresh_session(RefreshSessionRequest { refresh_token })
            .await
        {
            Ok(response) => {
                let session = self.session_from_response(
                    response,
                    stored.refresh_token.clone(),
                    Some(&stored),
                )?;
                self.session_store.save_session(&session)?;
                self.notify(Some(&session));
                Ok(EnsureSessionResult::Refreshed(session))
            }
            Err(InfraError::Auth(_)) => Ok(EnsureSessionResult::SignInRequired),
            Err(error) => Err(error),
        }
    }

    fn session_from_response(
        &self,
        response: AuthTokenResponse,
        fallback_refresh_token: Option<String>,
        previous: Option<&AuthSession>,
    ) -> Result<AuthSession, InfraError> {
        let user_id = response
            .user_id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| previous.map(|session| session.user_id.clone()))
            .ok_or_else(|| {
                InfraError::Auth("auth response did not include a user id".to_string())
            })?;
        let email = response
            .email
            .or_else(|| previous.and_then(|session| session.email.clone()));
        let expires_at = (self.now_provider)() + Duration::seconds(response.expires_in.max(0));

        Ok(AuthSession {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(fallback_refresh_token),
            expires_at,
            user_id,
            email,
        })
    }
}

fn ensure_non_empty(value: &str, field: &str) -> Result<(), InfraError> {
    if value.trim().is_empty() {
        return Err(InfraError::Auth(format!("{field} must not be empty")));
    }
    Ok(())
}
