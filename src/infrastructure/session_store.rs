use crate::domain::models::AuthSession;
use crate::infrastructure::error::InfraError;
use std::sync::Mutex;

pub trait SessionStore: Send + Sync {
    fn save_session(&self, session: &AuthSession) -> Result<(), InfraError>;
    fn load_session(&self) -> Result<Option<AuthSession>, InfraError>;
    fn delete_session(&self) -> Result<(), InfraError>;
}

/// Persists the session in the OS keychain so a relaunch does not force a
/// fresh sign-in.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service_name: String,
    account_name: String,
}

impl KeyringSessionStore {
    pub fn new(service_name: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            account_name: account_name.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, InfraError> {
        keyring::Entry::new(&self.service_name, &self.account_name)
            .map_err(|error| InfraError::Session(error.to_string()))
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new("leaklog.session", "default")
    }
}

impl SessionStore for KeyringSessionStore {
    fn save_session(&self, session: &AuthSession) -> Result<(), InfraError> {
        let payload =
            serde_json::to_string(session).map_err(|error| InfraError::Session(error.to_string()))?;
        self.entry()?
            .set_password(&payload)
            .map_err(|error| InfraError::Session(error.to_string()))
    }

    fn load_session(&self) -> Result<Option<AuthSession>, InfraError> {
        let payload = match self.entry()?.get_password() {
            Ok(value) => value,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(error) => return Err(InfraError::Session(error.to_string())),
        };

        let session = serde_json::from_str::<AuthSession>(&payload)
            .map_err(|error| InfraError::Session(error.to_string()))?;
        Ok(Some(session))
    }

    fn delete_session(&self) -> Result<(), InfraError> {
        match self.entry()?.delete_credential() {
            Ok(_) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(InfraError::Session(error.to_string())),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: Mutex<Option<AuthSession>>,
}

impl SessionStore for InMemorySessionStore {
    fn save_session(&self, session: &AuthSession) -> Result<(), InfraError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|error| InfraError::Session(format!("in-memory lock poisoned: {error}")))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn load_session(&self) -> Result<Option<AuthSession>, InfraError> {
        let guard = self
            .session
            .lock()
            .map_err(|error| InfraError::Session(format!("in-memory lock poisoned: {error}")))?;
        Ok(guard.clone())
    }

    fn delete_session(&self) -> Result<(), InfraError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|error| InfraError::Session(format!("in-memory lock poisoned: {error}")))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;

    fn token_pattern() -> impl Strategy<Value = String> {
        "[A-Za-z0-9._\\-]{1,64}".prop_map(|value| value.to_string())
    }

    fn arb_session() -> impl Strategy<Value = AuthSession> {
        (
            token_pattern(),
            prop::option::of(token_pattern()),
            0i64..4_000_000_000i64,
            token_pattern(),
            prop::option::of("[a-z]{1,12}@[a-z]{1,12}\\.com"),
        )
            .prop_map(|(access_token, refresh_token, expires_epoch, user_id, email)| {
                AuthSession {
                    access_token,
                    refresh_token,
                    expires_at: DateTime::<Utc>::from_timestamp(expires_epoch, 0)
                        .expect("valid epoch"),
                    user_id,
                    email,
                }
            })
    }

    proptest! {
        #[test]
        fn session_roundtrip(session in arb_session()) {
            let store = InMemorySessionStore::default();
            store.save_session(&session).expect("save session");
            let loaded = store.load_session().expect("load session").expect("session exists");
            prop_assert_eq!(loaded, session);
        }
    }

    #[test]
    fn delete_clears_the_stored_session() {
        let store = InMemorySessionStore::default();
        let session = AuthSession {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: Utc::now(),
            user_id: "user-1".to_string(),
            email: None,
        };
        store.save_session(&session).expect("save session");
        store.delete_session().expect("delete session");
        assert!(store.load_session().expect("load session").is_none());
    }
}
