use crate::infrastructure::error::InfraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-facing notification. Workflows hand these to whatever renders
/// them; nothing in the core displays anything itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

pub const LEAK_REGISTERED: &str = "Time leak registered.";
pub const LEAK_UPDATED: &str = "Time leak updated.";
pub const LEAK_DELETED: &str = "Time leak deleted.";
pub const SELECT_CATEGORY: &str = "Select a category before registering the leak.";
pub const UNKNOWN_CATEGORY: &str = "The selected category is not recognized.";
pub const SIGN_UP_CONFIRMATION_SENT: &str =
    "Account created. Check your inbox to confirm the address.";

/// Strips the enum wrapper so notices read as one sentence instead of
/// "could not load: store error: ...".
fn detail(error: &InfraError) -> String {
    match error {
        InfraError::Store(message)
        | InfraError::Auth(message)
        | InfraError::Session(message)
        | InfraError::InvalidConfig(message) => message.clone(),
        other => other.to_string(),
    }
}

pub fn could_not_register(error: &InfraError) -> Notice {
    Notice::error(format!("could not register the time leak: {}", detail(error)))
}

pub fn could_not_update(error: &InfraError) -> Notice {
    Notice::error(format!("could not update the time leak: {}", detail(error)))
}

pub fn could_not_delete(error: &InfraError) -> Notice {
    Notice::error(format!("could not delete the time leak: {}", detail(error)))
}

pub fn could_not_load(error: &InfraError) -> Notice {
    Notice::error(format!("could not load your data: {}", detail(error)))
}

pub fn sign_in_failed(error: &InfraError) -> Notice {
    Notice::error(format!("could not sign in: {}", detail(error)))
}

pub fn sign_up_failed(error: &InfraError) -> Notice {
    Notice::error(format!("could not create the account: {}", detail(error)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_keep_only_the_normalized_message() {
        let error = InfraError::Store("duplicate key (id=7)".to_string());
        let notice = could_not_register(&error);
        assert!(notice.is_error());
        assert_eq!(
            notice.message,
            "could not register the time leak: duplicate key (id=7)"
        );
    }

    #[test]
    fn auth_failures_get_mode_specific_prefixes() {
        let error = InfraError::Auth("Invalid login credentials".to_string());
        assert_eq!(
            sign_in_failed(&error).message,
            "could not sign in: Invalid login credentials"
        );
        assert_eq!(
            sign_up_failed(&error).message,
            "could not create the account: Invalid login credentials"
        );
    }

    #[test]
    fn success_notices_are_not_errors() {
        assert!(!Notice::success(LEAK_DELETED).is_error());
    }
}
