use serde::{Deserialize, Serialize};

use crate::UserId;

/// User information persisted in the authenticated session.
///
/// The session provider is trusted for these values. `declared_role` is the
/// role name the provider attached at login and is only consulted when the
/// permission store cannot be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
    declared_role: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from session data.
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        declared_role: Option<String>,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
            declared_role,
        }
    }

    /// Returns the numeric user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the role name declared by the session provider.
    #[must_use]
    pub fn declared_role(&self) -> Option<&str> {
        self.declared_role.as_deref()
    }
}
