//! Identity provider seam.
//!
//! Authentication itself happens elsewhere; the backend only needs the
//! signed-in user's email, if any.

/// Supplies the authenticated email of the current user.
pub trait IdentityProvider: Send + Sync {
    /// `None` when nobody is signed in.
    fn current_email(&self) -> Option<String>;
}

/// Fixed identity, used by the CLI (`--as`) and by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    pub fn signed_in(email: impl Into<String>) -> Self {
        Self(Some(email.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl From<Option<String>> for StaticIdentity {
    fn from(email: Option<String>) -> Self {
        Self(email.filter(|e| !e.trim().is_empty()))
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_email(&self) -> Option<String> {
        self.0.clone()
    }
}
