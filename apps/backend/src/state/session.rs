//! Per-session context: who is acting, with which access, plus the cached
//! ban list and the viewer's favorites.
//!
//! Access is decided once in [`Session::start`] and kept for the lifetime of
//! the session; operations do not re-check the allow-list.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info};

use crate::auth::IdentityProvider;
use crate::config::admin_allowlist::{normalize_email, AdminAllowlist};
use crate::errors::domain::DomainError;
use crate::logging::pii::Redacted;
use crate::repos::app_config::{load_email_list, ADMINS_DOC, BANS_DOC};
use crate::store::DocumentStore;

/// What the session is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Nobody signed in.
    Anonymous,
    /// Signed in, not on the admin allow-list.
    Member,
    Admin,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::Anonymous => "not signed in",
            Access::Member => "signed in without admin access",
            Access::Admin => "admin",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    email: Option<String>,
    access: Access,
    banned: BTreeSet<String>,
    favorites: BTreeSet<String>,
}

impl Session {
    /// Resolve the current identity and its access level.
    ///
    /// Reads the admin allow-list and the ban list once. An anonymous
    /// identity issues no store calls.
    pub async fn start(
        store: &dyn DocumentStore,
        identity: &dyn IdentityProvider,
    ) -> Result<Self, DomainError> {
        let Some(email) = identity
            .current_email()
            .map(|e| normalize_email(&e))
            .filter(|e| !e.is_empty())
        else {
            debug!("session started without identity");
            return Ok(Self::anonymous());
        };

        let (admins, bans) = futures::try_join!(
            load_email_list(store, ADMINS_DOC),
            load_email_list(store, BANS_DOC),
        )?;
        let admins = admins
            .map(|list| AdminAllowlist::new(list.value.emails))
            .unwrap_or_default();
        let access = if admins.is_admin(&email) {
            Access::Admin
        } else {
            Access::Member
        };

        let mut session = Self::with_access(email, access);
        session.set_banned_cache(bans.map(|list| list.value.emails).unwrap_or_default());
        info!(email = %Redacted(session.email().unwrap_or_default()), access = ?access, "session started");
        Ok(session)
    }

    pub fn anonymous() -> Self {
        Self {
            email: None,
            access: Access::Anonymous,
            banned: BTreeSet::new(),
            favorites: BTreeSet::new(),
        }
    }

    /// Session with a known access level and an empty ban cache.
    pub fn with_access(email: impl Into<String>, access: Access) -> Self {
        let email = normalize_email(&email.into());
        let access = if email.is_empty() { Access::Anonymous } else { access };
        Self {
            email: (!email.is_empty()).then_some(email),
            access,
            banned: BTreeSet::new(),
            favorites: BTreeSet::new(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_admin(&self) -> bool {
        self.access == Access::Admin
    }

    /// Checked against the cached ban list.
    pub fn is_banned(&self, email: &str) -> bool {
        self.banned.contains(&normalize_email(email))
    }

    /// Whether the session's own identity is banned.
    pub fn is_self_banned(&self) -> bool {
        self.email.as_deref().is_some_and(|e| self.is_banned(e))
    }

    pub fn banned(&self) -> &BTreeSet<String> {
        &self.banned
    }

    /// Replace the cached ban list, e.g. after a ban list write.
    pub fn set_banned_cache<I: IntoIterator<Item = String>>(&mut self, emails: I) {
        self.banned = emails.into_iter().map(|e| normalize_email(&e)).collect();
    }

    pub async fn refresh_bans(&mut self, store: &dyn DocumentStore) -> Result<(), DomainError> {
        let emails = load_email_list(store, BANS_DOC)
            .await?
            .map(|list| list.value.emails)
            .unwrap_or_default();
        self.set_banned_cache(emails);
        Ok(())
    }

    /// Flip the favorite flag of a game; returns the new state.
    pub fn toggle_favorite(&mut self, game_id: &str) -> bool {
        if self.favorites.remove(game_id) {
            false
        } else {
            self.favorites.insert(game_id.to_string());
            true
        }
    }

    pub fn is_favorite(&self, game_id: &str) -> bool {
        self.favorites.contains(game_id)
    }
}
