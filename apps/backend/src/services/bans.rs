//! Ban list maintenance.
//!
//! The ban list is one configuration record. Each change reads the record,
//! computes the new set and writes it back with compare-and-swap on the
//! version it read. A concurrent writer makes the swap fail; the change is
//! then recomputed from a fresh read, up to a bounded number of attempts.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::admin_allowlist::{looks_like_email, normalize_email};
use crate::config::app::DEFAULT_CAS_RETRIES;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::logging::pii::Redacted;
use crate::repos::app_config::{load_email_list, swap_email_list, BANS_DOC};
use crate::services::moderation::Moderated;
use crate::state::Session;
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanAdded {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanRemoved {
    Removed,
    NotPresent,
}

/// Ban list writer with a bounded compare-and-swap retry.
#[derive(Debug, Clone, Copy)]
pub struct BanList {
    max_attempts: u32,
}

impl Default for BanList {
    fn default() -> Self {
        Self::new(DEFAULT_CAS_RETRIES)
    }
}

fn normalized(email: &str) -> Result<String, DomainError> {
    let email = normalize_email(email);
    if !looks_like_email(&email) {
        return Err(DomainError::validation(
            ValidationKind::InvalidEmail,
            "not a valid email address",
        ));
    }
    Ok(email)
}

impl BanList {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Current ban list as stored; empty when the record was never written.
    pub async fn list(&self, store: &dyn DocumentStore) -> Result<BTreeSet<String>, DomainError> {
        Ok(load_email_list(store, BANS_DOC)
            .await?
            .map(|list| list.value.emails.iter().map(|e| normalize_email(e)).collect())
            .unwrap_or_default())
    }

    pub async fn add_ban(
        &self,
        store: &dyn DocumentStore,
        session: &mut Session,
        email: &str,
    ) -> Result<Moderated<BanAdded>, DomainError> {
        if !session.is_admin() {
            return Ok(Moderated::NoAccess(session.access()));
        }
        let email = normalized(email)?;
        let outcome = self
            .update(store, session, |set| {
                if set.insert(email.clone()) {
                    BanAdded::Added
                } else {
                    BanAdded::AlreadyPresent
                }
            })
            .await?;
        info!(email = %Redacted(&email), outcome = ?outcome, "ban add");
        Ok(Moderated::Done(outcome))
    }

    pub async fn remove_ban(
        &self,
        store: &dyn DocumentStore,
        session: &mut Session,
        email: &str,
    ) -> Result<Moderated<BanRemoved>, DomainError> {
        if !session.is_admin() {
            return Ok(Moderated::NoAccess(session.access()));
        }
        let email = normalize_email(email);
        let outcome = self
            .update(store, session, |set| {
                if set.remove(&email) {
                    BanRemoved::Removed
                } else {
                    BanRemoved::NotPresent
                }
            })
            .await?;
        info!(email = %Redacted(&email), outcome = ?outcome, "ban remove");
        Ok(Moderated::Done(outcome))
    }

    /// Replace the whole ban list. Duplicates collapse after normalization.
    pub async fn set_banned(
        &self,
        store: &dyn DocumentStore,
        session: &mut Session,
        emails: &[String],
    ) -> Result<Moderated<BTreeSet<String>>, DomainError> {
        if !session.is_admin() {
            return Ok(Moderated::NoAccess(session.access()));
        }
        let wanted = emails
            .iter()
            .map(|e| normalized(e))
            .collect::<Result<BTreeSet<_>, _>>()?;
        self.update(store, session, |set| *set = wanted.clone())
            .await?;
        info!(count = wanted.len(), "ban list replaced");
        Ok(Moderated::Done(wanted))
    }

    /// Read-modify-swap loop. `change` mutates the set and reports the outcome;
    /// an unchanged set is not written. On success the session's ban cache
    /// is refreshed with what was stored.
    async fn update<R, F>(
        &self,
        store: &dyn DocumentStore,
        session: &mut Session,
        mut change: F,
    ) -> Result<R, DomainError>
    where
        F: FnMut(&mut BTreeSet<String>) -> R,
    {
        for attempt in 1..=self.max_attempts {
            let current = load_email_list(store, BANS_DOC).await?;
            let version = current.as_ref().map(|list| list.version);
            let before: BTreeSet<String> = current
                .map(|list| list.value.emails.iter().map(|e| normalize_email(e)).collect())
                .unwrap_or_default();

            let mut after = before.clone();
            let outcome = change(&mut after);
            if after == before {
                session.set_banned_cache(after);
                return Ok(outcome);
            }

            match swap_email_list(store, BANS_DOC, version, after.iter().cloned().collect()).await {
                Ok(_) => {
                    session.set_banned_cache(after);
                    return Ok(outcome);
                }
                Err(DomainError::Conflict(ConflictKind::OptimisticLock, _)) => {
                    debug!(attempt, "ban list changed concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(attempts = self.max_attempts, "ban list update kept conflicting");
        Err(DomainError::conflict(
            ConflictKind::OptimisticLock,
            "ban list was modified concurrently; retry later",
        ))
    }
}
