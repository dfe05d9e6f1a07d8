//! Process configuration read from the environment.

use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Items per page for every paged listing.
pub const DEFAULT_PAGE_SIZE: usize = 6;
/// Compare-and-swap attempts for configuration record writes.
pub const DEFAULT_CAS_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `DATABASE_URL`; required by the admin CLI.
    pub database_url: Option<String>,
    /// `COMPAT_PAGE_SIZE`
    pub page_size: usize,
    /// `COMPAT_CAS_RETRIES`
    pub cas_retries: u32,
    /// `COMPAT_ACTOR_EMAIL`: identity used by the admin CLI.
    pub actor_email: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            cas_retries: DEFAULT_CAS_RETRIES,
            actor_email: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// The configured database URL, or a config error when it is unset.
    pub fn require_database_url(&self) -> Result<&str, AppError> {
        self.database_url.as_deref().ok_or_else(|| {
            AppError::config("Required environment variable 'DATABASE_URL' is not set")
        })
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let page_size = parse_or(get("COMPAT_PAGE_SIZE"), "COMPAT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(AppError::config("COMPAT_PAGE_SIZE must be at least 1"));
        }
        let cas_retries = parse_or(get("COMPAT_CAS_RETRIES"), "COMPAT_CAS_RETRIES", DEFAULT_CAS_RETRIES)?;
        if cas_retries == 0 {
            return Err(AppError::config("COMPAT_CAS_RETRIES must be at least 1"));
        }

        Ok(Self {
            database_url: get("DATABASE_URL"),
            page_size,
            cas_retries,
            actor_email: get("COMPAT_ACTOR_EMAIL"),
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, AppError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{key} has an invalid value: '{raw}'"))),
    }
}
