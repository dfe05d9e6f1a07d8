//! Admin allow-list and email normalization.
//!
//! The allow-list lives in the `admins` configuration record. Entries are
//! exact addresses or glob patterns:
//! - `admin@compat.dev`
//! - `*@compat.dev`
//! - `ops@*.compat.dev`

use unicode_normalization::UnicodeNormalization;

/// Normalize an email for storage and comparison: trim, NFKC, lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// Minimal shape check applied before an address is stored in a list.
pub fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowlist {
    patterns: Vec<String>,
}

impl AdminAllowlist {
    /// Build from raw entries; blank entries are dropped.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = entries
            .into_iter()
            .map(|e| normalize_email(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.patterns.iter().any(|p| matches_pattern(&email, p))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Glob match where `*` matches any (possibly empty) run of characters.
fn matches_pattern(email: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return email == pattern;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return false,
    };
    let Some(mut remaining) = email.strip_prefix(first) else {
        return false;
    };

    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return remaining.is_empty(),
    };
    for part in middle {
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}
