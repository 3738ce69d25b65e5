//! # Override Authorizer
//!
//! Gates the reprint path behind a shared secret held by the server.
//!
//! The secret is compared on the server only, never shipped to the browser.
//! There is no lockout, rate limit or hashing: the secret is a plain shared
//! password known to shift supervisors.

use std::fmt;

/// Checks operator-supplied override passwords.
#[derive(Clone, Default)]
pub struct OverrideAuthorizer {
    secret: Option<String>,
}

impl OverrideAuthorizer {
    /// Creates an authorizer. `None` or an empty secret disables overrides.
    pub fn new(secret: Option<String>) -> Self {
        OverrideAuthorizer {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Whether an override secret is configured at all.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Returns true when `candidate` matches the configured secret.
    ///
    /// ## Example
    /// ```rust
    /// use sticker_core::OverrideAuthorizer;
    ///
    /// let auth = OverrideAuthorizer::new(Some("s3cret".to_string()));
    /// assert!(auth.verify("s3cret"));
    /// assert!(!auth.verify("s3cre"));
    /// assert!(!OverrideAuthorizer::new(None).verify(""));
    /// ```
    pub fn verify(&self, candidate: &str) -> bool {
        match &self.secret {
            Some(secret) => constant_time_eq(secret.as_bytes(), candidate.as_bytes()),
            None => false,
        }
    }
}

impl fmt::Debug for OverrideAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideAuthorizer")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Compares two byte strings without exiting early on the first mismatch.
///
/// Walks the longer input fully and folds differences into one accumulator,
/// so the running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let diff = (0..len).fold(0u8, |acc, i| {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        acc | (x ^ y)
    });
    diff == 0 && a.len() == b.len()
}
