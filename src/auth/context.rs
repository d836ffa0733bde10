//! Process-scoped session context.
//!
//! [`SessionContext`] holds the current bearer credential. It is created
//! once, cloned into every component that needs it, and changed only
//! through [`init`](SessionContext::init) and [`clear`](SessionContext::clear).

use super::credential::{Credential, unix_now};
use crate::error::AuthError;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Shared holder of the signed-in credential.
///
/// Clones share the same slot: clearing through one clone signs out all.
///
/// # Examples
///
/// ```
/// use ragchat::auth::SessionContext;
///
/// let ctx = SessionContext::new();
/// assert!(ctx.bearer().is_err());
///
/// let other = ctx.clone();
/// other.init("header.e30.sig");
/// assert!(ctx.is_signed_in());
///
/// ctx.clear();
/// assert!(!other.is_signed_in());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl SessionContext {
    /// Creates a signed-out context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context already holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let ctx = Self::new();
        ctx.init(token);
        ctx
    }

    /// Stores a new credential, replacing any previous one.
    pub fn init(&self, token: impl Into<String>) {
        let credential = Credential::parse(token);
        info!(expires_at = ?credential.expires_at(), "session initialized");
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    /// Drops the credential. Returns true if one was held.
    pub fn clear(&self) -> bool {
        let had = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if had {
            info!("session cleared");
        }
        had
    }

    /// The stored credential, whether or not it is still valid.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the token to send as `Authorization: Bearer`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignInRequired`] if no credential is held or
    /// the held one is expired or undecodable.
    pub fn bearer(&self) -> Result<String, AuthError> {
        self.bearer_at(unix_now())
    }

    /// [`bearer`](Self::bearer) evaluated at `now` (seconds since the
    /// Unix epoch).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignInRequired`] as for [`bearer`](Self::bearer).
    pub fn bearer_at(&self, now: i64) -> Result<String, AuthError> {
        let credential = self.credential().ok_or(AuthError::SignInRequired)?;
        if let Err(reason) = credential.validate_at(now) {
            debug!(%reason, "stored credential unusable");
            return Err(AuthError::SignInRequired);
        }
        Ok(credential.token().to_string())
    }

    /// Returns true if a usable credential is held.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.bearer().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credential::tests::token_with_claims;

    #[test]
    fn test_empty_context_requires_sign_in() {
        let ctx = SessionContext::new();
        assert_eq!(ctx.bearer(), Err(AuthError::SignInRequired));
        assert!(ctx.credential().is_none());
        assert!(!ctx.clear());
    }

    #[test]
    fn test_init_then_bearer() {
        let token = token_with_claims(r#"{"exp":100}"#);
        let ctx = SessionContext::new();
        ctx.init(token.clone());
        assert_eq!(ctx.bearer_at(50), Ok(token));
    }

    #[test]
    fn test_expired_token_requires_sign_in() {
        let ctx = SessionContext::with_token(token_with_claims(r#"{"exp":100}"#));
        assert_eq!(ctx.bearer_at(100), Err(AuthError::SignInRequired));
        // The credential itself is kept until cleared.
        assert!(ctx.credential().is_some());
    }

    #[test]
    fn test_undecodable_token_requires_sign_in() {
        let ctx = SessionContext::with_token("opaque-token");
        assert_eq!(ctx.bearer_at(0), Err(AuthError::SignInRequired));
    }

    #[test]
    fn test_clones_share_state() {
        let ctx = SessionContext::new();
        let clone = ctx.clone();
        ctx.init(token_with_claims("{}"));
        assert!(clone.is_signed_in());
        assert!(clone.clear());
        assert!(!ctx.is_signed_in());
    }

    #[test]
    fn test_init_replaces_previous() {
        let ctx = SessionContext::with_token(token_with_claims(r#"{"exp":1}"#));
        let fresh = token_with_claims(r#"{"exp":999}"#);
        ctx.init(fresh.clone());
        assert_eq!(ctx.bearer_at(10), Ok(fresh));
    }
}
