//! Bearer credential with decoded expiry.
//!
//! The backend issues a JWT. Only the `exp` claim of its payload segment is
//! read; the signature is the server's business.

use crate::error::AuthError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Expiry {
    Never,
    At(i64),
    Undecodable,
}

/// A bearer token plus what could be learned from its payload.
///
/// # Examples
///
/// ```
/// use ragchat::auth::Credential;
///
/// let cred = Credential::parse("not-a-jwt");
/// assert!(cred.is_expired_at(0));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expiry: Expiry,
}

impl Credential {
    /// Parses a token. Never fails; a token whose payload cannot be read
    /// is kept but reported as expired.
    #[must_use]
    pub fn parse(token: impl Into<String>) -> Self {
        let token = token.into().trim().to_string();
        let expiry = decode_expiry(&token);
        Self { token, expiry }
    }

    /// The raw token, as sent in the `Authorization` header.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The `exp` claim, if the payload had one.
    #[must_use]
    pub const fn expires_at(&self) -> Option<i64> {
        match self.expiry {
            Expiry::At(exp) => Some(exp),
            Expiry::Never | Expiry::Undecodable => None,
        }
    }

    /// Returns true if the payload segment decoded.
    #[must_use]
    pub fn is_decodable(&self) -> bool {
        self.expiry != Expiry::Undecodable
    }

    /// Checks the credential against `now` (seconds since the Unix epoch).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] if the payload could not be
    /// decoded, or [`AuthError::Expired`] if `exp` lies in the past.
    pub fn validate_at(&self, now: i64) -> Result<(), AuthError> {
        match self.expiry {
            Expiry::Never => Ok(()),
            Expiry::At(exp) if exp > now => Ok(()),
            Expiry::At(exp) => Err(AuthError::Expired { expired_at: exp }),
            Expiry::Undecodable => Err(AuthError::InvalidCredential {
                reason: "token payload could not be decoded".to_string(),
            }),
        }
    }

    /// Returns true if the credential is unusable at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.validate_at(now).is_err()
    }

    /// Returns true if the credential is unusable right now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at())
            .field("decodable", &self.is_decodable())
            .finish()
    }
}

/// Current time in seconds since the Unix epoch.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[allow(clippy::cast_possible_truncation)]
fn decode_expiry(token: &str) -> Expiry {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload)) = (parts.next(), parts.next()) else {
        return Expiry::Undecodable;
    };

    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return Expiry::Undecodable;
    };
    let Ok(claims) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return Expiry::Undecodable;
    };
    let Some(claims) = claims.as_object() else {
        return Expiry::Undecodable;
    };

    match claims.get("exp") {
        None | Some(serde_json::Value::Null) => Expiry::Never,
        Some(exp) => exp
            .as_i64()
            .or_else(|| exp.as_f64().map(|f| f as i64))
            .map_or(Expiry::Undecodable, Expiry::At),
    }
}
