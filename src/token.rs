use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

/// Fixed lifetime of an identity token: 24 hours from issuance.
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Claims
///
/// The signed payload of an identity token. The subject travels under the
/// `userId` key so tokens stay interchangeable with existing console clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Issued At, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiration Time, seconds since the Unix epoch. Always `iat + 24h`.
    pub exp: i64,
}

/// Identity
///
/// The resolved administrator behind a verified token. Created once per
/// verification and never mutated afterwards; the gate hands it to page
/// renderers through the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

/// InvalidToken
///
/// The single failure value of `TokenCodec::verify`. Malformed, forged and
/// expired tokens are indistinguishable to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid or expired token")]
pub struct InvalidToken;

/// TokenCodec
///
/// Signs and verifies HS256 identity tokens with the process-wide secret.
/// Holds no mutable state, so one instance is shared by every request.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Builds the codec from the configured secret. An empty secret is a
    /// configuration error and must stop the process at startup.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Issues a token for `subject`, valid for 24 hours from now.
    pub fn issue(&self, subject: &str) -> Result<String, Error> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_at(&self, subject: &str, issued_at: i64) -> Result<String, Error> {
        let claims = Claims {
            user_id: subject.to_string(),
            iat: issued_at,
            exp: issued_at + TOKEN_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Verifies a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Identity, InvalidToken> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies signature and structure, then rejects the token once
    /// `now >= exp`. No leeway; `now` is the only clock consulted.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Identity, InvalidToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(kind = ?e.kind(), "token rejected");
            InvalidToken
        })?;

        let claims = data.claims;
        if now >= claims.exp {
            tracing::debug!(exp = claims.exp, now, "token rejected: expired");
            return Err(InvalidToken);
        }
        if claims.user_id.is_empty() {
            return Err(InvalidToken);
        }

        Ok(Identity {
            subject: claims.user_id,
        })
    }
}
