use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};

use crate::{
    TokenState, cookies,
    error::ApiError,
    token::{Identity, TokenCodec},
};

/// Raw token from `Authorization: Bearer <token>`, the fallback for
/// non-browser clients.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// extract_credential
///
/// Exactly one credential is used per request: the session cookie when
/// present, otherwise the bearer header. A bad cookie never falls through to
/// the header.
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    cookies::read(headers).or_else(|| bearer_token(headers))
}

/// Extracts and verifies the request's credential. `None` covers both
/// "no credential" and "credential rejected".
pub fn resolve_identity(headers: &HeaderMap, codec: &TokenCodec) -> Option<Identity> {
    let token = extract_credential(headers)?;
    codec.verify(&token).ok()
}

/// AuthUser
///
/// The authenticated administrator, as seen by an API handler. Taking
/// `AuthUser` as an argument is what guards a handler: the body only runs
/// once a valid identity has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    /// Subject id of the admin account (also the AI service agent id).
    pub id: String,
}

/// AuthUser Extractor Implementation
///
/// Re-derives and re-verifies the credential (cookie first, bearer fallback)
/// on its own. It does not read what the auth gate attached, so handlers
/// stay protected even when mounted on a router without the gate.
///
/// Rejection: `ApiError::Unauthorized` (401, uniform message) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = TokenState::from_ref(state);

        let identity = resolve_identity(&parts.headers, &codec).ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: identity.subject,
        })
    }
}
