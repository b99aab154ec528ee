//! Session cookie transport.
//!
//! Binds an encoded identity token to the `awaken-tk` cookie. Nothing in this
//! module inspects or verifies the token itself.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "awaken-tk";

/// Cookie lifetime: 7 days. Note that this outlives the 24-hour token it
/// carries; a week-old cookie simply holds an expired token.
pub const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

fn session_cookie(value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Sets the session cookie, replacing any cookie of the same name.
pub fn attach(jar: CookieJar, token: String, secure: bool) -> CookieJar {
    jar.add(session_cookie(
        token,
        Duration::seconds(SESSION_MAX_AGE_SECS),
        secure,
    ))
}

/// Overwrites the session cookie with an empty, immediately expiring one.
///
/// Uses `add` rather than `CookieJar::remove` so the `Set-Cookie` header is
/// emitted even when the request carried no session cookie.
pub fn clear(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(session_cookie(String::new(), Duration::ZERO, secure))
}

/// Raw session cookie value, if present and non-empty.
pub fn read(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
