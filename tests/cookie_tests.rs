use awaken_console::cookies::{self, SESSION_COOKIE_NAME, SESSION_MAX_AGE_SECS};
use axum::{
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
    let response = jar.into_response();
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn headers_with_cookie(cookie: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
    headers
}

#[test]
fn test_attach_sets_session_attributes() {
    let jar = cookies::attach(CookieJar::new(), "abc.def.ghi".to_string(), false);
    let headers = set_cookie_headers(jar);

    assert_eq!(headers.len(), 1);
    let cookie = &headers[0];
    assert!(cookie.starts_with("awaken-tk=abc.def.ghi"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains(&format!("Max-Age={}", SESSION_MAX_AGE_SECS)));
    assert!(!cookie.contains("Secure"));
}

#[test]
fn test_attach_marks_cookie_secure_in_production() {
    let jar = cookies::attach(CookieJar::new(), "t".to_string(), true);
    let headers = set_cookie_headers(jar);

    assert!(headers[0].contains("Secure"));
}

#[test]
fn test_clear_expires_cookie_immediately() {
    let headers = set_cookie_headers(cookies::clear(CookieJar::new(), false));

    assert_eq!(headers.len(), 1);
    assert!(headers[0].starts_with("awaken-tk=;") || headers[0].starts_with("awaken-tk=\"\""));
    assert!(headers[0].contains("Max-Age=0"));
    assert!(headers[0].contains("Path=/"));
}

#[test]
fn test_clear_twice_is_harmless() {
    let jar = cookies::clear(CookieJar::new(), false);
    let jar = cookies::clear(jar, false);
    let headers = set_cookie_headers(jar);

    // Same name and path: the second clear replaces the first.
    assert_eq!(headers.len(), 1);
    assert!(headers[0].contains("Max-Age=0"));
}

#[test]
fn test_read_returns_session_value() {
    let headers = headers_with_cookie("theme=dark; awaken-tk=tok123; other=1");
    assert_eq!(cookies::read(&headers), Some("tok123".to_string()));
}

#[test]
fn test_read_missing_or_empty_cookie_is_none() {
    assert_eq!(cookies::read(&HeaderMap::new()), None);
    assert_eq!(cookies::read(&headers_with_cookie("theme=dark")), None);
    assert_eq!(
        cookies::read(&headers_with_cookie(&format!("{}=", SESSION_COOKIE_NAME))),
        None
    );
}
