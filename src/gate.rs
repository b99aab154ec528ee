//! Request-interception layer that classifies and authorizes every request.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{TokenState, auth, error::AUTH_REQUIRED};

/// Prefix covering every admin API endpoint.
pub const PROTECTED_API_PREFIX: &str = "/api/admin";

/// API paths exempt from the protected prefix. Login issues credentials and
/// logout must be able to clear a cookie whatever state the session is in.
pub const PUBLIC_API_ROUTES: [&str; 2] = ["/api/admin/login", "/api/admin/logout"];

/// Prefix covering the dashboard pages.
pub const PROTECTED_UI_PREFIX: &str = "/admin/dashboard";

/// Login pages, matched exactly.
pub const AUTH_UI_ROUTES: [&str; 2] = ["/", "/admin"];

/// Where unauthenticated dashboard visits are sent.
pub const LOGIN_PATH: &str = "/";

/// Where authenticated visits to a login page are sent.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    ProtectedApi,
    ProtectedUi,
    AuthUi,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(&'static str),
    Reject,
}

/// classify
///
/// Total, prefix-based classification. Precedence is fixed: protected API,
/// then protected UI, then auth UI; first match wins.
pub fn classify(path: &str) -> RouteClass {
    let public_api = PUBLIC_API_ROUTES
        .iter()
        .any(|route| path.starts_with(route));

    if path.starts_with(PROTECTED_API_PREFIX) && !public_api {
        RouteClass::ProtectedApi
    } else if path.starts_with(PROTECTED_UI_PREFIX) {
        RouteClass::ProtectedUi
    } else if AUTH_UI_ROUTES.contains(&path) {
        RouteClass::AuthUi
    } else {
        RouteClass::Public
    }
}

pub fn decide(class: RouteClass, authenticated: bool) -> GateDecision {
    match (class, authenticated) {
        (RouteClass::ProtectedApi, false) => GateDecision::Reject,
        (RouteClass::ProtectedUi, false) => GateDecision::Redirect(LOGIN_PATH),
        (RouteClass::AuthUi, true) => GateDecision::Redirect(DASHBOARD_PATH),
        _ => GateDecision::Allow,
    }
}

/// auth_gate
///
/// Runs once per request before any page or API logic. Verification is local
/// crypto only. On `Allow` with a verified identity, the `Identity` is stored
/// in the request extensions for page renderers.
pub async fn auth_gate(
    State(tokens): State<TokenState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let identity = auth::resolve_identity(request.headers(), &tokens);
    let class = classify(&path);

    match decide(class, identity.is_some()) {
        GateDecision::Allow => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        GateDecision::Redirect(location) => {
            tracing::debug!(%path, ?class, location, "gate redirect");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        GateDecision::Reject => {
            tracing::debug!(%path, "gate rejected unauthenticated API request");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": AUTH_REQUIRED })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_endpoint_is_exempt_from_api_protection() {
        assert_eq!(classify("/api/admin/login"), RouteClass::Public);
        assert_eq!(classify("/api/admin/logout"), RouteClass::Public);
        assert_eq!(classify("/api/admin/qa"), RouteClass::ProtectedApi);
        assert_eq!(classify("/api/admin"), RouteClass::ProtectedApi);
    }

    #[test]
    fn dashboard_prefix_is_protected_ui() {
        assert_eq!(classify("/admin/dashboard"), RouteClass::ProtectedUi);
        assert_eq!(classify("/admin/dashboard/qa"), RouteClass::ProtectedUi);
    }

    #[test]
    fn auth_routes_match_exactly() {
        assert_eq!(classify("/"), RouteClass::AuthUi);
        assert_eq!(classify("/admin"), RouteClass::AuthUi);
        assert_eq!(classify("/admin/settings"), RouteClass::Public);
        assert_eq!(classify("/health"), RouteClass::Public);
    }

    #[test]
    fn decisions_follow_the_route_class() {
        assert_eq!(decide(RouteClass::ProtectedApi, false), GateDecision::Reject);
        assert_eq!(decide(RouteClass::ProtectedApi, true), GateDecision::Allow);
        assert_eq!(
            decide(RouteClass::ProtectedUi, false),
            GateDecision::Redirect("/")
        );
        assert_eq!(decide(RouteClass::ProtectedUi, true), GateDecision::Allow);
        assert_eq!(
            decide(RouteClass::AuthUi, true),
            GateDecision::Redirect("/admin/dashboard")
        );
        assert_eq!(decide(RouteClass::AuthUi, false), GateDecision::Allow);
        assert_eq!(decide(RouteClass::Public, false), GateDecision::Allow);
    }
}
