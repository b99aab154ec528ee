//! Server-rendered console pages.
//!
//! Pages are minimal HTML shells; the browser scripts call the JSON API
//! for data. Access control is the auth gate's job: by the time a dashboard
//! page renders, the gate has already redirected anonymous visitors.

use axum::{
    Extension,
    extract::Path,
    response::Html,
};

use crate::token::Identity;

/// Dashboard sections reachable under `/admin/dashboard/{section}`.
pub const DASHBOARD_SECTIONS: [&str; 3] = ["qa", "files", "chatbot"];

fn shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | Awaken Console</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    ))
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// login_page
///
/// Served at `/` and `/admin`. Signed-in visitors never see it; the gate
/// sends them to the dashboard.
pub async fn login_page() -> Html<String> {
    shell(
        "Sign in",
        "<main id=\"login\">\n<h1>Admin sign in</h1>\n\
         <form method=\"post\" action=\"/api/admin/login\" data-json>\n\
         <input type=\"email\" name=\"email\" required>\n\
         <input type=\"password\" name=\"password\" required>\n\
         <button type=\"submit\">Sign in</button>\n</form>\n</main>",
    )
}

fn greeting(identity: Option<&Identity>) -> String {
    match identity {
        Some(identity) => format!(
            "<p class=\"session\">Signed in as <code>{}</code></p>",
            escape(&identity.subject)
        ),
        None => String::new(),
    }
}

pub async fn dashboard_home(identity: Option<Extension<Identity>>) -> Html<String> {
    let nav = DASHBOARD_SECTIONS
        .iter()
        .map(|section| format!("<a href=\"/admin/dashboard/{section}\">{section}</a>"))
        .collect::<Vec<_>>()
        .join("\n");

    shell(
        "Dashboard",
        &format!(
            "<main id=\"dashboard\">\n<h1>Dashboard</h1>\n{}\n<nav>\n{nav}\n</nav>\n\
             <form method=\"post\" action=\"/api/admin/logout\"><button>Sign out</button></form>\n</main>",
            greeting(identity.as_ref().map(|Extension(id)| id))
        ),
    )
}

/// dashboard_section
///
/// Unknown sections render a not-found shell rather than an error status so
/// the console's client-side router can take over.
pub async fn dashboard_section(
    Path(section): Path<String>,
    identity: Option<Extension<Identity>>,
) -> Html<String> {
    let known = DASHBOARD_SECTIONS.contains(&section.as_str());
    let title = if known { section.as_str() } else { "Not found" };

    shell(
        title,
        &format!(
            "<main id=\"dashboard-{}\">\n<h1>{}</h1>\n{}\n\
             <a href=\"/admin/dashboard\">Back</a>\n</main>",
            escape(&section),
            escape(title),
            greeting(identity.as_ref().map(|Extension(id)| id))
        ),
    )
}
