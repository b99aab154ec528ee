mod common;

use awaken_console::create_router;
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, TestContext};
use reqwest::{StatusCode, redirect::Policy};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub ctx: TestContext,
}

async fn spawn_app() -> TestApp {
    let ctx = TestContext::new();
    ctx.repo.with_admin(ADMIN_EMAIL, ADMIN_PASSWORD);
    let router = create_router(ctx.state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, ctx }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

/// `name=value` part of a `Set-Cookie` header.
fn cookie_pair(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("Set-Cookie header missing")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = client()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_browser_session_lifecycle() {
    let app = spawn_app().await;
    let client = client();

    // 1. Anonymous visitor is sent to the login page.
    let response = client
        .get(format!("{}/admin/dashboard", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/");

    // 2. Sign in.
    let response = client
        .post(format!("{}/api/admin/login", app.address))
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = cookie_pair(&response);

    // 3. The login page now bounces to the dashboard.
    let response = client
        .get(format!("{}/", app.address))
        .header(reqwest::header::COOKIE, &session)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/admin/dashboard");

    // 4. The API accepts the cookie.
    let response = client
        .get(format!("{}/api/admin/profile", app.address))
        .header(reqwest::header::COOKIE, &session)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);

    // 5. Sign out hands back an emptied cookie; the browser drops the session.
    let response = client
        .post(format!("{}/api/admin/logout", app.address))
        .header(reqwest::header::COOKIE, &session)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = cookie_pair(&response);
    assert_eq!(cleared, "awaken-tk=");

    let response = client
        .get(format!("{}/api/admin/profile", app.address))
        .header(reqwest::header::COOKIE, &cleared)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.ctx.repo.admins.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_openapi_document_is_public() {
    let app = spawn_app().await;
    let response = client()
        .get(format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc: Value = response.json().await.unwrap();
    assert!(doc["paths"]["/api/admin/login"].is_object());
}
