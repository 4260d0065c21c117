use axum::http::Method;
use axum::Router;

use super::app::{ADMIN_PASSWORD, ADMIN_USERNAME};
use super::http::{request, response_json};

pub fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}

pub async fn admin_token(app: &Router) -> String {
    let response = request(
        app,
        Method::POST,
        "/api/auth/login",
        Some(serde_json::json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD,
        })),
        &[],
    )
    .await;

    let (status, _headers, body) = response_json(response).await;
    assert!(status.is_success(), "admin login failed: {body}");

    body["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

pub async fn admin_headers(app: &Router) -> Vec<(&'static str, String)> {
    vec![("authorization", auth_header(&admin_token(app).await))]
}
