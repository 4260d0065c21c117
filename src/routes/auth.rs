use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{
    dummy_argon2_hash, hash_password, sign_jwt_for_admin, verify_password, AdminAuthUser,
};
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::admins::Admin;
use crate::store::Store;
use crate::validation::validate_password;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/verify", get(verify))
        .route("/change-password", put(change_password))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminProfile {
    id: String,
    username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    admin: AdminProfile,
}

async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request(
            "VALIDATION_ERROR",
            "Username and password are required",
        ));
    }

    let admin = state.store().get_admin_by_username(&req.username)?;
    let Some(admin) = admin else {
        // Same cost as a real check so unknown usernames are not observable.
        let _ = verify_password(&req.password, dummy_argon2_hash());
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&req.password, &admin.password_hash)? {
        tracing::warn!(username = %admin.username, "Admin login failed");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = sign_jwt_for_admin(
        &admin.id,
        &state.config().admin_jwt_secret,
        state.config().admin_jwt_expires_in_hours,
    )?;
    tracing::info!(action = "admin_login", username = %admin.username, "Admin logged in");

    Ok(ok(LoginResponse {
        token,
        admin: AdminProfile {
            id: admin.id,
            username: admin.username,
        },
    }))
}

async fn verify(admin: AdminAuthUser) -> Result<impl IntoResponse, AppError> {
    Ok(ok(serde_json::json!({
        "admin": AdminProfile {
            id: admin.admin_id,
            username: admin.username,
        }
    })))
}

async fn change_password(
    admin: AdminAuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let stored = state
        .store()
        .get_admin_by_id(&admin.admin_id)?
        .ok_or_else(|| AppError::unauthorized("Admin not found"))?;

    if !verify_password(&req.current_password, &stored.password_hash)? {
        return Err(AppError::unauthorized("Current password incorrect"));
    }
    validate_password(&req.new_password)
        .map_err(|msg| AppError::bad_request("WEAK_PASSWORD", msg))?;

    let password_hash = hash_password(&req.new_password)?;
    state
        .store()
        .update_admin_password(&admin.admin_id, &password_hash)?;
    tracing::info!(action = "admin_change_password", username = %admin.username, "Admin password changed");

    Ok(ok(serde_json::json!({"updated": true})))
}

/// Creates the configured admin account unless one with that username exists.
/// Returns `true` when an account was created.
pub fn seed_admin(store: &Store, username: &str, password: &str) -> Result<bool, AppError> {
    if store.get_admin_by_username(username)?.is_some() {
        return Ok(false);
    }
    let now = Utc::now();
    let admin = Admin {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.trim().to_string(),
        password_hash: hash_password(password)?,
        created_at: now,
        updated_at: now,
    };
    store.create_admin(&admin)?;
    tracing::info!(username = %admin.username, "Seed admin created");
    Ok(true)
}
