//! Authentication endpoints: captcha issue, login, logout, registration.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Response};
use palisade_common::{AdminError, Envelope, ResponseCode};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::db::users;
use crate::errors::{ApiError, ApiResult};
use crate::ratelimit::client_key;
use crate::routes::IdData;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CaptchaResponse {
    /// Base64-encoded PNG
    img: String,
    /// Challenge identifier the client echoes back on login
    uuid: String,
}

/// Issue a captcha challenge.
pub async fn get_captcha(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<CaptchaResponse> {
    let client = client_key(&headers);
    let limit = state.config.rate_limit.captcha_per_minute;
    if !state.limiter.allow("captcha", &client, limit).await {
        return Err(ApiError(AdminError::RateLimited(
            "too many captcha requests".to_string(),
        )));
    }

    let challenge = state.captcha.generate().await?;

    Ok(Json(Envelope::ok(CaptchaResponse {
        img: challenge.image,
        uuid: challenge.id,
    })))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
    captcha_id: String,
    captcha_code: String,
}

/// Log in: captcha first, then credentials, then a JWT cookie.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let client = client_key(&headers);
    let limit = state.config.rate_limit.login_per_minute;
    if !state.limiter.allow("login", &client, limit).await {
        return Err(ApiError(AdminError::RateLimited(
            "too many login attempts".to_string(),
        )));
    }

    if payload.username.is_empty() || payload.password.is_empty() || payload.captcha_id.is_empty()
    {
        return Err(ApiError(AdminError::InvalidInput(
            "username, password and captcha are required".to_string(),
        )));
    }

    // A store failure surfaces as 503 here; a wrong code must stay
    // distinguishable from an unreachable store.
    if !state
        .captcha
        .verify(&payload.captcha_id, &payload.captcha_code)
        .await?
    {
        return Ok(Json(Envelope::<()>::err(
            ResponseCode::InvalidCaptcha,
            "captcha incorrect",
        ))
        .into_response());
    }

    let user = users::find_by_username(&state.db, &payload.username).await?;
    let Some(user) = user else {
        return Err(ApiError(AdminError::Auth(
            "incorrect username or password".to_string(),
        )));
    };

    if !verify_password(&payload.password, &user.password)? {
        return Err(ApiError(AdminError::Auth(
            "incorrect username or password".to_string(),
        )));
    }

    let token = state.jwt.issue(user.id)?;
    users::record_login(&state.db, user.id, &client).await?;

    tracing::info!(user_id = user.id, "User logged in");

    let cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        state.config.jwt.cookie_name,
        token,
        state.jwt.expiry_secs()
    );

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(Envelope::<()>::ok_empty("login successful")),
    )
        .into_response())
}

/// Clear the access-token cookie.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = format!(
        "{}=; HttpOnly; Path=/; Max-Age=0",
        state.config.jwt.cookie_name
    );
    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(Envelope::<()>::ok_empty("logout successful")),
    )
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    nickname: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
}

/// Self-service registration. New accounts are plain users.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<IdData> {
    if payload.username.is_empty() {
        return Err(ApiError(AdminError::InvalidInput(
            "username is required".to_string(),
        )));
    }
    if payload.password.len() < 6 {
        return Err(ApiError(AdminError::InvalidInput(
            "password must be at least 6 characters".to_string(),
        )));
    }

    if users::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError(AdminError::Conflict(
            "username already taken".to_string(),
        )));
    }

    let hash = hash_password(&payload.password)?;
    let new_user = users::CreateUser {
        username: payload.username,
        nickname: payload.nickname,
        department_id: None,
        phone_number: payload.phone_number,
        email: payload.email,
        is_admin: false,
        gender: None,
        remark: None,
    };
    let id = users::create(&state.db, &new_user, &hash, None).await?;

    tracing::info!(user_id = id, "User registered");

    Ok(Json(Envelope::ok(IdData { id })))
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    old_password: String,
    new_password: String,
}

/// Change the caller's password; requires the old one.
pub async fn reset_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<()> {
    let row = users::find(&state.db, user.user_id)
        .await?
        .ok_or_else(|| ApiError(AdminError::NotFound("user".to_string())))?;

    if !verify_password(&payload.old_password, &row.password)? {
        return Err(ApiError(AdminError::Auth(
            "old password incorrect".to_string(),
        )));
    }
    if payload.new_password.len() < 6 {
        return Err(ApiError(AdminError::InvalidInput(
            "password must be at least 6 characters".to_string(),
        )));
    }

    let hash = hash_password(&payload.new_password)?;
    users::set_password(&state.db, user.user_id, &hash).await?;

    tracing::info!(user_id = user.user_id, "Password updated");

    Ok(Json(Envelope::ok_empty("password updated")))
}
