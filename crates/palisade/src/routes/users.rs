//! User management endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use palisade_common::{AdminError, Envelope, Page, ResponseCode};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::db::models::{Role, User};
use crate::db::users;
use crate::errors::{ApiError, ApiResult};
use crate::routes::{IdData, PageQuery, operator_name};
use crate::state::AppState;

/// Current user, password hash omitted by serialization.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<User> {
    let row = users::find(&state.db, user.user_id)
        .await?
        .ok_or_else(|| ApiError(AdminError::NotFound("user".to_string())))?;
    Ok(Json(Envelope::ok(row)))
}

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<User>> {
    let (page, page_size) = query.clamped();
    let result = users::list(&state.db, page, page_size).await?;
    Ok(Json(Envelope::ok(result)))
}

pub async fn get_one(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<User> {
    match users::find(&state.db, id).await? {
        Some(row) => Ok(Json(Envelope::ok(row))),
        None => Ok(Json(Envelope::err(
            ResponseCode::UserNotFound,
            "user not found",
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    password: String,
    #[serde(flatten)]
    user: users::CreateUser,
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<IdData> {
    if payload.user.username.is_empty() {
        return Err(ApiError(AdminError::InvalidInput(
            "username is required".to_string(),
        )));
    }
    if payload.password.len() < 6 {
        return Err(ApiError(AdminError::InvalidInput(
            "password must be at least 6 characters".to_string(),
        )));
    }
    if users::find_by_username(&state.db, &payload.user.username)
        .await?
        .is_some()
    {
        return Err(ApiError(AdminError::Conflict(
            "username already taken".to_string(),
        )));
    }

    let hash = hash_password(&payload.password)?;
    let operator = operator_name(&state, user.user_id).await?;
    let id = users::create(&state.db, &payload.user, &hash, operator.as_deref()).await?;

    Ok(Json(Envelope::ok(IdData { id })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<users::UpdateUser>,
) -> ApiResult<()> {
    let operator = operator_name(&state, user.user_id).await?;
    if !users::update(&state.db, id, &payload, operator.as_deref()).await? {
        return Err(ApiError(AdminError::NotFound("user".to_string())));
    }
    Ok(Json(Envelope::ok_empty("user updated")))
}

pub async fn remove(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    if !users::soft_delete(&state.db, id).await? {
        return Err(ApiError(AdminError::NotFound("user".to_string())));
    }
    Ok(Json(Envelope::ok_empty("user deleted")))
}

pub async fn roles_of(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Role>> {
    if users::find(&state.db, id).await?.is_none() {
        return Err(ApiError(AdminError::NotFound("user".to_string())));
    }
    let roles = users::roles_of(&state.db, id).await?;
    Ok(Json(Envelope::ok(roles)))
}

#[derive(Debug, Deserialize)]
pub struct AssignRolesRequest {
    role_ids: Vec<i64>,
}

pub async fn assign_roles(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<AssignRolesRequest>,
) -> ApiResult<()> {
    if users::find(&state.db, id).await?.is_none() {
        return Err(ApiError(AdminError::NotFound("user".to_string())));
    }
    users::assign_roles(&state.db, id, &payload.role_ids).await?;
    Ok(Json(Envelope::ok_empty("roles updated")))
}
