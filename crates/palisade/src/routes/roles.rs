//! Role management endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use palisade_common::{AdminError, Envelope, Page};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::db::models::{Menu, Role};
use crate::db::roles;
use crate::errors::{ApiError, ApiResult};
use crate::routes::{IdData, PageQuery, operator_name};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<Role>> {
    let (page, page_size) = query.clamped();
    let result = roles::list(&state.db, page, page_size).await?;
    Ok(Json(Envelope::ok(result)))
}

pub async fn get_one(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Role> {
    let row = roles::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError(AdminError::NotFound("role".to_string())))?;
    Ok(Json(Envelope::ok(row)))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<roles::CreateRole>,
) -> ApiResult<IdData> {
    if payload.role_code.is_empty() || payload.name.is_empty() {
        return Err(ApiError(AdminError::InvalidInput(
            "role_code and name are required".to_string(),
        )));
    }
    if roles::find_by_code(&state.db, &payload.role_code)
        .await?
        .is_some()
    {
        return Err(ApiError(AdminError::Conflict(
            "role_code already exists".to_string(),
        )));
    }

    let operator = operator_name(&state, user.user_id).await?;
    let id = roles::create(&state.db, &payload, operator.as_deref()).await?;
    Ok(Json(Envelope::ok(IdData { id })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<roles::UpdateRole>,
) -> ApiResult<()> {
    let operator = operator_name(&state, user.user_id).await?;
    if !roles::update(&state.db, id, &payload, operator.as_deref()).await? {
        return Err(ApiError(AdminError::NotFound("role".to_string())));
    }
    Ok(Json(Envelope::ok_empty("role updated")))
}

pub async fn remove(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    if !roles::soft_delete(&state.db, id).await? {
        return Err(ApiError(AdminError::NotFound("role".to_string())));
    }
    Ok(Json(Envelope::ok_empty("role deleted")))
}

pub async fn menus_of(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Menu>> {
    if roles::find(&state.db, id).await?.is_none() {
        return Err(ApiError(AdminError::NotFound("role".to_string())));
    }
    let menus = roles::menus_of(&state.db, id).await?;
    Ok(Json(Envelope::ok(menus)))
}

#[derive(Debug, Deserialize)]
pub struct AssignMenusRequest {
    menu_ids: Vec<i64>,
}

pub async fn assign_menus(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<AssignMenusRequest>,
) -> ApiResult<()> {
    if roles::find(&state.db, id).await?.is_none() {
        return Err(ApiError(AdminError::NotFound("role".to_string())));
    }
    roles::assign_menus(&state.db, id, &payload.menu_ids).await?;
    Ok(Json(Envelope::ok_empty("menus updated")))
}
