//! Menu management endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use palisade_common::{AdminError, Envelope, Page};

use crate::auth::AuthUser;
use crate::db::menus;
use crate::db::models::Menu;
use crate::errors::{ApiError, ApiResult};
use crate::routes::{IdData, PageQuery, operator_name};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<Menu>> {
    let (page, page_size) = query.clamped();
    let result = menus::list(&state.db, page, page_size).await?;
    Ok(Json(Envelope::ok(result)))
}

pub async fn get_one(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Menu> {
    let row = menus::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError(AdminError::NotFound("menu".to_string())))?;
    Ok(Json(Envelope::ok(row)))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<menus::CreateMenu>,
) -> ApiResult<IdData> {
    if payload.name.is_empty() {
        return Err(ApiError(AdminError::InvalidInput(
            "name is required".to_string(),
        )));
    }

    let operator = operator_name(&state, user.user_id).await?;
    let id = menus::create(&state.db, &payload, operator.as_deref()).await?;
    Ok(Json(Envelope::ok(IdData { id })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<menus::UpdateMenu>,
) -> ApiResult<()> {
    let operator = operator_name(&state, user.user_id).await?;
    if !menus::update(&state.db, id, &payload, operator.as_deref()).await? {
        return Err(ApiError(AdminError::NotFound("menu".to_string())));
    }
    Ok(Json(Envelope::ok_empty("menu updated")))
}

pub async fn remove(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    if !menus::soft_delete(&state.db, id).await? {
        return Err(ApiError(AdminError::NotFound("menu".to_string())));
    }
    Ok(Json(Envelope::ok_empty("menu deleted")))
}
