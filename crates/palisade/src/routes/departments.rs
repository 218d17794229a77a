//! Department management endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use palisade_common::{AdminError, Envelope, Page};

use crate::auth::AuthUser;
use crate::db::departments::{self, DepartmentNode, build_tree};
use crate::db::models::Department;
use crate::errors::{ApiError, ApiResult};
use crate::routes::{IdData, PageQuery, operator_name};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<Department>> {
    let (page, page_size) = query.clamped();
    let result = departments::list(&state.db, page, page_size).await?;
    Ok(Json(Envelope::ok(result)))
}

/// All live departments assembled into a forest.
pub async fn tree(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Vec<DepartmentNode>> {
    let rows = departments::list_all(&state.db).await?;
    Ok(Json(Envelope::ok(build_tree(rows))))
}

pub async fn get_one(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Department> {
    let row = departments::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError(AdminError::NotFound("department".to_string())))?;
    Ok(Json(Envelope::ok(row)))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<departments::CreateDepartment>,
) -> ApiResult<IdData> {
    if payload.name.is_empty() {
        return Err(ApiError(AdminError::InvalidInput(
            "name is required".to_string(),
        )));
    }
    if departments::find_by_name(&state.db, &payload.name)
        .await?
        .is_some()
    {
        return Err(ApiError(AdminError::Conflict(
            "department name already exists".to_string(),
        )));
    }
    if let Some(parent_id) = payload.parent_id {
        if departments::find(&state.db, parent_id).await?.is_none() {
            return Err(ApiError(AdminError::InvalidInput(
                "parent department does not exist".to_string(),
            )));
        }
    }

    let operator = operator_name(&state, user.user_id).await?;
    let id = departments::create(&state.db, &payload, operator.as_deref()).await?;
    Ok(Json(Envelope::ok(IdData { id })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<departments::UpdateDepartment>,
) -> ApiResult<()> {
    if payload.parent_id == Some(id) {
        return Err(ApiError(AdminError::InvalidInput(
            "department cannot be its own parent".to_string(),
        )));
    }

    let operator = operator_name(&state, user.user_id).await?;
    if !departments::update(&state.db, id, &payload, operator.as_deref()).await? {
        return Err(ApiError(AdminError::NotFound("department".to_string())));
    }
    Ok(Json(Envelope::ok_empty("department updated")))
}

pub async fn remove(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    if !departments::soft_delete(&state.db, id).await? {
        return Err(ApiError(AdminError::NotFound("department".to_string())));
    }
    Ok(Json(Envelope::ok_empty("department deleted")))
}
