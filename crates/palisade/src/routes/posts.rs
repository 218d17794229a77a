//! Post (job position) management endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use palisade_common::{AdminError, Envelope, Page};

use crate::auth::AuthUser;
use crate::db::models::Post;
use crate::db::posts;
use crate::errors::{ApiError, ApiResult};
use crate::routes::{IdData, PageQuery, operator_name};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<Post>> {
    let (page, page_size) = query.clamped();
    let result = posts::list(&state.db, page, page_size).await?;
    Ok(Json(Envelope::ok(result)))
}

pub async fn get_one(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Post> {
    let row = posts::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError(AdminError::NotFound("post".to_string())))?;
    Ok(Json(Envelope::ok(row)))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<posts::CreatePost>,
) -> ApiResult<IdData> {
    if payload.post_code.is_empty() || payload.name.is_empty() {
        return Err(ApiError(AdminError::InvalidInput(
            "post_code and name are required".to_string(),
        )));
    }
    if posts::find_by_code(&state.db, &payload.post_code)
        .await?
        .is_some()
    {
        return Err(ApiError(AdminError::Conflict(
            "post_code already exists".to_string(),
        )));
    }

    let operator = operator_name(&state, user.user_id).await?;
    let id = posts::create(&state.db, &payload, operator.as_deref()).await?;
    Ok(Json(Envelope::ok(IdData { id })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<posts::UpdatePost>,
) -> ApiResult<()> {
    let operator = operator_name(&state, user.user_id).await?;
    if !posts::update(&state.db, id, &payload, operator.as_deref()).await? {
        return Err(ApiError(AdminError::NotFound("post".to_string())));
    }
    Ok(Json(Envelope::ok_empty("post updated")))
}

pub async fn remove(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    if !posts::soft_delete(&state.db, id).await? {
        return Err(ApiError(AdminError::NotFound("post".to_string())));
    }
    Ok(Json(Envelope::ok_empty("post deleted")))
}
