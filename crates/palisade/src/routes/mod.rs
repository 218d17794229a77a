//! HTTP route handlers.

use axum::Router;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::ApiError;
use crate::state::AppState;

mod auth;
mod departments;
mod health;
mod menus;
mod posts;
mod roles;
mod users;

/// Create the main application router.
///
/// Every route is registered here, statically; adding a surface means
/// adding a line to this table.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        // API surface
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication
        .route("/auth/captcha", post(auth::get_captcha))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/auth/reset-password", post(auth::reset_password))
        // Users
        .route("/users/me", get(users::me))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get_one).put(users::update).delete(users::remove),
        )
        .route(
            "/users/{id}/roles",
            get(users::roles_of).put(users::assign_roles),
        )
        // Roles
        .route("/roles", get(roles::list).post(roles::create))
        .route(
            "/roles/{id}",
            get(roles::get_one).put(roles::update).delete(roles::remove),
        )
        .route(
            "/roles/{id}/menus",
            get(roles::menus_of).put(roles::assign_menus),
        )
        // Departments
        .route(
            "/departments",
            get(departments::list).post(departments::create),
        )
        .route("/departments/tree", get(departments::tree))
        .route(
            "/departments/{id}",
            get(departments::get_one)
                .put(departments::update)
                .delete(departments::remove),
        )
        // Menus
        .route("/menus", get(menus::list).post(menus::create))
        .route(
            "/menus/{id}",
            get(menus::get_one).put(menus::update).delete(menus::remove),
        )
        // Posts
        .route("/posts", get(posts::list).post(posts::create))
        .route(
            "/posts/{id}",
            get(posts::get_one).put(posts::update).delete(posts::remove),
        )
}

/// Pagination query parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl PageQuery {
    /// Clamp to sane bounds before hitting the database.
    pub fn clamped(&self) -> (i64, i64) {
        (self.page.max(1), self.page_size.clamp(1, 200))
    }
}

/// Payload for handlers that return a freshly created row id.
#[derive(Debug, Serialize)]
pub(crate) struct IdData {
    pub id: i64,
}

/// Username of the acting user, recorded in the audit columns.
pub(crate) async fn operator_name(
    state: &AppState,
    user_id: i64,
) -> Result<Option<String>, ApiError> {
    Ok(crate::db::users::find(&state.db, user_id)
        .await?
        .map(|u| u.username))
}
