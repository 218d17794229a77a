//! Request authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use palisade_common::AdminError;

use crate::errors::ApiError;
use crate::state::AppState;

/// Authenticated caller, extracted from the access-token cookie or a
/// Bearer header. Handlers that take this reject unauthenticated requests
/// with the 401 envelope.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts, &state.config.jwt.cookie_name))
            .ok_or_else(|| ApiError(AdminError::Auth("missing access token".to_string())))?;

        let claims = state.jwt.decode(&token)?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| ApiError(AdminError::Auth("invalid token subject".to_string())))?;

        Ok(Self { user_id })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::to_string)
}

fn cookie_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    let value = parts.headers.get(COOKIE)?.to_str().ok()?;
    value.split(';').find_map(|pair| {
        let (name, token) = pair.trim().split_once('=')?;
        (name == cookie_name).then(|| token.to_string())
    })
}
