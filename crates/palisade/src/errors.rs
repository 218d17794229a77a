//! HTTP error mapping.
//!
//! [`ApiError`] is the one place an [`AdminError`] becomes an HTTP
//! response: status from the taxonomy, body in the uniform envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use palisade_common::{AdminError, Envelope, ResponseCode};

/// Handler result: an enveloped payload or a mapped error.
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

#[derive(Debug)]
pub struct ApiError(pub AdminError);

impl ApiError {
    fn business_code(&self) -> ResponseCode {
        match &self.0 {
            AdminError::InvalidInput(_) | AdminError::Conflict(_) => ResponseCode::BadRequest,
            AdminError::Auth(_) | AdminError::Forbidden(_) => ResponseCode::Unauthorized,
            AdminError::NotFound(_) => ResponseCode::NotFound,
            AdminError::RateLimited(_) => ResponseCode::TooManyRequests,
            _ => ResponseCode::InternalError,
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        Self(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self(AdminError::Database(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = Envelope::<()>::err(self.business_code(), self.0.user_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_503() {
        let response = ApiError(AdminError::Store("down".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn auth_errors_map_to_401_with_code_1002() {
        let err = ApiError(AdminError::Auth("missing token".to_string()));
        assert_eq!(err.business_code(), ResponseCode::Unauthorized);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError(AdminError::Database("secret dsn in message".to_string()));
        assert_eq!(err.0.user_message(), "Database error occurred");
    }
}
