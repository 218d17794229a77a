//! Core types shared across Palisade components.

use serde::{Deserialize, Serialize};

/// Business response codes carried inside the envelope body.
///
/// The HTTP status is chosen separately by the server's error mapping; the
/// body code is what frontends switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    BadRequest,
    Unauthorized,
    NotFound,
    UserNotFound,
    InvalidCaptcha,
    TooManyRequests,
    InternalError,
}

impl ResponseCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::BadRequest => 1001,
            Self::Unauthorized => 1002,
            Self::NotFound => 1003,
            Self::UserNotFound => 1004,
            Self::InvalidCaptcha => 1005,
            Self::TooManyRequests => 1006,
            Self::InternalError => 5001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not found",
            Self::UserNotFound => "user not found",
            Self::InvalidCaptcha => "invalid captcha",
            Self::TooManyRequests => "too many requests",
            Self::InternalError => "internal server error",
        }
    }
}

/// Uniform response envelope: `{code, message, data}`.
///
/// Built explicitly at each handler's return point; there is no implicit
/// wrapping layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            code: ResponseCode::Success.code(),
            message: ResponseCode::Success.default_message().to_string(),
            data: Some(data),
        }
    }

    /// Successful response with a custom message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::Success.code(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Failed response; `data` is always null.
    pub fn err(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }
}

impl Envelope<()> {
    /// Successful response with a message and no payload.
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::Success.code(),
            message: message.into(),
            data: None,
        }
    }
}

/// Captcha challenge handed to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaChallenge {
    /// 32-character hex identifier the client echoes back on verification
    pub id: String,

    /// Base64-encoded PNG image
    pub image: String,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of live rows, across all pages
    pub total: i64,

    /// Rows on this page
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_ok_serializes_code_zero() {
        let envelope = Envelope::ok(42);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn envelope_err_has_null_data() {
        let envelope = Envelope::<i32>::err(ResponseCode::InvalidCaptcha, "captcha incorrect");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["code"], 1005);
        assert_eq!(json["message"], "captcha incorrect");
        assert!(json["data"].is_null());
    }

    #[test]
    fn response_codes_match_table() {
        assert_eq!(ResponseCode::Success.code(), 0);
        assert_eq!(ResponseCode::BadRequest.code(), 1001);
        assert_eq!(ResponseCode::Unauthorized.code(), 1002);
        assert_eq!(ResponseCode::NotFound.code(), 1003);
        assert_eq!(ResponseCode::UserNotFound.code(), 1004);
        assert_eq!(ResponseCode::InvalidCaptcha.code(), 1005);
        assert_eq!(ResponseCode::InternalError.code(), 5001);
    }
}
