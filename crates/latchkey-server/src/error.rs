//! Mapping of domain errors onto HTTP responses.
//!
//! Every failure is rendered as `{"error": "<message>"}`. Server-side
//! failures are logged in full and answered with a generic message.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use latchkey_core::error::LatchkeyError;
use serde_json::json;
use tracing::error;

/// Error returned by every handler and by the auth middleware.
#[derive(Debug)]
pub struct ApiError(pub LatchkeyError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            LatchkeyError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            LatchkeyError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            LatchkeyError::NotFound { .. } => StatusCode::NOT_FOUND,
            LatchkeyError::Conflict { .. } => StatusCode::CONFLICT,
            LatchkeyError::Database(_) | LatchkeyError::Crypto(_) | LatchkeyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<LatchkeyError> for ApiError {
    fn from(err: LatchkeyError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(LatchkeyError::bad_request(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(LatchkeyError::bad_request(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self.0, "Request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (LatchkeyError::bad_request("x"), StatusCode::BAD_REQUEST),
            (LatchkeyError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (LatchkeyError::not_found("login", "1"), StatusCode::NOT_FOUND),
            (
                LatchkeyError::Conflict {
                    entity: "user".into(),
                },
                StatusCode::CONFLICT,
            ),
            (LatchkeyError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (LatchkeyError::Crypto("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (LatchkeyError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[tokio::test]
    async fn server_errors_hide_their_cause() {
        let response = ApiError(LatchkeyError::Database("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(!String::from_utf8_lossy(&body).contains("hunter2"));
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": "internal server error" }));
    }

    #[tokio::test]
    async fn client_errors_carry_their_message() {
        let response = ApiError(LatchkeyError::bad_request("username is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": "username is required" }));
    }
}
