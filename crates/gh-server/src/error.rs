//! エラー型定義 (gh-server)

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Body of a failed `/callback`
pub const TOKEN_EXCHANGE_FAILED: &str = "Failed to obtain access token. Please try again.";

/// gh-server のエラー型
///
/// Except for [`ServerError::TokenExchange`], which answers the browser with
/// plain text, every variant renders as `{"response": "<message>"}`.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotConfigured(String),

    #[error("OAuth token exchange failed: {0}")]
    TokenExchange(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<gh_core::Error> for ServerError {
    fn from(e: gh_core::Error) -> Self {
        ServerError::Unexpected(e.to_string())
    }
}

impl From<gh_github::GitHubError> for ServerError {
    fn from(e: gh_github::GitHubError) -> Self {
        ServerError::Unexpected(e.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::TokenExchange(detail) => {
                warn!("OAuth callback rejected: {}", detail);
                return (StatusCode::BAD_REQUEST, TOKEN_EXCHANGE_FAILED).into_response();
            }
            ServerError::Unexpected(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "response": self.to_string() }))).into_response()
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_body() {
        let response = ServerError::Unauthorized("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_string(response).await, r#"{"response":"nope"}"#);
    }

    #[tokio::test]
    async fn test_unexpected_prefix() {
        let err: ServerError = gh_core::Error::LlmApi("429".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"response":"An unexpected error occurred: LLM API error: 429"}"#
        );
    }

    #[tokio::test]
    async fn test_token_exchange_is_plain_text() {
        let response = ServerError::TokenExchange("bad_verification_code".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, TOKEN_EXCHANGE_FAILED);
    }
}
