use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use agent_mcp::McpError;
use agent_turn::TurnError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Failures that happen before a response body starts streaming.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("Tool server error: {0}")]
    Mcp(#[from] McpError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct JsonError {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Turn(_) | ApiError::Mcp(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonError {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn tool_server_errors_are_500_with_message() {
        let err = ApiError::from(McpError::Connection("connection refused".to_string()));

        let response = err.error_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["error"],
            "Tool server error: Connection error: connection refused"
        );
    }

    #[test]
    fn bad_request_is_400() {
        let err = ApiError::BadRequest("missing field `messages`".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
