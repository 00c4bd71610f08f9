use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::task::JoinError;

use crate::store::StoreError;

pub const NOT_FOUND_MESSAGE: &str = "Track not found";

/// Failures a handler can return. The body is always a bare JSON string.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Store(StoreError),
    /// The blocking store call panicked or was cancelled.
    Task(JoinError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::Task(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, Json(NOT_FOUND_MESSAGE)).into_response(),
            Self::Store(err) => {
                log::error!("Store failure: {err}");
                internal_error()
            }
            Self::Task(err) => {
                log::error!("Store task failed: {err}");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json("Internal server error")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, "Track not found");
    }

    #[tokio::test]
    async fn test_store_errors_are_500() {
        for err in [StoreError::DuplicateId(3), StoreError::Poisoned, StoreError::IdSpaceExhausted(i64::MAX)] {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body_of(response).await, "Internal server error");
        }
    }
}
