//! Unified gateway error type.
//!
//! Every handler returns `Result<T, ApiError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{"detail": ...}` JSON response with the right status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::sessions::StoreError;

/// All errors that can surface from a gateway handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Propagated from the session store. Maps 1:1 to a client error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request-shape failure caught before domain logic runs
    /// (non-positive path id, empty message content).
    #[error("{0}")]
    Unprocessable(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::SessionNotFound) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            ApiError::from(StoreError::SessionNotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn validation_errors_map_to_400() {
        for err in [
            StoreError::EmptyUsername,
            StoreError::InvalidRole,
            StoreError::InvalidRoleFilter,
        ] {
            assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn shape_failures_map_to_422() {
        assert_eq!(
            ApiError::Unprocessable("Content cannot be empty.").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn detail_carries_the_store_message() {
        let err = ApiError::from(StoreError::InvalidRole);
        assert_eq!(err.to_string(), "Role must be 'user' or 'assistant'.");
    }
}
