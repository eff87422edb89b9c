//! HTTP-facing errors.
//!
//! Every failure is rendered as `{"error": message}`. Cache-path failures
//! expose their message; passthrough failures only say
//! "Internal Server Error" and keep the detail in the logs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_client::UpstreamError;
use serde_json::json;

/// Errors returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Upstream call failed on the collection or item path.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Cache store failed.
    #[error(transparent)]
    Cache(#[from] catalog_core::Error),

    /// Upstream reported the item does not exist.
    #[error("Not Found")]
    NotFound,

    /// Upstream call failed on a passthrough route.
    #[error("Internal Server Error")]
    Passthrough(#[source] UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Cache(_) | ApiError::Passthrough(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::NotFound => tracing::debug!("upstream reported not found"),
            ApiError::Passthrough(source) => tracing::error!(error = %source, "passthrough request failed"),
            other => tracing::error!(error = %other, "request failed"),
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);

        let upstream = UpstreamError::BadStatus { url: "u".into(), status: 502 };
        assert_eq!(ApiError::Upstream(upstream.clone()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Passthrough(upstream).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages() {
        let upstream = UpstreamError::Timeout { url: "https://swapi.dev/api/people/".into() };
        assert!(ApiError::Upstream(upstream.clone()).to_string().contains("swapi.dev"));
        assert_eq!(ApiError::Passthrough(upstream).to_string(), "Internal Server Error");
        assert_eq!(ApiError::NotFound.to_string(), "Not Found");
    }
}
