use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ctf_blob::BlobError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input, reported before any store access.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = core::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::PayloadTooLarge(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Store details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Unavailable(_) => "Store unavailable".to_string(),
            ApiError::Store(_) => "Internal store error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{} -> {}", self, status);
        } else {
            warn!("{} -> {}", self, status);
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ApiError::Unavailable(err.to_string())
            }
            other => ApiError::Store(other.to_string()),
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(_) => ApiError::NotFound("File not found".to_string()),
            BlobError::TooLarge { limit } => ApiError::PayloadTooLarge(format!(
                "File size exceeds {}MB limit",
                limit / (1024 * 1024)
            )),
            BlobError::Unavailable(msg) => ApiError::Unavailable(msg),
            BlobError::Io(e) => ApiError::Validation(format!("Failed to read upload: {}", e)),
            other => ApiError::Store(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unavailable("x".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Store("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_details_are_not_public() {
        let err = ApiError::Store("no such table: ctfs".into());
        assert_eq!(err.public_message(), "Internal store error");
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_blob_errors_map_to_api_errors() {
        let err: ApiError = BlobError::NotFound("abc".into()).into();
        assert!(matches!(
            err,
            ApiError::NotFound(ref m) if m == "File not found"
        ));

        let err: ApiError = BlobError::TooLarge {
            limit: 50 * 1024 * 1024,
        }
        .into();
        assert_eq!(err.public_message(), "File size exceeds 50MB limit");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = BlobError::Unavailable("pool closed".into()).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }
}
