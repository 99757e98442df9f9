//! HTTP error taxonomy shared by every handler.
//!
//! Messages here are the only text a client ever sees. Store failures are
//! logged with their detail and collapsed into a generic `500`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::store::{BlacklistEntry, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    Unauthorized(&'static str),
    /// `existing` is echoed back when the conflicting entry is known.
    #[error("{message}")]
    Conflict {
        message: &'static str,
        existing: Option<Box<BlacklistEntry>>,
    },
    #[error("{0}")]
    NotFound(&'static str),
    /// Detail is logged, never returned.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn conflict(message: &'static str) -> Self {
        Self::Conflict {
            message,
            existing: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// JSON body for every non-2xx response.
#[derive(ToSchema, Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<BlacklistEntry>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(detail) = &self {
            error!("Internal error: {detail}");
        }
        let message = self.to_string();
        let address = match self {
            Self::Conflict { existing, .. } => existing.map(|entry| *entry),
            _ => None,
        };
        let body = ErrorResponse {
            error: message,
            address,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ApiError) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    #[tokio::test]
    async fn internal_errors_hide_store_detail() -> anyhow::Result<()> {
        let err = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        let (status, body) = body_json(err).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        Ok(())
    }

    #[tokio::test]
    async fn taxonomy_maps_to_status_codes() -> anyhow::Result<()> {
        let (status, body) = body_json(ApiError::Validation("Address is required")).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Address is required");
        assert!(body.get("address").is_none());

        let (status, _) = body_json(ApiError::Unauthorized("Unauthorized")).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = body_json(ApiError::conflict("Admin account already exists")).await?;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = body_json(ApiError::NotFound("Address not found in blacklist")).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
