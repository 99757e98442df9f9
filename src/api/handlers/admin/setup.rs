//! One-time administrator bootstrap endpoints.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use super::{
    credentials::{bootstrap, is_bootstrapped},
    types::{CredentialsRequest, SetupResponse, SetupStatusResponse},
};
use crate::api::{SharedStore, error::ApiError};

const MISSING_FIELDS: &str = "Username, password, and access token are required";

#[utoipa::path(
    get,
    path = "/api/admin/setup",
    responses(
        (status = 200, description = "Whether the administrator has been created.", body = SetupStatusResponse),
        (status = 500, description = "Store unavailable.", body = crate::api::error::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn setup_status(
    Extension(store): Extension<SharedStore>,
) -> Result<impl IntoResponse, ApiError> {
    let is_setup = is_bootstrapped(store.as_ref()).await?;
    Ok((StatusCode::OK, Json(SetupStatusResponse { is_setup })))
}

#[utoipa::path(
    post,
    path = "/api/admin/setup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Administrator created.", body = SetupResponse),
        (status = 400, description = "Missing or too short fields.", body = crate::api::error::ErrorResponse),
        (status = 409, description = "An administrator already exists.", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Store unavailable.", body = crate::api::error::ErrorResponse)
    ),
    tag = "admin"
)]
/// Creates the one administrator. Once an administrator exists every call is
/// answered with `409`, whatever the body contains.
pub async fn setup(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = payload
        .ok()
        .and_then(|Json(request)| request.into_credentials());

    let Some(credentials) = credentials else {
        if is_bootstrapped(store.as_ref()).await? {
            return Err(ApiError::conflict("Admin account already exists"));
        }
        return Err(ApiError::Validation(MISSING_FIELDS));
    };

    let admin = bootstrap(store.as_ref(), credentials).await?;
    let body = SetupResponse {
        success: true,
        message: "Admin account created successfully".to_string(),
        admin,
    };
    Ok((StatusCode::CREATED, Json(body)))
}
