use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    credentials::verify,
    session::SessionAuthority,
    types::{CredentialsRequest, MessageResponse},
};
use crate::api::{SharedStore, error::ApiError};

#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Session cookie issued.", body = MessageResponse),
        (status = 400, description = "A field is missing.", body = crate::api::error::ErrorResponse),
        (status = 401, description = "Username, password or access token did not match.", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Store unavailable.", body = crate::api::error::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn login(
    Extension(store): Extension<SharedStore>,
    Extension(sessions): Extension<Arc<SessionAuthority>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(credentials) = payload
        .ok()
        .and_then(|Json(request)| request.into_credentials())
    else {
        return Err(ApiError::Validation(
            "Username, password, and access token are required",
        ));
    };

    if !verify(store.as_ref(), &credentials).await? {
        warn!("Rejected administrator login");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let cookie = sessions
        .issue()
        .map_err(|err| ApiError::Internal(format!("session cookie: {err}")))?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    info!("Administrator logged in");
    let body = MessageResponse {
        success: true,
        message: "Login successful".to_string(),
    };
    Ok((StatusCode::OK, headers, Json(body)))
}
