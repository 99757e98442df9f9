//! Session-gated registry endpoints. The route guard has already checked the
//! session by the time these run.

use axum::{
    Json,
    extract::{Extension, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use super::{
    registry::{self, BlacklistError},
    types::{AddRequest, AddResponse, ListQuery, ListResponse, RemoveQuery, RemoveResponse},
};
use crate::api::{SharedStore, error::ApiError};

#[utoipa::path(
    get,
    path = "/api/blacklist",
    params(ListQuery),
    responses(
        (status = 200, description = "Entries, newest first.", body = ListResponse),
        (status = 401, description = "No administrator session.", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Store unavailable.", body = crate::api::error::ErrorResponse)
    ),
    tag = "blacklist"
)]
pub async fn list(
    Extension(store): Extension<SharedStore>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let addresses = registry::list(store.as_ref(), query.network.as_deref()).await?;
    Ok((StatusCode::OK, Json(ListResponse { addresses })))
}

#[utoipa::path(
    post,
    path = "/api/blacklist",
    request_body = AddRequest,
    responses(
        (status = 201, description = "Entry created.", body = AddResponse),
        (status = 400, description = "Address is missing.", body = crate::api::error::ErrorResponse),
        (status = 401, description = "No administrator session.", body = crate::api::error::ErrorResponse),
        (status = 409, description = "Address is already blacklisted.", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Store unavailable.", body = crate::api::error::ErrorResponse)
    ),
    tag = "blacklist"
)]
pub async fn add(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Ok(Json(request)) = payload else {
        return Err(BlacklistError::MissingAddress.into());
    };
    let entry = registry::add(store.as_ref(), request.into()).await?;
    let body = AddResponse {
        message: "Address blacklisted successfully".to_string(),
        address: entry,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    delete,
    path = "/api/blacklist",
    params(RemoveQuery),
    responses(
        (status = 200, description = "Entry removed.", body = RemoveResponse),
        (status = 400, description = "Address is missing.", body = crate::api::error::ErrorResponse),
        (status = 401, description = "No administrator session.", body = crate::api::error::ErrorResponse),
        (status = 404, description = "Address not found in blacklist.", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Store unavailable.", body = crate::api::error::ErrorResponse)
    ),
    tag = "blacklist"
)]
pub async fn remove(
    Extension(store): Extension<SharedStore>,
    Query(query): Query<RemoveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let address = query.address.unwrap_or_default();
    registry::remove(store.as_ref(), &address).await?;
    let body = RemoveResponse {
        message: "Address removed from blacklist successfully".to_string(),
    };
    Ok((StatusCode::OK, Json(body)))
}
