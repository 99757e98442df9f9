use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};

use super::{
    registry::exists,
    types::{CheckQuery, CheckResponse},
};
use crate::api::{SharedStore, error::ApiError};

#[utoipa::path(
    get,
    path = "/api/blacklist/check",
    params(CheckQuery),
    responses(
        (status = 200, description = "Whether the address is blacklisted for the network.", body = CheckResponse),
        (status = 400, description = "Address is missing.", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Store unavailable.", body = crate::api::error::ErrorResponse)
    ),
    tag = "blacklist"
)]
// Public lookup consulted by external services; no session involved.
pub async fn check(
    Extension(store): Extension<SharedStore>,
    Query(query): Query<CheckQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let address = query.address.unwrap_or_default();
    let verdict = exists(store.as_ref(), &address, query.network.as_deref()).await?;
    Ok((StatusCode::OK, Json(CheckResponse::from(verdict))))
}
