//! Session authority for the administrator console.
//!
//! There is exactly one administrator, so a session does not need to say who
//! holds it. The marker is a fixed literal carried in an `HttpOnly` cookie;
//! `validate` is a plain comparison and expiry is left to the cookie's own
//! `Max-Age`. Validation never errors: a missing or wrong cookie is simply
//! "not authenticated".

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use super::types::{AuthCheckResponse, MessageResponse};

pub const SESSION_COOKIE_NAME: &str = "admin_session";
pub const SESSION_MARKER: &str = "authenticated";
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    ttl_seconds: i64,
    secure: bool,
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            secure: false,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    /// Mark cookies `Secure`; set for production deployments served over HTTPS.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionAuthority {
    config: SessionConfig,
}

impl SessionAuthority {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// `Set-Cookie` value establishing the session.
    ///
    /// # Errors
    /// Returns an error if the cookie cannot be encoded as a header value.
    pub fn issue(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.cookie(SESSION_MARKER, self.config.ttl_seconds)
    }

    /// True iff the request carries the session cookie with the exact marker.
    #[must_use]
    pub fn validate(&self, headers: &HeaderMap) -> bool {
        extract_session_cookie(headers).is_some_and(|value| value == SESSION_MARKER)
    }

    /// `Set-Cookie` value that tells the client to drop the session.
    ///
    /// # Errors
    /// Returns an error if the cookie cannot be encoded as a header value.
    pub fn revoke(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
        );
        if self.config.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Read the session cookie out of every `Cookie` header on the request.
fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
        })
}

#[utoipa::path(
    get,
    path = "/api/admin/auth/check",
    responses(
        (status = 200, description = "Whether the caller holds an administrator session.", body = AuthCheckResponse)
    ),
    tag = "admin"
)]
pub async fn check(
    headers: HeaderMap,
    sessions: Extension<Arc<SessionAuthority>>,
) -> impl IntoResponse {
    let authenticated = sessions.validate(&headers);
    (StatusCode::OK, Json(AuthCheckResponse { authenticated }))
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared.", body = MessageResponse)
    ),
    tag = "admin"
)]
pub async fn logout(sessions: Extension<Arc<SessionAuthority>>) -> impl IntoResponse {
    // Always clear the cookie, even when the caller had no session.
    let mut response_headers = HeaderMap::new();
    match sessions.revoke() {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    let body = MessageResponse {
        success: true,
        message: "Logout successful".to_string(),
    };
    (StatusCode::OK, response_headers, Json(body)).into_response()
}
