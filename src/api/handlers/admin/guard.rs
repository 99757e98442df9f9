//! Route guard in front of every request.
//!
//! The policy is a table of path rules, checked in order. Console pages are
//! browser-facing and bounce unauthenticated visitors to the login page;
//! protected API routes answer `401` with a JSON body and never redirect.
//! Anything not listed is public.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::session::SessionAuthority;
use crate::api::error::ApiError;

/// Where unauthenticated console visitors are sent.
pub const LOGIN_PATH: &str = "/admin";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Session required; failure redirects to [`LOGIN_PATH`].
    Console,
    /// Session required; failure is `401`.
    Api,
}

#[derive(Clone, Copy, Debug)]
enum Match {
    Exact(&'static str),
    /// The path itself and anything below it, on segment boundaries.
    Prefix(&'static str),
}

impl Match {
    fn matches(self, path: &str) -> bool {
        match self {
            Self::Exact(expected) => path == expected,
            Self::Prefix(prefix) => path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

const RULES: &[(Match, Access)] = &[
    (Match::Exact("/admin"), Access::Public),
    (Match::Exact("/admin/setup"), Access::Public),
    (Match::Prefix("/admin/dashboard"), Access::Console),
    (Match::Exact("/api/admin/setup"), Access::Public),
    (Match::Prefix("/api/admin/auth"), Access::Public),
    (Match::Exact("/api/blacklist/check"), Access::Public),
    (Match::Exact("/api/blacklist"), Access::Api),
    (Match::Exact("/health"), Access::Public),
];

/// Access level for a request path. A single trailing slash is ignored.
#[must_use]
pub fn classify(path: &str) -> Access {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    RULES
        .iter()
        .find(|(rule, _)| rule.matches(path))
        .map_or(Access::Public, |(_, access)| *access)
}

pub async fn route_guard(
    State(sessions): State<Arc<SessionAuthority>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let access = classify(request.uri().path());
    if access == Access::Public || sessions.validate(request.headers()) {
        return next.run(request).await;
    }

    debug!(path = %request.uri().path(), ?access, "Rejected request without a session");
    match access {
        Access::Console => Redirect::temporary(LOGIN_PATH).into_response(),
        _ => ApiError::Unauthorized("Unauthorized").into_response(),
    }
}
