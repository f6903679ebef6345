// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction and authentication middleware for the server.
//!
//! This module provides Axum extractors for validating session tokens
//! and enforcing authentication at the server boundary.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use rideline_api::{AuthenticatedActor, AuthenticationService};
use tracing::{debug, warn};

use crate::AppState;

/// Extractor that authenticates the request.
///
/// Pulls the `Authorization: Bearer <token>` header, validates the session
/// through [`AuthenticationService::validate_session`] (which also stamps
/// session activity), and hands the handler an [`AuthenticatedActor`].
/// A missing or malformed header, an unknown token, or an expired session
/// all reject the request with HTTP 401 before the handler runs.
pub struct SessionUser(pub AuthenticatedActor);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        // Validate session
        let mut persistence = state.persistence.lock().await;
        let actor = AuthenticationService::validate_session(&mut persistence, &token).map_err(
            |e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            },
        )?;

        debug!(
            username = %actor.username,
            role = ?actor.role,
            "Session validated successfully"
        );

        Ok(Self(actor))
    }
}

/// Extracts the bearer token from a request's Authorization header.
///
/// # Errors
///
/// Returns a `SessionError` if the header is missing or malformed.
pub fn bearer_token(parts: &Parts) -> Result<String, SessionError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?
        .to_str()
        .map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })?;

    Ok(token.to_string())
}

/// Session extraction errors.
///
/// These errors are returned when session validation fails and are
/// automatically converted to HTTP responses.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingAuthorizationHeader => {
                (StatusCode::UNAUTHORIZED, "Missing Authorization header")
            }
            Self::InvalidAuthorizationHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    format!("Session validation failed: {reason}"),
                )
                    .into_response();
            }
        };

        (status, message).into_response()
    }
}
