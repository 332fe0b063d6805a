// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Strict enforcement surfaces these to the caller as a rejection. Lenient
/// enforcement only logs them and degrades to "no claims".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential in the authorization header or the session
    CredentialAbsent,
    /// The verifier rejected the credential; carries its reason
    CredentialInvalid(String),
    /// No refresh credential, or the renewal procedure failed
    RenewalUnavailable(String),
    /// OAuth callback state did not match the expected CSRF value
    StateMismatch,
    /// OAuth callback carried no authorization code
    MissingAuthorizationCode,
    /// Service lookup outside an active request scope
    ScopeInactive,
    /// The identity provider call failed
    Provider(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::CredentialAbsent => "credential_absent",
            AuthError::CredentialInvalid(_) => "credential_invalid",
            AuthError::RenewalUnavailable(_) => "renewal_unavailable",
            AuthError::StateMismatch => "state_mismatch",
            AuthError::MissingAuthorizationCode => "missing_authorization_code",
            AuthError::ScopeInactive => "scope_inactive",
            AuthError::Provider(_) => "identity_provider_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::CredentialAbsent
            | AuthError::CredentialInvalid(_)
            | AuthError::RenewalUnavailable(_) => StatusCode::UNAUTHORIZED,
            AuthError::StateMismatch | AuthError::MissingAuthorizationCode => {
                StatusCode::BAD_REQUEST
            }
            AuthError::Provider(_) => StatusCode::BAD_GATEWAY,
            AuthError::ScopeInactive => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::CredentialAbsent => write!(f, "No credential was supplied"),
            AuthError::CredentialInvalid(reason) => write!(f, "{reason}"),
            AuthError::RenewalUnavailable(reason) => {
                write!(f, "Credential renewal unavailable: {reason}")
            }
            AuthError::StateMismatch => write!(f, "State for CSRF is not correct"),
            AuthError::MissingAuthorizationCode => {
                write!(f, "Authorization code is missing from the callback")
            }
            AuthError::ScopeInactive => write!(f, "No active request scope"),
            AuthError::Provider(msg) => write!(f, "Identity provider request failed: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
