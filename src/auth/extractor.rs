// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for claims published by the gate.
//!
//! These only read what [`auth_middleware`](super::middleware::auth_middleware)
//! left in the request extensions; they never verify anything themselves.
//!
//! ```rust,ignore
//! async fn profile(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.subject() is the caller's user ID
//! }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Claims, ServiceScope};

/// Extractor for verified claims. Rejects when none were published.
pub struct Auth(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::CredentialAbsent)
    }
}

/// Optional claims extractor.
///
/// Returns `None` when the gate cleared the claims, instead of rejecting.
pub struct OptionalAuth(pub Option<Claims>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalAuth {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<Claims>().cloned()))
    }
}

/// The request's service scope, for the OAuth helpers on the gate.
pub struct RequestScope(pub ServiceScope);

impl<S: Send + Sync> FromRequestParts<S> for RequestScope {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ServiceScope>()
            .copied()
            .map(RequestScope)
            .ok_or(AuthError::ScopeInactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::claims_for;
    use axum::http::Request;

    fn empty_parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn auth_requires_published_claims() {
        let mut parts = empty_parts();

        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::CredentialAbsent)));
    }

    #[tokio::test]
    async fn auth_returns_published_claims() {
        let mut parts = empty_parts();
        parts.extensions.insert(claims_for("valid"));

        let Auth(claims) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(claims.subject(), Some("user-valid"));
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_claims() {
        let mut parts = empty_parts();

        let OptionalAuth(claims) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(claims.is_none());
    }

    #[tokio::test]
    async fn request_scope_is_rejected_outside_middleware() {
        let mut parts = empty_parts();

        let result = RequestScope::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::ScopeInactive)));
    }
}
