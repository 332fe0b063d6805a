// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Wraps a router subtree with the gate in a fixed [`Mode`]:
//!
//! ```rust,ignore
//! let state = GuardState::strict(gate.clone());
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         state,
//!         auth_middleware::<MyVerifier, MyIdpClient, NoRenewal>,
//!     ));
//! ```
//!
//! Each request gets its own service scope, which stays active until the
//! inner handler returns. An upstream session layer is expected to put a
//! [`SharedSession`] in the request extensions; without one the gate sees an
//! empty session.
//!
//! On success the published [`Claims`] (if any) and the request's
//! [`ServiceScope`](super::ServiceScope) are inserted into the request
//! extensions for the [`Auth`](super::Auth) family of extractors.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::context::HttpRequestContext;
use super::gate::{AuthenticationGate, Mode, NoRenewal, RenewalCallback};
use super::services::{CredentialVerifier, IdentityProviderClient};
use super::Claims;
use crate::session::{SessionBag, SharedSession};

/// Upper bound on request body bytes drained before a rejection.
const MAX_DRAIN_BYTES: usize = 1024 * 1024;

/// State for [`auth_middleware`].
pub struct GuardState<V, P, R> {
    gate: AuthenticationGate<V, P>,
    mode: Mode,
    renewal: Arc<R>,
}

impl<V, P, R> Clone for GuardState<V, P, R> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            mode: self.mode,
            renewal: Arc::clone(&self.renewal),
        }
    }
}

impl<V, P> GuardState<V, P, NoRenewal>
where
    V: CredentialVerifier,
    P: IdentityProviderClient,
{
    /// Reject requests without a valid credential.
    pub fn strict(gate: AuthenticationGate<V, P>) -> Self {
        Self {
            gate,
            mode: Mode::Strict,
            renewal: Arc::new(NoRenewal),
        }
    }
}

impl<V, P, R> GuardState<V, P, R>
where
    V: CredentialVerifier,
    P: IdentityProviderClient,
    R: RenewalCallback + 'static,
{
    /// Enrich requests with claims when possible, renewing once via `renewal`.
    pub fn lenient(gate: AuthenticationGate<V, P>, renewal: Arc<R>) -> Self {
        Self {
            gate,
            mode: Mode::Lenient,
            renewal,
        }
    }
}

/// Authentication middleware function.
pub async fn auth_middleware<V, P, R>(
    State(state): State<GuardState<V, P, R>>,
    request: Request,
    next: Next,
) -> Response
where
    V: CredentialVerifier,
    P: IdentityProviderClient,
    R: RenewalCallback + 'static,
{
    let scope_guard = state.gate.services().enter_scope();
    let scope = scope_guard.scope();
    let session = request.extensions().get::<SharedSession>().cloned();
    let (mut parts, body) = request.into_parts();

    let result = {
        let mut locked = match &session {
            Some(shared) => Some(shared.0.lock().await),
            None => None,
        };
        let mut detached = SessionBag::new();
        let bag = locked.as_deref_mut().unwrap_or(&mut detached);

        let mut ctx = HttpRequestContext::new(&parts.headers, bag);
        state
            .gate
            .enforce(state.mode, &scope, &mut ctx, state.renewal.as_ref())
            .await
    };

    match result {
        Ok(claims) => {
            parts.extensions.remove::<Claims>();
            if let Some(claims) = claims {
                parts.extensions.insert(claims);
            }
            parts.extensions.insert(scope);

            let response = next.run(Request::from_parts(parts, body)).await;
            drop(scope_guard);
            response
        }
        Err(err) => {
            // Drain the body so the connection can be reused.
            if let Err(e) = to_bytes(body, MAX_DRAIN_BYTES).await {
                tracing::debug!(scope = %scope, error = %e, "Request body drain failed");
            }
            tracing::debug!(
                scope = %scope,
                mode = state.mode.as_str(),
                error_code = err.error_code(),
                "Request rejected by authentication gate"
            );
            err.into_response()
        }
    }
}
