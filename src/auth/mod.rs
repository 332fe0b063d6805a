// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Request authentication against an external OIDC identity pool.
//!
//! ## Auth Flow
//!
//! 1. The middleware enters a fresh [`ServiceScope`] for the request
//! 2. The credential is taken from `Authorization: Bearer <token>`, or else
//!    from the session's `access_token`
//! 3. The scope's [`CredentialVerifier`] (built at most once per scope)
//!    verifies it and yields [`Claims`]
//! 4. On failure:
//!    - strict mode rejects with 401 and the verifier's reason
//!    - lenient mode runs the [`RenewalCallback`] once if the session holds a
//!      `refresh_token`, re-verifies, and otherwise clears the claims and
//!      lets the request through
//!
//! ## Security
//!
//! - Signature, issuer, audience and expiry checks belong to the verifier
//! - OAuth callbacks are checked against an HMAC-derived `state` before any
//!   code exchange
//! - Credentials are never logged

pub mod cache;
pub mod claims;
pub mod context;
pub mod credential;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod oauth;
pub mod services;

pub use cache::{ScopeGuard, ServiceCache, ServiceScope};
pub use claims::Claims;
pub use context::{ClaimsSlot, HttpRequestContext, RequestContext};
pub use credential::Credential;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth, RequestScope};
pub use gate::{
    AuthenticationGate, LenientFailure, LenientOutcome, Mode, NoRenewal, RenewalCallback,
    RenewalError,
};
pub use middleware::{auth_middleware, GuardState};
pub use oauth::{expected_state, state_matches, CallbackParams};
pub use services::{
    CredentialInvalid, CredentialVerifier, IdentityProviderClient, ProviderError, SignInStyle,
    TokenSet,
};
