// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authentication gate.
//!
//! ## Strict
//!
//! extract → verify → publish, or reject. No retry. A rejection means the
//! protected operation must not run.
//!
//! ## Lenient
//!
//! extract → verify → publish. On failure, if the session holds a refresh
//! credential, run the renewal callback once, re-read the access credential
//! from the session and verify again. If that also fails (or no renewal was
//! possible) the claims are cleared and, under the default
//! [`LenientFailure::Proceed`] policy, the operation still runs.
//!
//! Every step is awaited before the next starts; renewal depends on the first
//! verification failing and re-verification depends on renewal having
//! rewritten the session.

use std::future::Future;
use std::sync::Arc;

use super::cache::{ServiceCache, ServiceScope};
use super::context::RequestContext;
use super::credential::{self, Credential};
use super::services::{CredentialVerifier, IdentityProviderClient};
use super::{AuthError, Claims};
use crate::session::SessionBag;

/// Enforcement mode for a protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Authentication failure rejects the request
    Strict,
    /// Best-effort enrichment with one renewal attempt
    Lenient,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Strict => "strict",
            Mode::Lenient => "lenient",
        }
    }
}

/// What lenient enforcement does once claims end up cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LenientFailure {
    /// Run the operation without claims
    #[default]
    Proceed,
    /// Reject like strict mode, after the renewal attempt
    Reject,
}

/// Renewal procedure failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RenewalError(pub String);

/// Performs the refresh-token exchange for lenient enforcement.
///
/// On success it must overwrite the session's access credential. A returned
/// error is treated as "renewal unavailable".
pub trait RenewalCallback: Send + Sync {
    fn renew(
        &self,
        session: &mut SessionBag,
    ) -> impl Future<Output = Result<(), RenewalError>> + Send;
}

/// Renewal callback for deployments without refresh support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRenewal;

impl RenewalCallback for NoRenewal {
    async fn renew(&self, _session: &mut SessionBag) -> Result<(), RenewalError> {
        Err(RenewalError("no renewal procedure configured".to_string()))
    }
}

/// Result of lenient enforcement. Never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LenientOutcome {
    Verified { claims: Claims, renewed: bool },
    Cleared { reason: AuthError },
}

impl LenientOutcome {
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            LenientOutcome::Verified { claims, .. } => Some(claims),
            LenientOutcome::Cleared { .. } => None,
        }
    }
}

/// Which verification a lenient pass is on. Bounds renewal to one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    AfterRenewal,
}

/// Verifies request credentials through the scope's verifier.
pub struct AuthenticationGate<V, P> {
    services: Arc<ServiceCache<V, P>>,
    lenient_failure: LenientFailure,
}

impl<V, P> Clone for AuthenticationGate<V, P> {
    fn clone(&self) -> Self {
        Self {
            services: Arc::clone(&self.services),
            lenient_failure: self.lenient_failure,
        }
    }
}

impl<V, P> AuthenticationGate<V, P>
where
    V: CredentialVerifier,
    P: IdentityProviderClient,
{
    pub fn new(services: ServiceCache<V, P>) -> Self {
        Self {
            services: Arc::new(services),
            lenient_failure: LenientFailure::default(),
        }
    }

    pub fn with_lenient_failure(mut self, policy: LenientFailure) -> Self {
        self.lenient_failure = policy;
        self
    }

    pub fn services(&self) -> &ServiceCache<V, P> {
        &self.services
    }

    pub fn lenient_failure(&self) -> LenientFailure {
        self.lenient_failure
    }

    /// Require a valid credential.
    ///
    /// The caller must drain any buffered request body before sending the
    /// rejection.
    pub async fn enforce_strict<C>(
        &self,
        scope: &ServiceScope,
        ctx: &mut C,
    ) -> Result<Claims, AuthError>
    where
        C: RequestContext + Send,
    {
        let presented = credential::extract(ctx.headers(), ctx.session());

        match self.verify(scope, presented.as_ref()).await {
            Ok(claims) => {
                tracing::debug!(scope = %scope, mode = "strict", "Credential verified");
                ctx.set_claims(Some(claims.clone()));
                Ok(claims)
            }
            Err(err) => {
                tracing::info!(
                    scope = %scope,
                    mode = "strict",
                    error_code = err.error_code(),
                    "Authentication rejected"
                );
                Err(err)
            }
        }
    }

    /// Verify if possible, renewing at most once; never fails.
    pub async fn enforce_lenient<C, R>(
        &self,
        scope: &ServiceScope,
        ctx: &mut C,
        renewal: &R,
    ) -> LenientOutcome
    where
        C: RequestContext + Send,
        R: RenewalCallback,
    {
        let mut attempt = Attempt::Initial;
        let mut presented = credential::extract(ctx.headers(), ctx.session());

        loop {
            let failure = match self.verify(scope, presented.as_ref()).await {
                Ok(claims) => {
                    let renewed = attempt == Attempt::AfterRenewal;
                    tracing::debug!(scope = %scope, mode = "lenient", renewed, "Credential verified");
                    ctx.set_claims(Some(claims.clone()));
                    return LenientOutcome::Verified { claims, renewed };
                }
                Err(err) => err,
            };

            if attempt == Attempt::AfterRenewal {
                return Self::clear(scope, ctx, failure);
            }

            let renewable = matches!(
                failure,
                AuthError::CredentialAbsent | AuthError::CredentialInvalid(_)
            );
            if !renewable || !credential::has_refresh_credential(ctx.session()) {
                return Self::clear(scope, ctx, failure);
            }

            tracing::debug!(
                scope = %scope,
                error_code = failure.error_code(),
                "Verification failed, attempting credential renewal"
            );
            if let Err(err) = renewal.renew(ctx.session_mut()).await {
                return Self::clear(scope, ctx, AuthError::RenewalUnavailable(err.0));
            }

            attempt = Attempt::AfterRenewal;
            presented = credential::from_session(ctx.session());
        }
    }

    /// Enforce in either mode, applying the lenient failure policy.
    ///
    /// `Ok(None)` means the operation may run without claims.
    pub async fn enforce<C, R>(
        &self,
        mode: Mode,
        scope: &ServiceScope,
        ctx: &mut C,
        renewal: &R,
    ) -> Result<Option<Claims>, AuthError>
    where
        C: RequestContext + Send,
        R: RenewalCallback,
    {
        match mode {
            Mode::Strict => self.enforce_strict(scope, ctx).await.map(Some),
            Mode::Lenient => match self.enforce_lenient(scope, ctx, renewal).await {
                LenientOutcome::Verified { claims, .. } => Ok(Some(claims)),
                LenientOutcome::Cleared { reason } => match self.lenient_failure {
                    LenientFailure::Proceed => Ok(None),
                    LenientFailure::Reject => Err(reason),
                },
            },
        }
    }

    /// Run `operation` only if enforcement lets it through.
    pub async fn guard<C, R, F, Fut, T>(
        &self,
        mode: Mode,
        scope: &ServiceScope,
        ctx: &mut C,
        renewal: &R,
        operation: F,
    ) -> Result<T, AuthError>
    where
        C: RequestContext + Send,
        R: RenewalCallback,
        F: FnOnce(Option<Claims>) -> Fut,
        Fut: Future<Output = T>,
    {
        let claims = self.enforce(mode, scope, ctx, renewal).await?;
        Ok(operation(claims).await)
    }

    async fn verify(
        &self,
        scope: &ServiceScope,
        presented: Option<&Credential>,
    ) -> Result<Claims, AuthError> {
        let presented = presented.ok_or(AuthError::CredentialAbsent)?;
        let verifier = self
            .services
            .verifier(scope)
            .ok_or(AuthError::ScopeInactive)?;

        verifier
            .verify(presented)
            .await
            .map_err(|e| AuthError::CredentialInvalid(e.reason))
    }

    fn clear<C: RequestContext>(
        scope: &ServiceScope,
        ctx: &mut C,
        reason: AuthError,
    ) -> LenientOutcome {
        tracing::debug!(
            scope = %scope,
            mode = "lenient",
            error_code = reason.error_code(),
            "Claims cleared"
        );
        ctx.set_claims(None);
        LenientOutcome::Cleared { reason }
    }
}
