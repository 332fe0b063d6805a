// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity-provider collaborators consumed by the gate.
//!
//! Implementations live with the host application: they own JWKS fetching,
//! signature/issuer/audience/expiry checks, redirect URL construction and the
//! token endpoint. The gate only sequences calls to them.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Claims, Credential};

/// Verification rejected the credential.
///
/// Expired, malformed, bad signature, wrong audience or issuer all map here.
/// The reason is shown to the client in strict mode, so keep it free of
/// token material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct CredentialInvalid {
    pub reason: String,
}

impl CredentialInvalid {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A call to the identity provider failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// Verifies a credential and decodes its claims.
pub trait CredentialVerifier: Send + Sync + 'static {
    fn verify(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Claims, CredentialInvalid>> + Send;
}

/// Hosted sign-in page variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignInStyle {
    #[default]
    Login,
    Signup,
}

impl SignInStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInStyle::Login => "login",
            SignInStyle::Signup => "signup",
        }
    }
}

/// Tokens returned by the authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth client for the identity provider.
///
/// Only the callback and redirect helpers on the gate call this; enforcement
/// never does.
pub trait IdentityProviderClient: Send + Sync + 'static {
    fn sign_in_url(&self, style: SignInStyle) -> String;

    fn logout_url(&self) -> String;

    fn exchange_code_for_token(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<TokenSet, ProviderError>> + Send;

    fn user_info(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;
}
