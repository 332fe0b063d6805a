// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OAuth redirect and callback helpers.
//!
//! These forward to the scope's [`IdentityProviderClient`]. The only logic
//! owned here is the CSRF check: the `state` returned to the callback must
//! equal [`expected_state`] before any call reaches the identity provider.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use super::cache::ServiceScope;
use super::gate::AuthenticationGate;
use super::services::{CredentialVerifier, IdentityProviderClient, SignInStyle, TokenSet};
use super::AuthError;
use crate::config::GateConfig;
use crate::session::{SessionBag, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

type HmacSha256 = Hmac<Sha256>;

fn state_mac(config: &GateConfig) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(config.client_id.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(config.user_pool_id.as_bytes());
    mac
}

/// Deterministic OAuth `state` value for this pool and client.
///
/// Hex HMAC-SHA256 of the pool id keyed by the client id. Identity clients
/// embed it in sign-in URLs.
pub fn expected_state(config: &GateConfig) -> String {
    hex::encode(state_mac(config).finalize().into_bytes())
}

/// Constant-time check of a callback `state` against [`expected_state`].
pub fn state_matches(config: &GateConfig, state: &str) -> bool {
    match hex::decode(state) {
        Ok(tag) => state_mac(config).verify_slice(&tag).is_ok(),
        Err(_) => false,
    }
}

/// Query parameters delivered to the OAuth redirect target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl TokenSet {
    /// Store the access and refresh tokens where the gate looks for them.
    pub fn store_in(&self, session: &mut SessionBag) {
        session.insert(ACCESS_TOKEN_KEY, self.access_token.clone());
        if let Some(refresh_token) = &self.refresh_token {
            session.insert(REFRESH_TOKEN_KEY, refresh_token.clone());
        }
    }
}

impl<V, P> AuthenticationGate<V, P>
where
    V: CredentialVerifier,
    P: IdentityProviderClient,
{
    pub fn expected_state(&self) -> String {
        expected_state(self.services().config())
    }

    pub fn sign_in_url(&self, scope: &ServiceScope, style: SignInStyle) -> Result<String, AuthError> {
        let client = self
            .services()
            .identity_client(scope)
            .ok_or(AuthError::ScopeInactive)?;
        Ok(client.sign_in_url(style))
    }

    pub fn logout_url(&self, scope: &ServiceScope) -> Result<String, AuthError> {
        let client = self
            .services()
            .identity_client(scope)
            .ok_or(AuthError::ScopeInactive)?;
        Ok(client.logout_url())
    }

    /// Exchange the callback's authorization code for tokens.
    ///
    /// A mismatched `state` fails with [`AuthError::StateMismatch`] before
    /// the identity provider is contacted.
    pub async fn exchange_tokens(
        &self,
        scope: &ServiceScope,
        params: &CallbackParams,
    ) -> Result<TokenSet, AuthError> {
        let config = self.services().config();
        if !params
            .state
            .as_deref()
            .is_some_and(|state| state_matches(config, state))
        {
            tracing::warn!(scope = %scope, "OAuth callback state mismatch");
            return Err(AuthError::StateMismatch);
        }

        let code = params
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or(AuthError::MissingAuthorizationCode)?;

        let client = self
            .services()
            .identity_client(scope)
            .ok_or(AuthError::ScopeInactive)?;

        client.exchange_code_for_token(code).await.map_err(|e| {
            tracing::warn!(scope = %scope, error = %e, "Authorization code exchange failed");
            AuthError::Provider(e.0)
        })
    }

    pub async fn user_info(
        &self,
        scope: &ServiceScope,
        access_token: &str,
    ) -> Result<Value, AuthError> {
        let client = self
            .services()
            .identity_client(scope)
            .ok_or(AuthError::ScopeInactive)?;

        client
            .user_info(access_token)
            .await
            .map_err(|e| AuthError::Provider(e.0))
    }
}
