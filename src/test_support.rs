// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use url::Url;

use crate::auth::gate::{RenewalCallback, RenewalError};
use crate::auth::services::{
    CredentialInvalid, CredentialVerifier, IdentityProviderClient, ProviderError, SignInStyle,
    TokenSet,
};
use crate::auth::{AuthenticationGate, Claims, Credential, ServiceCache};
use crate::config::GateConfig;
use crate::session::{SessionBag, ACCESS_TOKEN_KEY};

pub(crate) fn test_config() -> GateConfig {
    GateConfig {
        user_pool_id: "eu-west-1_TestPool".to_string(),
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        region: "eu-west-1".to_string(),
        domain: "auth.example.com".to_string(),
        redirect_url: Url::parse("https://app.example.com/callback").unwrap(),
    }
}

/// Claims the stub verifier derives from an accepted token.
pub(crate) fn claims_for(token: &str) -> Claims {
    Claims::try_from(json!({
        "sub": format!("user-{token}"),
        "username": "jdoe",
        "token_use": "access",
    }))
    .unwrap()
}

#[derive(Clone, Default)]
pub(crate) struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub(crate) fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Accepts tokens starting with `valid`, rejects everything else as expired.
pub(crate) struct StubVerifier {
    verifications: Counter,
}

impl CredentialVerifier for StubVerifier {
    async fn verify(&self, credential: &Credential) -> Result<Claims, CredentialInvalid> {
        self.verifications.bump();
        if credential.as_str().starts_with("valid") {
            Ok(claims_for(credential.as_str()))
        } else {
            Err(CredentialInvalid::new("Token has expired"))
        }
    }
}

/// Identity client that records exchanges and answers with canned data.
pub(crate) struct StubIdentityClient {
    domain: String,
    exchanges: Counter,
}

impl IdentityProviderClient for StubIdentityClient {
    fn sign_in_url(&self, style: SignInStyle) -> String {
        format!("https://{}/{}", self.domain, style.as_str())
    }

    fn logout_url(&self) -> String {
        format!("https://{}/logout", self.domain)
    }

    async fn exchange_code_for_token(&self, code: &str) -> Result<TokenSet, ProviderError> {
        self.exchanges.bump();
        if code == "bad-code" {
            return Err(ProviderError("invalid_grant".to_string()));
        }
        Ok(TokenSet {
            access_token: format!("valid-{code}"),
            id_token: None,
            refresh_token: Some("rtok".to_string()),
            expires_in: Some(3600),
            token_type: Some("Bearer".to_string()),
        })
    }

    async fn user_info(&self, access_token: &str) -> Result<Value, ProviderError> {
        Ok(json!({ "sub": format!("user-{access_token}") }))
    }
}

pub(crate) type TestGate = AuthenticationGate<StubVerifier, StubIdentityClient>;

/// Counters observed by a [`TestGate`].
#[derive(Clone, Default)]
pub(crate) struct Counts {
    verifications: Counter,
    verifiers_built: Counter,
    exchanges: Counter,
}

impl Counts {
    pub(crate) fn verifications(&self) -> usize {
        self.verifications.get()
    }

    pub(crate) fn verifiers_built(&self) -> usize {
        self.verifiers_built.get()
    }

    pub(crate) fn exchanges(&self) -> usize {
        self.exchanges.get()
    }
}

pub(crate) fn test_gate() -> (TestGate, Counts) {
    let counts = Counts::default();
    let (verifications, built, exchanges) = (
        counts.verifications.clone(),
        counts.verifiers_built.clone(),
        counts.exchanges.clone(),
    );

    let cache = ServiceCache::new(
        test_config(),
        move |_: &GateConfig| {
            built.bump();
            StubVerifier {
                verifications: verifications.clone(),
            }
        },
        move |config: &GateConfig| StubIdentityClient {
            domain: config.domain.clone(),
            exchanges: exchanges.clone(),
        },
    );
    (AuthenticationGate::new(cache), counts)
}

/// Renewal that rewrites the session's access token, or fails.
pub(crate) struct RewritingRenewal {
    result: Result<String, String>,
    calls: Counter,
}

impl RewritingRenewal {
    pub(crate) fn to(token: &str) -> Self {
        Self {
            result: Ok(token.to_string()),
            calls: Counter::default(),
        }
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            calls: Counter::default(),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl RenewalCallback for RewritingRenewal {
    async fn renew(&self, session: &mut SessionBag) -> Result<(), RenewalError> {
        self.calls.bump();
        match &self.result {
            Ok(token) => {
                session.insert(ACCESS_TOKEN_KEY, token.clone());
                Ok(())
            }
            Err(reason) => Err(RenewalError(reason.clone())),
        }
    }
}
