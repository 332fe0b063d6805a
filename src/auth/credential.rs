// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Locating the raw credential for a request.
//!
//! Precedence:
//!
//! 1. `Authorization: Bearer <token>` header
//! 2. `access_token` stored in the session bag
//!
//! Absence is a normal outcome and is reported as `None`, never as an error.

use std::fmt;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::session::{SessionBag, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

const BEARER_PREFIX: &str = "Bearer ";

/// Opaque bearer or session-stored token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token. Blank input yields `None`.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Find the credential for this request, header first.
pub fn extract(headers: &HeaderMap, session: &SessionBag) -> Option<Credential> {
    from_header(headers).or_else(|| from_session(session))
}

/// Bearer credential from the authorization header.
///
/// Everything after the `Bearer ` prefix is the credential.
pub fn from_header(headers: &HeaderMap) -> Option<Credential> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix(BEARER_PREFIX).and_then(Credential::new)
}

/// Access credential previously stored in the session.
pub fn from_session(session: &SessionBag) -> Option<Credential> {
    session.get(ACCESS_TOKEN_KEY).and_then(Credential::new)
}

/// Whether the session holds refresh material for a renewal attempt.
pub fn has_refresh_credential(session: &SessionBag) -> bool {
    session
        .get(REFRESH_TOKEN_KEY)
        .is_some_and(|token| !token.trim().is_empty())
}
