// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request storage the gate reads from and publishes into.

use axum::http::HeaderMap;

use super::Claims;
use crate::session::SessionBag;

/// The surrounding framework's view of one request.
pub trait RequestContext {
    fn headers(&self) -> &HeaderMap;

    fn session(&self) -> &SessionBag;

    fn session_mut(&mut self) -> &mut SessionBag;

    /// Publish claims, or `None` to clear them.
    fn set_claims(&mut self, claims: Option<Claims>);
}

/// State of the published-claims slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ClaimsSlot {
    /// The gate has not written yet
    #[default]
    Unset,
    Published(Claims),
    /// Explicitly cleared after a failed verification
    Cleared,
}

impl ClaimsSlot {
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            ClaimsSlot::Published(claims) => Some(claims),
            ClaimsSlot::Unset | ClaimsSlot::Cleared => None,
        }
    }
}

/// [`RequestContext`] over borrowed headers and a locked session.
#[derive(Debug)]
pub struct HttpRequestContext<'a> {
    headers: &'a HeaderMap,
    session: &'a mut SessionBag,
    claims: ClaimsSlot,
    claim_writes: usize,
}

impl<'a> HttpRequestContext<'a> {
    pub fn new(headers: &'a HeaderMap, session: &'a mut SessionBag) -> Self {
        Self {
            headers,
            session,
            claims: ClaimsSlot::Unset,
            claim_writes: 0,
        }
    }

    pub fn claims(&self) -> &ClaimsSlot {
        &self.claims
    }

    /// How many times the claims slot was written.
    pub fn claim_writes(&self) -> usize {
        self.claim_writes
    }
}

impl RequestContext for HttpRequestContext<'_> {
    fn headers(&self) -> &HeaderMap {
        self.headers
    }

    fn session(&self) -> &SessionBag {
        self.session
    }

    fn session_mut(&mut self) -> &mut SessionBag {
        self.session
    }

    fn set_claims(&mut self, claims: Option<Claims>) {
        self.claim_writes += 1;
        self.claims = match claims {
            Some(claims) => ClaimsSlot::Published(claims),
            None => ClaimsSlot::Cleared,
        };
    }
}
