// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoded token claims published for the duration of one request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims produced by a successful credential verification.
///
/// Identity-pool tokens carry standard OIDC claims plus provider-specific
/// ones (`cognito:username`, `cognito:groups`). The gate never inspects them;
/// the accessors below are for handlers.
///
/// There are no mutators. A new verification produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Raw claim lookup.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Subject (user ID)
    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    /// Username from an access token (`username`) or an ID token
    /// (`cognito:username`).
    pub fn username(&self) -> Option<&str> {
        self.str_claim("username")
            .or_else(|| self.str_claim("cognito:username"))
    }

    /// App client the token was issued to.
    pub fn client_id(&self) -> Option<&str> {
        self.str_claim("client_id").or_else(|| self.str_claim("aud"))
    }

    /// Expiration time, if the `exp` claim is a valid Unix timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.get("exp")
            .and_then(Value::as_i64)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Group memberships (`cognito:groups`). Empty when absent.
    pub fn groups(&self) -> Vec<&str> {
        self.get("cognito:groups")
            .and_then(Value::as_array)
            .map(|groups| groups.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

impl TryFrom<Value> for Claims {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}
