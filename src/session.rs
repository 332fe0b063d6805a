// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-caller session storage read and written by the gate.
//!
//! Persisting the bag between requests (cookies, a store) is the job of
//! whatever session layer the host application runs. That layer places a
//! [`SharedSession`] in the request extensions before the gate runs.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Session key holding the current access credential.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Session key holding the refresh credential used for renewal.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// String-keyed values persisted across requests for one caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionBag {
    values: HashMap<String, String>,
}

impl SessionBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Store a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builder-style insert, mostly for seeding sessions.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }
}

/// Session handle shared through request extensions.
#[derive(Debug, Clone, Default)]
pub struct SharedSession(pub Arc<Mutex<SessionBag>>);

impl SharedSession {
    pub fn new(bag: SessionBag) -> Self {
        Self(Arc::new(Mutex::new(bag)))
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> SessionBag {
        self.0.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut bag = SessionBag::new().with(ACCESS_TOKEN_KEY, "old");
        let previous = bag.insert(ACCESS_TOKEN_KEY, "new");

        assert_eq!(previous.as_deref(), Some("old"));
        assert_eq!(bag.get(ACCESS_TOKEN_KEY), Some("new"));
    }

    #[test]
    fn serializes_as_flat_map() {
        let bag = SessionBag::new().with(REFRESH_TOKEN_KEY, "rtok");
        let json = serde_json::to_value(&bag).unwrap();
        assert_eq!(json, serde_json::json!({ "refresh_token": "rtok" }));
    }

    #[tokio::test]
    async fn shared_session_snapshot_sees_writes() {
        let shared = SharedSession::new(SessionBag::new());
        shared.0.lock().await.insert(ACCESS_TOKEN_KEY, "abc");

        let snapshot = shared.snapshot().await;
        assert_eq!(snapshot.get(ACCESS_TOKEN_KEY), Some("abc"));
    }
}
