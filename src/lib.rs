// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Auth Gate - per-request authentication for services that
//! delegate identity to an external OIDC identity pool.
//!
//! ## Modules
//!
//! - `auth` - Credential extraction, the authentication gate, per-request
//!   service cache and the Axum adapter
//! - `config` - Identity-pool configuration loaded at startup
//! - `session` - Session bag shared with the host's session layer
//! - `telemetry` - Tracing subscriber setup

pub mod auth;
pub mod config;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod test_support;
