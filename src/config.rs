// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! The gate reads its identity-pool settings from the environment once at
//! startup. The resulting [`GateConfig`] is immutable and shared read-only by
//! every request scope.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AWS_COGNITO_USER_POOL_ID` | Identity pool identifier | Required |
//! | `AWS_COGNITO_USER_POOL_CLIENT_ID` | App client identifier | Required |
//! | `AWS_COGNITO_USER_POOL_CLIENT_SECRET` | App client secret | Required |
//! | `AWS_COGNITO_REDIRECT_URL` | Post-authentication redirect target | Required |
//! | `AWS_DEFAULT_REGION` | Region hosting the pool | Required |
//! | `AWS_COGNITO_DOMAIN` | Token-issuing (hosted UI) domain | Required |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::fmt;

use url::Url;

/// Environment variable name for the identity pool identifier.
pub const USER_POOL_ID_ENV: &str = "AWS_COGNITO_USER_POOL_ID";

/// Environment variable name for the app client identifier.
pub const USER_POOL_CLIENT_ID_ENV: &str = "AWS_COGNITO_USER_POOL_CLIENT_ID";

/// Environment variable name for the app client secret.
pub const USER_POOL_CLIENT_SECRET_ENV: &str = "AWS_COGNITO_USER_POOL_CLIENT_SECRET";

/// Environment variable name for the post-authentication redirect URL.
pub const REDIRECT_URL_ENV: &str = "AWS_COGNITO_REDIRECT_URL";

/// Environment variable name for the pool's region.
pub const REGION_ENV: &str = "AWS_DEFAULT_REGION";

/// Environment variable name for the token-issuing domain.
pub const DOMAIN_ENV: &str = "AWS_COGNITO_DOMAIN";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required configuration {0} is missing or empty")]
    Missing(&'static str),

    #[error("AWS_COGNITO_REDIRECT_URL is not a valid URL: {0}")]
    InvalidRedirectUrl(String),
}

/// Identity-pool settings resolved once at startup.
///
/// Every field is required. Nothing here is re-validated per request.
#[derive(Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub user_pool_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub region: String,
    pub domain: String,
    pub redirect_url: Url,
}

impl GateConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let redirect_url = required(REDIRECT_URL_ENV)?;
        let redirect_url = Url::parse(&redirect_url)
            .map_err(|e| ConfigError::InvalidRedirectUrl(e.to_string()))?;

        Ok(Self {
            user_pool_id: required(USER_POOL_ID_ENV)?,
            client_id: required(USER_POOL_CLIENT_ID_ENV)?,
            client_secret: required(USER_POOL_CLIENT_SECRET_ENV)?,
            region: required(REGION_ENV)?,
            domain: required(DOMAIN_ENV)?,
            redirect_url,
        })
    }
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("region", &self.region)
            .field("domain", &self.domain)
            .field("redirect_url", &self.redirect_url.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (USER_POOL_ID_ENV, "eu-west-1_AbCdEf".to_string()),
            (USER_POOL_CLIENT_ID_ENV, "client-123".to_string()),
            (USER_POOL_CLIENT_SECRET_ENV, "s3cret".to_string()),
            (REDIRECT_URL_ENV, "https://app.example.com/callback".to_string()),
            (REGION_ENV, "eu-west-1".to_string()),
            (DOMAIN_ENV, "auth.example.com".to_string()),
        ])
    }

    #[test]
    fn loads_all_required_values() {
        let env = full_env();
        let config = GateConfig::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.user_pool_id, "eu-west-1_AbCdEf");
        assert_eq!(config.client_id, "client-123");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.redirect_url.host_str(), Some("app.example.com"));
    }

    #[test]
    fn blank_value_is_reported_as_missing() {
        let mut env = full_env();
        env.insert(DOMAIN_ENV, "   ".to_string());

        let err = GateConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing(DOMAIN_ENV));
    }

    #[test]
    fn absent_secret_is_reported_by_name() {
        let mut env = full_env();
        env.remove(USER_POOL_CLIENT_SECRET_ENV);

        let err = GateConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains(USER_POOL_CLIENT_SECRET_ENV));
    }

    #[test]
    fn rejects_unparseable_redirect_url() {
        let mut env = full_env();
        env.insert(REDIRECT_URL_ENV, "not a url".to_string());

        let err = GateConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRedirectUrl(_)));
    }

    #[test]
    fn debug_redacts_client_secret() {
        let env = full_env();
        let config = GateConfig::from_lookup(|k| env.get(k).cloned()).unwrap();

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
