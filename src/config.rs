//! Provider Configuration
//!
//! Resolves the effective Infisical connection settings.
//!
//! Precedence, highest first: explicit configuration value, environment
//! variable, built-in default. The host defaults to the public Infisical
//! service; the API token has no default.

use crate::diagnostics::Diagnostics;
use crate::error::{ConfigIssue, ProviderError};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fmt;

pub const HOST_ENV: &str = "INFISICAL_HOST";
pub const API_TOKEN_ENV: &str = "INFISICAL_API_TOKEN";
pub const DEFAULT_HOST: &str = "https://infisical.com";

/// A configuration value as the host tool hands it over
#[derive(Clone, Default, PartialEq, Eq)]
pub enum ConfigValue {
    /// Not set in the configuration
    #[default]
    Null,
    /// Set, but depends on something not yet applied
    Unknown,
    Known(String),
}

impl ConfigValue {
    pub fn known(value: impl Into<String>) -> Self {
        Self::Known(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn as_known(&self) -> Option<&str> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Option<String>> for ConfigValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }
}

// Known values may be secrets, so never print them.
impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Unknown => f.write_str("Unknown"),
            Self::Known(_) => f.write_str("Known(..)"),
        }
    }
}

/// Provider-level configuration block
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub host: ConfigValue,
    pub api_token: ConfigValue,
}

/// Source of environment variables
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

/// Resolved connection settings
#[derive(Debug, Clone)]
pub struct Credential {
    pub host: String,
    pub token: SecretString,
}

impl Credential {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: SecretString::from(token.into()),
        }
    }

    pub fn expose_token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl ProviderConfig {
    /// Resolve the effective credential. All problems are collected before
    /// returning so the caller sees every diagnostic at once.
    pub fn resolve(&self, env: &impl EnvSource) -> Result<Credential, Diagnostics> {
        let mut diags = Diagnostics::new();

        if self.host.is_unknown() {
            diags.push(unknown("host"));
        }
        if self.api_token.is_unknown() {
            diags.push(unknown("api_token"));
        }
        if diags.has_error() {
            return Err(diags);
        }

        let host = match self.host.as_known() {
            Some(host) => host.to_string(),
            None => env
                .var(HOST_ENV)
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        };

        let token = match self.api_token.as_known() {
            Some(token) => token.to_string(),
            None => env.var(API_TOKEN_ENV).unwrap_or_default(),
        };

        if token.is_empty() {
            diags.push(
                ProviderError::Configuration {
                    attribute: "api_token",
                    issue: ConfigIssue::Missing,
                }
                .to_diagnostic("Configuration"),
            );
            return Err(diags);
        }

        Ok(Credential::new(host, token))
    }
}

fn unknown(attribute: &'static str) -> crate::diagnostics::Diagnostic {
    ProviderError::Configuration {
        attribute,
        issue: ConfigIssue::Unknown,
    }
    .to_diagnostic("Configuration")
}
