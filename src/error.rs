//! Error types
//!
//! Every failure in the read pipeline is a [`ProviderError`]. The host never
//! sees these directly: they are turned into [`Diagnostic`]s at the data
//! source or provider boundary.

use crate::diagnostics::Diagnostic;
use reqwest::StatusCode;
use std::fmt;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Which part of the configuration a configuration error concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssue {
    /// Value present but not yet determinable
    Unknown,
    /// Value empty after all precedence layers
    Missing,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Missing => f.write_str("missing"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("{attribute} is {issue}")]
    Configuration {
        attribute: &'static str,
        issue: ConfigIssue,
    },

    #[error("failed to build the Infisical API client: {0}")]
    ClientConstruction(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to read response body: {0}")]
    BodyRead(#[source] std::io::Error),

    #[error("failed to decode {resource}: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to close response body: {0}")]
    ResourceRelease(#[source] std::io::Error),
}

impl ProviderError {
    /// True for transport, status and body-read failures
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::BodyRead(_)
        )
    }

    /// Convert into a diagnostic. `subject` names the thing being read, e.g.
    /// "Organizations for User".
    pub fn to_diagnostic(&self, subject: &str) -> Diagnostic {
        match self {
            Self::Configuration { attribute, issue } => configuration_diagnostic(attribute, *issue),
            Self::ClientConstruction(_) => Diagnostic::error(
                "Unable to Create Infisical API Client",
                format!(
                    "An unexpected error occurred when creating the Infisical API client. \
                     If the error is not clear, please contact the provider developers.\n\n\
                     Infisical Client Error: {self}"
                ),
            ),
            Self::Transport { .. } | Self::Status { .. } | Self::BodyRead(_) => Diagnostic::error(
                format!("Unable to Read Infisical {subject}"),
                self.to_string(),
            ),
            Self::Decode { .. } => Diagnostic::error(
                format!("Unable to Decode Infisical {subject}"),
                self.to_string(),
            ),
            Self::ResourceRelease(_) => Diagnostic::warning(
                format!("Unable to close body reader for {subject}"),
                self.to_string(),
            ),
        }
    }
}

fn configuration_diagnostic(attribute: &str, issue: ConfigIssue) -> Diagnostic {
    let (label, env_var) = match attribute {
        "host" => ("Host", crate::config::HOST_ENV),
        _ => ("API Token", crate::config::API_TOKEN_ENV),
    };

    let diagnostic = match issue {
        ConfigIssue::Unknown => Diagnostic::error(
            format!("Unknown Infisical {label}"),
            format!(
                "The provider cannot create the Infisical API client as there is an unknown \
                 configuration value for the Infisical {label}. Either target apply the source \
                 of the value first, set the value statically in the configuration, or use the \
                 {env_var} environment variable."
            ),
        ),
        ConfigIssue::Missing => Diagnostic::error(
            format!("Missing Infisical {label}"),
            format!(
                "The provider cannot create the Infisical API client as there is a missing or \
                 empty value for the Infisical {label}. Set the {attribute} value in the \
                 configuration or use the {env_var} environment variable. If either is already \
                 set, ensure the value is not empty."
            ),
        ),
    };

    diagnostic.at(attribute)
}
