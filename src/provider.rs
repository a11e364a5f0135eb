//! Infisical provider
//!
//! Entry point for the host tool: provider metadata and schema, configuration
//! into a shared [`ProviderData`], and the list of data-source factories.
//! Nothing here is global; every caller (and every test) builds its own
//! provider.

use crate::config::{EnvSource, ProviderConfig};
use crate::datasource::state::FreshnessClock;
use crate::datasource::{DataSource, OrganizationsDataSource, ProjectsDataSource};
use crate::diagnostics::Diagnostics;
use crate::infisical::client::InfisicalClient;
use crate::schema::{Attribute, Schema};
use std::sync::Arc;

/// Shared state handed to data sources once the provider is configured
#[derive(Debug, Clone)]
pub struct ProviderData {
    pub client: InfisicalClient,
    pub clock: Arc<FreshnessClock>,
}

impl ProviderData {
    pub fn new(client: InfisicalClient) -> Self {
        Self {
            client,
            clock: Arc::new(FreshnessClock::new()),
        }
    }
}

/// Result of configuring the provider
#[derive(Debug, Clone)]
pub struct ConfigureResponse {
    pub data: Option<ProviderData>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InfisicalProvider;

impl InfisicalProvider {
    pub const TYPE_NAME: &'static str = "infisical";

    pub fn new() -> Self {
        Self
    }

    pub fn schema(&self) -> Schema {
        Schema {
            description: "Interact with infisical.",
            attributes: vec![
                Attribute::string(
                    "host",
                    "URI for infisical API. May also be provided via INFISICAL_HOST environment variable.",
                )
                .optional(),
                Attribute::string(
                    "api_token",
                    "API token for infisical API. May also be provided via INFISICAL_API_TOKEN environment variable.",
                )
                .optional()
                .sensitive(),
            ],
        }
    }

    /// Resolve the configuration and build the authenticated client.
    ///
    /// Never panics: both resolution problems and client construction
    /// failures come back as diagnostics with `data` left empty.
    pub fn configure(&self, config: &ProviderConfig, env: &impl EnvSource) -> ConfigureResponse {
        tracing::info!("Configuring Infisical client");

        let credential = match config.resolve(env) {
            Ok(credential) => credential,
            Err(diagnostics) => {
                return ConfigureResponse {
                    data: None,
                    diagnostics,
                }
            }
        };

        tracing::debug!(infisical_host = %credential.host, "Creating Infisical client");

        let client = match InfisicalClient::new(&credential) {
            Ok(client) => client,
            Err(err) => {
                tracing::error!("{}", err);
                return ConfigureResponse {
                    data: None,
                    diagnostics: err.to_diagnostic("API Client").into(),
                };
            }
        };

        tracing::info!(success = true, "Configured Infisical client");

        ConfigureResponse {
            data: Some(ProviderData::new(client)),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Factories for every data source this provider implements
    pub fn data_sources(&self) -> Vec<fn() -> DataSource> {
        vec![new_organizations_data_source as fn() -> DataSource, new_projects_data_source]
    }
}

fn new_organizations_data_source() -> DataSource {
    DataSource::Organizations(OrganizationsDataSource::new())
}

fn new_projects_data_source() -> DataSource {
    DataSource::Projects(ProjectsDataSource::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, API_TOKEN_ENV};
    use std::collections::HashMap;

    fn no_env() -> HashMap<&'static str, &'static str> {
        HashMap::new()
    }

    #[test]
    fn test_data_source_type_names() {
        let provider = InfisicalProvider::new();
        let names: Vec<_> = provider
            .data_sources()
            .iter()
            .map(|factory| factory().type_name(InfisicalProvider::TYPE_NAME))
            .collect();
        assert_eq!(names, vec!["infisical_organizations", "infisical_projects"]);
    }

    #[test]
    fn test_api_token_is_sensitive() {
        let schema = InfisicalProvider::new().schema();
        assert!(schema.attribute("api_token").unwrap().sensitive);
        assert!(!schema.attribute("host").unwrap().sensitive);
    }

    #[test]
    fn test_configure_reports_missing_token() {
        let response = InfisicalProvider::new().configure(&ProviderConfig::default(), &no_env());
        assert!(response.data.is_none());
        assert!(response.diagnostics.has_error());
    }

    #[test]
    fn test_configure_reports_bad_host_instead_of_panicking() {
        let config = ProviderConfig {
            host: ConfigValue::known("not a url"),
            api_token: ConfigValue::known("st.token"),
        };
        let response = InfisicalProvider::new().configure(&config, &no_env());

        assert!(response.data.is_none());
        let diag = response.diagnostics.iter().next().unwrap();
        assert_eq!(diag.summary, "Unable to Create Infisical API Client");
    }

    #[test]
    fn test_configure_from_env() {
        let env: HashMap<&str, &str> = [(API_TOKEN_ENV, "st.token")].into_iter().collect();
        let response = InfisicalProvider::new().configure(&ProviderConfig::default(), &env);

        let data = response.data.unwrap();
        assert_eq!(data.client.host().as_str(), "https://infisical.com/");
        assert!(response.diagnostics.is_empty());
    }
}
