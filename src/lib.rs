//! Read-only Infisical data sources
//!
//! Resolves provider configuration, builds one authenticated client, and reads
//! organizations and projects (with their environments) into typed,
//! immutable snapshots for an infrastructure tool.
//!
//! # Example
//!
//! ```ignore
//! use infisical_datasource::config::{ProcessEnv, ProviderConfig};
//! use infisical_datasource::datasource::{OrganizationsConfig, OrganizationsDataSource};
//! use infisical_datasource::provider::InfisicalProvider;
//!
//! async fn example() {
//!     let configured = InfisicalProvider::new().configure(&ProviderConfig::default(), &ProcessEnv);
//!     let mut organizations = OrganizationsDataSource::new();
//!     organizations.configure(configured.data.as_ref());
//!     let response = organizations.read(&OrganizationsConfig::default()).await;
//!     println!("{:?}", response.state);
//! }
//! ```

pub mod config;
pub mod datasource;
pub mod diagnostics;
pub mod error;
pub mod infisical;
pub mod provider;
pub mod schema;

/// Version injected at compile time via INFISICAL_DATASOURCE_VERSION env var
/// (set by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("INFISICAL_DATASOURCE_VERSION") {
    Some(v) => v,
    None => "dev",
};
