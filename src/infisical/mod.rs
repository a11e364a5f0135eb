//! Infisical API interaction module
//!
//! Everything that talks to the Infisical service lives here: the
//! authenticated HTTP client, response body handling, and the two resource
//! collections the data sources read.
//!
//! # Module Structure
//!
//! - [`client`] - HTTP client bound to a host, injecting the API key header
//! - [`http`] - GET helper, status handling and the response body resource
//! - [`decode`] - Typed decoding of response bodies
//! - [`organizations`] - Organizations of the current user
//! - [`projects`] - Projects (workspaces) of an organization
//!
//! # Example
//!
//! ```ignore
//! use infisical_datasource::config::Credential;
//! use infisical_datasource::infisical::{client::InfisicalClient, decode, organizations};
//!
//! async fn example() -> infisical_datasource::error::Result<()> {
//!     let client = InfisicalClient::new(&Credential::new("https://infisical.com", "st.token"))?;
//!     let body = organizations::fetch_organizations(&client).await?;
//!     let decoded = decode::decode::<organizations::OrganizationsResponse, _>("organizations", body).await;
//!     println!("{} organizations", decoded.records?.organizations.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod decode;
pub mod http;
pub mod organizations;
pub mod projects;
