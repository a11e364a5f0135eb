//! Infisical Projects
//!
//! Projects are called workspaces by the API. Each carries its environments
//! in the order the service returns them.

use super::client::InfisicalClient;
use super::decode::null_as_default;
use super::http::HttpBody;
use crate::error::Result;
use serde::Deserialize;

/// Path of the workspaces collection of an organization
pub fn workspaces_path(organization_id: &str) -> String {
    format!(
        "/api/v2/organizations/{}/workspaces",
        urlencoding::encode(organization_id)
    )
}

/// Body of `GET /api/v2/organizations/{organizationId}/workspaces`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkspacesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub workspaces: Vec<Project>,
}

/// Project (workspace) record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "organization", default, deserialize_with = "null_as_default")]
    pub organization_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub environments: Vec<Environment>,
}

/// Environment of a project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Environment {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Fetch the projects of an organization
pub async fn fetch_projects(client: &InfisicalClient, organization_id: &str) -> Result<HttpBody> {
    client.get(&workspaces_path(organization_id)).await
}
