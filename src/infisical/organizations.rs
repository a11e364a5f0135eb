//! Infisical Organizations
//!
//! Organizations the authenticated user belongs to.

use super::client::InfisicalClient;
use super::decode::null_as_default;
use super::http::HttpBody;
use crate::error::Result;
use serde::Deserialize;

pub const ORGANIZATIONS_PATH: &str = "/api/v2/users/me/organizations";

/// Body of `GET /api/v2/users/me/organizations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrganizationsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub organizations: Vec<Organization>,
}

/// Organization record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Organization {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub audit: OrganizationAudit,
}

/// Bookkeeping fields the API may return alongside an organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrganizationAudit {
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
    #[serde(rename = "__v")]
    pub version: Option<i64>,
}

/// Fetch the organizations of the current user
pub async fn fetch_organizations(client: &InfisicalClient) -> Result<HttpBody> {
    client.get(ORGANIZATIONS_PATH).await
}
