//! Organizations data source
//!
//! Lists the organizations of the user the API token belongs to.

use super::state::{project_organizations, OrganizationFields, OrganizationsState};
use super::{fetch_collection, unconfigured, ReadResponse};
use crate::diagnostics::Diagnostics;
use crate::infisical::organizations::{fetch_organizations, OrganizationsResponse};
use crate::provider::ProviderData;
use crate::schema::{Attribute, Schema};

const SUBJECT: &str = "Organizations for User";

/// Configuration of one organizations read
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationsConfig {
    /// Also expose `created_at`, `updated_at` and `v`
    pub include_audit_fields: bool,
}

impl OrganizationsConfig {
    fn fields(&self) -> OrganizationFields {
        if self.include_audit_fields {
            OrganizationFields::WithAudit
        } else {
            OrganizationFields::Canonical
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationsDataSource {
    data: Option<ProviderData>,
}

impl OrganizationsDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_name(provider_type_name: &str) -> String {
        format!("{provider_type_name}_organizations")
    }

    pub fn schema() -> Schema {
        Schema {
            description: "Fetches the list of organizations.",
            attributes: vec![
                Attribute::string("id", "Current Unix timestamp for id."),
                Attribute::bool(
                    "include_audit_fields",
                    "Also expose created_at, updated_at and v for each organization.",
                )
                .optional(),
                Attribute::list(
                    "organizations",
                    "List of organizations.",
                    vec![
                        Attribute::string("id", "Identifier of the organization."),
                        Attribute::string("name", "Name of the organization."),
                        Attribute::string("created_at", "Creation time of the organization."),
                        Attribute::string("updated_at", "Last update time of the organization."),
                        Attribute::number("v", "Revision of the organization record."),
                    ],
                ),
            ],
        }
    }

    /// Attach the configured provider. `None` leaves the data source
    /// unconfigured.
    pub fn configure(&mut self, data: Option<&ProviderData>) {
        self.data = data.cloned();
    }

    pub async fn read(&self, config: &OrganizationsConfig) -> ReadResponse<OrganizationsState> {
        let Some(data) = &self.data else {
            return ReadResponse::failed(unconfigured(SUBJECT).into());
        };

        let mut diagnostics = Diagnostics::new();
        let response: Option<OrganizationsResponse> = fetch_collection(
            fetch_organizations(&data.client),
            "organizations",
            SUBJECT,
            &mut diagnostics,
        )
        .await;

        let Some(response) = response else {
            return ReadResponse::failed(diagnostics);
        };

        let state = project_organizations(response.organizations, config.fields(), &data.clock);
        tracing::debug!(
            "Read {} organizations (id {})",
            state.organizations.len(),
            state.id
        );

        ReadResponse {
            state: Some(state),
            diagnostics,
        }
    }
}
