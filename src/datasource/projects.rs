//! Projects data source
//!
//! Lists the projects of one organization together with their environments.

use super::state::{project_projects, ProjectsState};
use super::{fetch_collection, unconfigured, ReadResponse};
use crate::config::ConfigValue;
use crate::diagnostics::Diagnostics;
use crate::infisical::projects::{fetch_projects, WorkspacesResponse};
use crate::provider::ProviderData;
use crate::schema::{Attribute, Schema};

const SUBJECT: &str = "Projects for User";

/// Configuration of one projects read
#[derive(Debug, Clone, Default)]
pub struct ProjectsConfig {
    pub organization_id: ConfigValue,
}

impl ProjectsConfig {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: ConfigValue::known(organization_id),
        }
    }

    /// Validate the configuration the way the schema would
    fn organization_id(&self) -> Result<&str, Diagnostics> {
        let mut diags = Diagnostics::new();
        match &self.organization_id {
            ConfigValue::Known(id) if !id.is_empty() => return Ok(id.as_str()),
            ConfigValue::Unknown => diags.add_attribute_error(
                "organization_id",
                "Unknown Organization Id",
                "The organization_id value is not known yet. Either target apply the source \
                 of the value first or set the value statically in the configuration.",
            ),
            _ => diags.add_attribute_error(
                "organization_id",
                "Missing Organization Id",
                "The organization_id attribute is required and must not be empty.",
            ),
        }
        Err(diags)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectsDataSource {
    data: Option<ProviderData>,
}

impl ProjectsDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_name(provider_type_name: &str) -> String {
        format!("{provider_type_name}_projects")
    }

    pub fn schema() -> Schema {
        Schema {
            description: "Fetches the list of projects.",
            attributes: vec![
                Attribute::string("id", "Current Unix timestamp for id."),
                Attribute::string("organization_id", "Identifier of the organization.").required(),
                Attribute::list(
                    "projects",
                    "List of projects.",
                    vec![
                        Attribute::string("id", "Identifier of the project."),
                        Attribute::string("name", "Name of the project."),
                        Attribute::list(
                            "environments",
                            "List of environments.",
                            vec![
                                Attribute::string("id", "Identifier of the environment."),
                                Attribute::string("name", "Name of the environment."),
                                Attribute::string("slug", "Slug of the environment."),
                            ],
                        ),
                    ],
                ),
            ],
        }
    }

    pub fn configure(&mut self, data: Option<&ProviderData>) {
        self.data = data.cloned();
    }

    pub async fn read(&self, config: &ProjectsConfig) -> ReadResponse<ProjectsState> {
        let organization_id = match config.organization_id() {
            Ok(id) => id,
            Err(diags) => return ReadResponse::failed(diags),
        };

        let Some(data) = &self.data else {
            return ReadResponse::failed(unconfigured(SUBJECT).into());
        };

        let mut diagnostics = Diagnostics::new();
        let response: Option<WorkspacesResponse> = fetch_collection(
            fetch_projects(&data.client, organization_id),
            "projects",
            SUBJECT,
            &mut diagnostics,
        )
        .await;

        let Some(response) = response else {
            return ReadResponse::failed(diagnostics);
        };

        let state = project_projects(response.workspaces, organization_id, &data.clock);
        tracing::debug!(
            organization_id,
            "Read {} projects (id {})",
            state.projects.len(),
            state.id
        );

        ReadResponse {
            state: Some(state),
            diagnostics,
        }
    }
}
