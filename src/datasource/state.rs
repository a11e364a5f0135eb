//! Snapshot state
//!
//! Output shapes handed back to the host, and the projection of decoded
//! records into them. Each state is built once per read and never mutated.

use crate::infisical::organizations::Organization;
use crate::infisical::projects::{Environment, Project};
use chrono::Utc;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Freshness identifier: wall-clock seconds at projection time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FreshnessId(i64);

impl FreshnessId {
    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for FreshnessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FreshnessId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Issues freshness identifiers that never go backwards, even if the wall
/// clock does.
#[derive(Debug)]
pub struct FreshnessClock {
    now: fn() -> i64,
    last: AtomicI64,
}

impl FreshnessClock {
    pub fn new() -> Self {
        Self::with_source(|| Utc::now().timestamp())
    }

    /// Clock reading seconds from `now`
    pub fn with_source(now: fn() -> i64) -> Self {
        Self {
            now,
            last: AtomicI64::new(0),
        }
    }

    pub fn stamp(&self) -> FreshnessId {
        let now = (self.now)().max(0);
        let prev = self.last.fetch_max(now, Ordering::SeqCst);
        FreshnessId(prev.max(now))
    }
}

impl Default for FreshnessClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Which organization fields end up in the state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrganizationFields {
    /// `id` and `name` only
    #[default]
    Canonical,
    /// Also `created_at`, `updated_at` and `v` when the API sent them
    WithAudit,
}

/// State of the organizations data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationsState {
    pub id: FreshnessId,
    pub organizations: Vec<OrganizationModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationModel {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<i64>,
}

/// State of the projects data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectsState {
    pub id: FreshnessId,
    pub organization_id: String,
    pub projects: Vec<ProjectModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectModel {
    pub id: String,
    pub name: String,
    pub environments: Vec<EnvironmentModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentModel {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl OrganizationModel {
    fn project(org: Organization, fields: OrganizationFields) -> Self {
        let mut model = Self {
            id: org.id,
            name: org.name,
            created_at: None,
            updated_at: None,
            v: None,
        };
        if fields == OrganizationFields::WithAudit {
            model.created_at = org.audit.created_at;
            model.updated_at = org.audit.updated_at;
            model.v = org.audit.version;
        }
        model
    }
}

impl From<Environment> for EnvironmentModel {
    fn from(env: Environment) -> Self {
        Self {
            id: env.id,
            name: env.name,
            slug: env.slug,
        }
    }
}

impl From<Project> for ProjectModel {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            environments: project.environments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Project decoded organizations into state
pub fn project_organizations(
    records: Vec<Organization>,
    fields: OrganizationFields,
    clock: &FreshnessClock,
) -> OrganizationsState {
    OrganizationsState {
        organizations: records
            .into_iter()
            .map(|org| OrganizationModel::project(org, fields))
            .collect(),
        id: clock.stamp(),
    }
}

/// Project decoded projects into state. `organization_id` is the id the
/// projects were fetched with, carried through unchanged.
pub fn project_projects(
    records: Vec<Project>,
    organization_id: &str,
    clock: &FreshnessClock,
) -> ProjectsState {
    ProjectsState {
        projects: records.into_iter().map(Into::into).collect(),
        organization_id: organization_id.to_string(),
        id: clock.stamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infisical::organizations::OrganizationAudit;
    use serde_json::json;

    fn org(id: &str, name: &str) -> Organization {
        Organization {
            id: id.to_string(),
            name: name.to_string(),
            audit: OrganizationAudit {
                created_at: Some("2023-01-15T10:30:00.000Z".to_string()),
                updated_at: None,
                version: Some(0),
            },
        }
    }

    static REWINDING_NOW: AtomicI64 = AtomicI64::new(1_800_000_000);

    fn rewinding_now() -> i64 {
        REWINDING_NOW.fetch_sub(60, Ordering::SeqCst)
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let clock = FreshnessClock::with_source(rewinding_now);
        let first = clock.stamp();
        let second = clock.stamp();
        let third = clock.stamp();
        assert_eq!(first.as_secs(), 1_800_000_000);
        assert_eq!(second, first);
        assert_eq!(third, first);
    }

    #[test]
    fn test_clock_clamps_negative_time() {
        let clock = FreshnessClock::with_source(|| -5);
        assert_eq!(clock.stamp().to_string(), "0");
    }

    #[test]
    fn test_wall_clock_stamp_is_recent() {
        let before = Utc::now().timestamp();
        let stamp = FreshnessClock::new().stamp();
        assert!(stamp.as_secs() >= before);
    }

    #[test]
    fn test_empty_input_still_populates_state() {
        let clock = FreshnessClock::with_source(|| 42);
        let state = project_organizations(Vec::new(), OrganizationFields::Canonical, &clock);

        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"id": "42", "organizations": []})
        );

        let state = project_projects(Vec::new(), "org1", &clock);
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"id": "42", "organization_id": "org1", "projects": []})
        );
    }

    #[test]
    fn test_canonical_fields_drop_audit() {
        let clock = FreshnessClock::with_source(|| 1);
        let state = project_organizations(vec![org("o1", "Acme")], OrganizationFields::Canonical, &clock);

        assert_eq!(
            serde_json::to_value(&state.organizations[0]).unwrap(),
            json!({"id": "o1", "name": "Acme"})
        );
    }

    #[test]
    fn test_audit_fields_carried_when_requested() {
        let clock = FreshnessClock::with_source(|| 1);
        let state = project_organizations(vec![org("o1", "Acme")], OrganizationFields::WithAudit, &clock);

        assert_eq!(
            serde_json::to_value(&state.organizations[0]).unwrap(),
            json!({"id": "o1", "name": "Acme", "created_at": "2023-01-15T10:30:00.000Z", "v": 0})
        );
    }

    #[test]
    fn test_projects_keep_environment_order() {
        let clock = FreshnessClock::with_source(|| 1);
        let project = Project {
            id: "p1".to_string(),
            name: "Proj".to_string(),
            organization_id: "org1".to_string(),
            environments: ["prod", "dev"]
                .iter()
                .map(|slug| Environment {
                    id: format!("e-{slug}"),
                    name: slug.to_string(),
                    slug: slug.to_string(),
                })
                .collect(),
        };

        let state = project_projects(vec![project], "org1", &clock);
        let slugs: Vec<_> = state.projects[0]
            .environments
            .iter()
            .map(|e| e.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["prod", "dev"]);
    }
}
