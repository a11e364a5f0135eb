//! Integration tests for the read pipeline using wiremock
//!
//! These tests configure the provider against a mocked Infisical API and
//! verify headers, projection, and how failures turn into diagnostics.

use infisical_datasource::config::{ConfigValue, ProviderConfig};
use infisical_datasource::datasource::{
    OrganizationsConfig, OrganizationsDataSource, ProjectsConfig, ProjectsDataSource,
};
use infisical_datasource::diagnostics::Severity;
use infisical_datasource::provider::{InfisicalProvider, ProviderData};
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "st.test-token";

fn no_env() -> HashMap<&'static str, &'static str> {
    HashMap::new()
}

fn configure(host: &str) -> ProviderData {
    let config = ProviderConfig {
        host: ConfigValue::known(host),
        api_token: ConfigValue::known(TOKEN),
    };
    let response = InfisicalProvider::new().configure(&config, &no_env());
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    response.data.expect("provider should be configured")
}

fn organizations(data: &ProviderData) -> OrganizationsDataSource {
    let mut ds = OrganizationsDataSource::new();
    ds.configure(Some(data));
    ds
}

fn projects(data: &ProviderData) -> ProjectsDataSource {
    let mut ds = ProjectsDataSource::new();
    ds.configure(Some(data));
    ds
}

mod organizations_tests {
    use super::*;

    /// Every request carries the API key and JSON accept headers
    #[tokio::test]
    async fn test_read_organizations() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/users/me/organizations"))
            .and(header("X-API-Key", TOKEN))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [{"_id": "o1", "name": "Acme"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let response = organizations(&data)
            .read(&OrganizationsConfig::default())
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.state.expect("state should be set");
        assert!(state.id.to_string().parse::<u64>().is_ok());

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["organizations"], json!([{"id": "o1", "name": "Acme"}]));
    }

    #[tokio::test]
    async fn test_read_organizations_with_audit_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/users/me/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [
                    {
                        "_id": "o1",
                        "name": "Acme",
                        "createdAt": "2023-01-15T10:30:00.000Z",
                        "updatedAt": "2023-03-01T12:00:00.000Z",
                        "__v": 2
                    },
                    {"_id": "o2", "name": "Globex"}
                ]
            })))
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let state = organizations(&data)
            .read(&OrganizationsConfig {
                include_audit_fields: true,
            })
            .await
            .state
            .unwrap();

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value["organizations"],
            json!([
                {
                    "id": "o1",
                    "name": "Acme",
                    "created_at": "2023-01-15T10:30:00.000Z",
                    "updated_at": "2023-03-01T12:00:00.000Z",
                    "v": 2
                },
                {"id": "o2", "name": "Globex"}
            ])
        );
    }

    /// An empty body is "no data", not a decode failure
    #[tokio::test]
    async fn test_empty_body_is_empty_collection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/users/me/organizations"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let response = organizations(&data)
            .read(&OrganizationsConfig::default())
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.state.unwrap().organizations.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/users/me/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let response = organizations(&data)
            .read(&OrganizationsConfig::default())
            .await;

        assert!(response.state.is_none());
        let errors: Vec<_> = response.diagnostics.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].summary,
            "Unable to Decode Infisical Organizations for User"
        );
    }

    #[tokio::test]
    async fn test_401_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/users/me/organizations"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statusCode": 401,
                "message": "Invalid API key"
            })))
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let response = organizations(&data)
            .read(&OrganizationsConfig::default())
            .await;

        assert!(response.state.is_none());
        let diag = response.diagnostics.errors().next().unwrap();
        assert_eq!(diag.summary, "Unable to Read Infisical Organizations for User");
        assert!(diag.detail.contains("401"));
        assert!(diag.detail.contains("Authentication failed"));
        assert!(!diag.detail.contains(TOKEN));
    }

    /// Unreachable host fails the read without panicking
    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let data = configure(&uri);
        let response = organizations(&data)
            .read(&OrganizationsConfig::default())
            .await;

        assert!(response.state.is_none());
        assert!(response.diagnostics.has_error());
    }

    #[tokio::test]
    async fn test_sequential_reads_have_non_decreasing_ids() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/users/me/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [{"_id": "o1", "name": "Acme"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let ds = organizations(&data);
        let first = ds.read(&OrganizationsConfig::default()).await.state.unwrap();
        let second = ds.read(&OrganizationsConfig::default()).await.state.unwrap();

        let first: u64 = first.id.to_string().parse().unwrap();
        let second: u64 = second.id.to_string().parse().unwrap();
        assert!(second >= first);
    }
}

mod projects_tests {
    use super::*;

    #[tokio::test]
    async fn test_read_projects() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations/org1/workspaces"))
            .and(header("X-API-Key", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"workspaces":[{"_id":"p1","name":"Proj","organization":"org1","environments":[{"_id":"e1","name":"dev","slug":"dev"}]}]}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let response = projects(&data).read(&ProjectsConfig::new("org1")).await;

        assert!(response.diagnostics.is_empty());
        let state = response.state.unwrap();
        assert_eq!(state.organization_id, "org1");

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value["projects"],
            json!([{
                "id": "p1",
                "name": "Proj",
                "environments": [{"id": "e1", "name": "dev", "slug": "dev"}]
            }])
        );
    }

    #[tokio::test]
    async fn test_host_with_base_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/infisical/api/v2/organizations/org1/workspaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workspaces": []})))
            .expect(1)
            .mount(&server)
            .await;

        let data = configure(&format!("{}/infisical/", server.uri()));
        let state = projects(&data)
            .read(&ProjectsConfig::new("org1"))
            .await
            .state
            .unwrap();

        assert!(state.projects.is_empty());
        assert_eq!(state.organization_id, "org1");
    }

    #[tokio::test]
    async fn test_404_leaves_no_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations/missing/workspaces"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let response = projects(&data).read(&ProjectsConfig::new("missing")).await;

        assert!(response.state.is_none());
        let diag = response.diagnostics.errors().next().unwrap();
        assert_eq!(diag.summary, "Unable to Read Infisical Projects for User");
        assert_eq!(diag.severity, Severity::Error);
    }

    /// A failed read does not disturb a state produced earlier
    #[tokio::test]
    async fn test_failure_after_success_keeps_previous_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations/org1/workspaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "workspaces": [{"_id": "p1", "name": "Proj", "organization": "org1", "environments": []}]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations/org1/workspaces"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let data = configure(&server.uri());
        let ds = projects(&data);
        let first = ds.read(&ProjectsConfig::new("org1")).await.state.unwrap();
        let second = ds.read(&ProjectsConfig::new("org1")).await;

        assert!(second.state.is_none());
        assert_eq!(first.projects.len(), 1);
        assert_eq!(first.projects[0].id, "p1");
    }

    /// Organizations and projects reads can run at once on one client
    #[tokio::test]
    async fn test_concurrent_reads_share_client() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/users/me/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [{"_id": "o1", "name": "Acme"}, {"_id": "o2", "name": "Globex"}]
            })))
            .mount(&server)
            .await;

        for org in ["o1", "o2"] {
            Mock::given(method("GET"))
                .and(path(format!("/api/v2/organizations/{org}/workspaces")))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "workspaces": [{"_id": format!("{org}-p"), "name": "Proj", "organization": org}]
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let data = configure(&server.uri());
        let orgs_ds = organizations(&data);
        let projects_ds = projects(&data);
        let config_o1 = ProjectsConfig::new("o1");
        let config_o2 = ProjectsConfig::new("o2");
        let orgs_config = OrganizationsConfig::default();

        let (orgs, p1, p2) = tokio::join!(
            orgs_ds.read(&orgs_config),
            projects_ds.read(&config_o1),
            projects_ds.read(&config_o2),
        );

        assert_eq!(orgs.state.unwrap().organizations.len(), 2);
        assert_eq!(p1.state.unwrap().projects[0].id, "o1-p");
        assert_eq!(p2.state.unwrap().projects[0].id, "o2-p");
    }
}

mod configuration_tests {
    use super::*;

    /// A missing token stops before any request is sent
    #[tokio::test]
    async fn test_missing_token_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = ProviderConfig {
            host: ConfigValue::known(server.uri()),
            api_token: ConfigValue::Null,
        };
        let configured = InfisicalProvider::new().configure(&config, &no_env());
        assert!(configured.data.is_none());

        let diag = configured.diagnostics.errors().next().unwrap();
        assert_eq!(diag.attribute.as_deref(), Some("api_token"));

        // Reads on an unconfigured data source fail locally
        let mut ds = OrganizationsDataSource::new();
        ds.configure(configured.data.as_ref());
        let response = ds.read(&OrganizationsConfig::default()).await;
        assert!(response.state.is_none());

        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_token_makes_no_request() {
        let server = MockServer::start().await;

        let config = ProviderConfig {
            host: ConfigValue::known(server.uri()),
            api_token: ConfigValue::Unknown,
        };
        let env: HashMap<&str, &str> = [("INFISICAL_API_TOKEN", "st.env")].into_iter().collect();
        let configured = InfisicalProvider::new().configure(&config, &env);

        assert!(configured.data.is_none());
        let diag = configured.diagnostics.errors().next().unwrap();
        assert_eq!(diag.summary, "Unknown Infisical API Token");

        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
    }
}
