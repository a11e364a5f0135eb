//! Data sources
//!
//! The read operations exposed to the host tool. Each read runs one straight
//! pipeline (fetch, decode, project) and either returns a complete state or
//! no state plus diagnostics.
//!
//! - [`organizations`] - `infisical_organizations`
//! - [`projects`] - `infisical_projects`
//! - [`state`] - Output shapes and projection

pub mod organizations;
pub mod projects;
pub mod state;

pub use organizations::{OrganizationsConfig, OrganizationsDataSource};
pub use projects::{ProjectsConfig, ProjectsDataSource};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ProviderError, Result};
use crate::infisical::decode::{self, Decoded, ResponseBody};
use crate::infisical::http::format_api_error;
use crate::provider::ProviderData;
use crate::schema::Schema;
use serde::de::DeserializeOwned;
use std::future::Future;

/// Result of one read
#[derive(Debug, Clone)]
pub struct ReadResponse<S> {
    /// Present only when the read succeeded
    pub state: Option<S>,
    pub diagnostics: Diagnostics,
}

impl<S> ReadResponse<S> {
    fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            state: None,
            diagnostics,
        }
    }
}

/// A data source as returned by the provider's factory list
#[derive(Debug, Clone)]
pub enum DataSource {
    Organizations(OrganizationsDataSource),
    Projects(ProjectsDataSource),
}

impl DataSource {
    pub fn type_name(&self, provider_type_name: &str) -> String {
        match self {
            Self::Organizations(_) => OrganizationsDataSource::type_name(provider_type_name),
            Self::Projects(_) => ProjectsDataSource::type_name(provider_type_name),
        }
    }

    pub fn schema(&self) -> Schema {
        match self {
            Self::Organizations(_) => OrganizationsDataSource::schema(),
            Self::Projects(_) => ProjectsDataSource::schema(),
        }
    }

    pub fn configure(&mut self, data: Option<&ProviderData>) {
        match self {
            Self::Organizations(ds) => ds.configure(data),
            Self::Projects(ds) => ds.configure(data),
        }
    }
}

fn unconfigured(subject: &str) -> Diagnostic {
    Diagnostic::error(
        "Unconfigured Data Source",
        format!(
            "Unable to read Infisical {subject}: the provider has not been configured. \
             Please report this issue to the provider developers."
        ),
    )
}

/// Turn a pipeline error into a diagnostic, adding a hint for HTTP statuses
fn error_diagnostic(err: &ProviderError, subject: &str) -> Diagnostic {
    let mut diag = err.to_diagnostic(subject);
    if matches!(err, ProviderError::Status { .. }) {
        diag.detail = format!("{}\n\n{}", diag.detail, format_api_error(err));
    }
    diag
}

/// Fetch and decode one collection.
///
/// Returns the decoded body, or `None` when any stage failed. A failed body
/// release is added as a warning and does not discard the records.
async fn fetch_collection<T, B, F>(
    fetch: F,
    resource: &'static str,
    subject: &str,
    diagnostics: &mut Diagnostics,
) -> Option<T>
where
    T: DeserializeOwned + Default,
    B: ResponseBody,
    F: Future<Output = Result<B>>,
{
    let body = match fetch.await {
        Ok(body) => body,
        Err(err) => {
            diagnostics.push(error_diagnostic(&err, subject));
            return None;
        }
    };

    let Decoded { records, release } = decode::decode::<T, B>(resource, body).await;

    if let Err(err) = &release {
        diagnostics.push(error_diagnostic(err, subject));
    }

    match records {
        Ok(records) => Some(records),
        Err(err) => {
            diagnostics.push(error_diagnostic(&err, subject));
            None
        }
    }
}
