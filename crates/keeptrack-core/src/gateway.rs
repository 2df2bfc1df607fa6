//! Remote data gateway
//!
//! Translates project operations into REST calls against the KeepTrack API
//! and maps HTTP / transport failures into user-facing domain errors. The
//! gateway never retries; callers decide what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::project::Project;

/// Default API base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const RETRIEVE_FAILED: &str =
    "There was an error retrieving the project(s). Please try again.";
const UPDATE_FAILED: &str = "There was an error updating the project. Please try again.";

/// Async CRUD operations against the project collection.
///
/// Implemented by [`HttpProjectGateway`] for production and by in-memory
/// fakes in controller tests.
#[async_trait]
pub trait ProjectGateway: Send + Sync {
    /// Fetch the full project collection, ordered by `order` ascending.
    async fn fetch_all(&self) -> Result<Vec<Project>>;

    /// Fetch a single project by id.
    async fn fetch_one(&self, id: i64) -> Result<Project>;

    /// Replace-style update of a project. Returns the server's normalized
    /// record.
    async fn update(&self, project: &Project) -> Result<Project>;
}

/// Translate a non-success HTTP status into a user-facing message.
/// `fallback` carries the operation-specific generic message.
fn translate_status(status: StatusCode, fallback: &str) -> String {
    match status.as_u16() {
        401 => "Please login again.".to_string(),
        403 => "You do not have permission to view the project(s).".to_string(),
        _ => fallback.to_string(),
    }
}

/// REST gateway over `reqwest`.
///
/// Authentication rides on the transport (session cookie attached by the
/// client); the gateway itself carries no credentials.
#[derive(Debug, Clone)]
pub struct HttpProjectGateway {
    http_client: HttpClient,
    base_url: String,
}

/// Builder for creating an [`HttpProjectGateway`]
pub struct HttpProjectGatewayBuilder {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for HttpProjectGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProjectGatewayBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout_secs: None,
        }
    }

    /// Set the API base URL (defaults to localhost)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the gateway
    pub fn build(self) -> Result<HttpProjectGateway> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(
                self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpProjectGateway {
            http_client,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

impl HttpProjectGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        HttpProjectGatewayBuilder::new().base_url(base_url).build()
    }

    pub fn builder() -> HttpProjectGatewayBuilder {
        HttpProjectGatewayBuilder::new()
    }

    fn projects_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    /// Check the response status, mapping non-success codes to a translated
    /// message with the operation-specific fallback.
    fn check_status(response: &reqwest::Response, fallback: &str) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        warn!(
            status = status.as_u16(),
            url = %response.url(),
            "server http error"
        );
        Err(Error::Remote {
            status: status.as_u16(),
            message: translate_status(status, fallback),
        })
    }
}

#[async_trait]
impl ProjectGateway for HttpProjectGateway {
    async fn fetch_all(&self) -> Result<Vec<Project>> {
        debug!(url = %self.projects_url(), "fetching all projects");
        let response = self
            .http_client
            .get(self.projects_url())
            .query(&[("_sort", "order")])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "client error fetching projects");
                Error::Transport(RETRIEVE_FAILED.to_string())
            })?;

        Self::check_status(&response, RETRIEVE_FAILED)?;

        response
            .json::<Vec<Project>>()
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to decode project list");
                Error::Transport(RETRIEVE_FAILED.to_string())
            })
    }

    async fn fetch_one(&self, id: i64) -> Result<Project> {
        let url = format!("{}/{}", self.projects_url(), id);
        debug!(%url, "fetching project");
        let response = self.http_client.get(&url).send().await.map_err(|e| {
            warn!(error = %e, "client error fetching project");
            Error::Transport(RETRIEVE_FAILED.to_string())
        })?;

        Self::check_status(&response, RETRIEVE_FAILED)?;

        response.json::<Project>().await.map_err(|e| {
            warn!(error = %e, "failed to decode project");
            Error::Transport(RETRIEVE_FAILED.to_string())
        })
    }

    async fn update(&self, project: &Project) -> Result<Project> {
        // Identity is required for a replace-style update; fail before any
        // network traffic. Status validity is enforced by the type at the
        // input edge (ProjectStatus::from_str).
        if !project.has_id() {
            return Err(Error::Validation(
                "Cannot update a project without an id.".to_string(),
            ));
        }

        let url = format!("{}/{}", self.projects_url(), project.id);
        debug!(%url, status = %project.status, "updating project");
        let response = self
            .http_client
            .put(&url)
            .json(project)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "client error updating project");
                Error::Transport(UPDATE_FAILED.to_string())
            })?;

        Self::check_status(&response, UPDATE_FAILED)?;

        response.json::<Project>().await.map_err(|e| {
            warn!(error = %e, "failed to decode updated project");
            Error::Transport(UPDATE_FAILED.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectStatus;
    use wiremock::matchers::{body_json_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> HttpProjectGateway {
        HttpProjectGateway::builder()
            .base_url(server.uri())
            .timeout_secs(5)
            .build()
            .expect("gateway builds")
    }

    #[tokio::test]
    async fn fetch_all_requests_order_sorted_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .and(query_param("_sort", "order"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Alpha", "status": "todo", "order": 0},
                {"id": 2, "name": "Beta", "status": "todo", "order": 1}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let projects = gateway_for(&server).fetch_all().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].id, 1);
        assert_eq!(projects[1].status, ProjectStatus::Todo);
        // Defaults applied to the partial payload
        assert!(projects[0].is_active);
    }

    #[tokio::test]
    async fn fetch_all_translates_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = gateway_for(&server).fetch_all().await.unwrap_err();
        match err {
            Error::Remote { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Please login again.");
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_all_translates_403() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = gateway_for(&server).fetch_all().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "You do not have permission to view the project(s)."
        );
    }

    #[tokio::test]
    async fn fetch_all_uses_generic_message_for_other_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = gateway_for(&server).fetch_all().await.unwrap_err();
        assert_eq!(err.to_string(), RETRIEVE_FAILED);
        assert!(matches!(err, Error::Remote { status: 500, .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_distinguishable_from_http_errors() {
        // Nothing listens on this port; the connection is refused.
        let gateway = HttpProjectGateway::builder()
            .base_url("http://127.0.0.1:1")
            .timeout_secs(2)
            .build()
            .unwrap();

        let err = gateway.fetch_all().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.to_string(), RETRIEVE_FAILED);
    }

    #[tokio::test]
    async fn update_puts_full_record_and_returns_normalized_body() {
        let server = MockServer::start().await;
        let project = Project {
            id: 2,
            name: "Beta".to_string(),
            status: ProjectStatus::Done,
            order: 0,
            ..Project::default()
        };
        let body = serde_json::to_string(&project).unwrap();
        Mock::given(method("PUT"))
            .and(path("/projects/2"))
            .and(body_json_string(&body))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 2, "name": "Beta", "status": "done", "order": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updated = gateway_for(&server).update(&project).await.unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(updated.status, ProjectStatus::Done);
    }

    #[tokio::test]
    async fn update_uses_update_specific_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/projects/2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let project = Project {
            id: 2,
            ..Project::default()
        };
        let err = gateway_for(&server).update(&project).await.unwrap_err();
        assert_eq!(err.to_string(), UPDATE_FAILED);
    }

    #[tokio::test]
    async fn update_without_id_fails_fast_without_a_request() {
        let server = MockServer::start().await;
        // expect(0) flags any request reaching the server at drop time
        Mock::given(method("PUT"))
            .and(path("/projects/0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let project = Project::new("Unsaved");
        let err = gateway_for(&server).update(&project).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn contract_date_serializes_as_rfc3339() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/projects/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 3, "name": "Gamma", "contractSignedOn": "2024-03-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let project = Project {
            id: 3,
            name: "Gamma".to_string(),
            contract_signed_on: Some("2024-03-01T00:00:00Z".parse().unwrap()),
            ..Project::default()
        };
        let updated = gateway_for(&server).update(&project).await.unwrap();
        assert_eq!(
            updated.contract_signed_on,
            project.contract_signed_on
        );
    }
}
