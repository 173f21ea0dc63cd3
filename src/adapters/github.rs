use crate::config::GitHubConfig;
use crate::domain::model::{DispatchOutcome, DispatchRequest, WorkflowRun};
use crate::domain::ports::SourceControl;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::{redirect, Client, StatusCode};
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "2022-11-28";
const WEB_BASE_URL: &str = "https://github.com";
const USER_AGENT: &str = concat!("chat-relay/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct DispatchBody<'a> {
    event_type: &'a str,
    client_payload: &'a DispatchRequest,
}

#[derive(Deserialize)]
struct RunsPage {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

/// GitHub REST client for `repository_dispatch` and Actions runs.
pub struct GitHubClient {
    client: Client,
    /// Log downloads answer with a redirect we want to read, not follow.
    no_redirect_client: Client,
    api_url: String,
    repository: String,
    event_type: String,
}

impl GitHubClient {
    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token)).map_err(|_| {
            RelayError::InvalidConfigValueError {
                field: "GH_TOKEN".to_string(),
                value: "<redacted>".to_string(),
                reason: "Token contains characters not allowed in a header".to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers.clone())
            .build()?;
        let no_redirect_client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            no_redirect_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repository: config.repository.clone(),
            event_type: config.event_type.clone(),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.repository, path)
    }

    fn run_page_url(&self, run_id: u64) -> String {
        format!("{}/{}/actions/runs/{}", WEB_BASE_URL, self.repository, run_id)
    }
}

async fn api_error(response: reqwest::Response) -> RelayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RelayError::ApiError {
        service: "GitHub",
        status,
        body,
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchOutcome> {
        let url = self.repo_url("dispatches");
        tracing::debug!(
            "Dispatching '{}' for {}/{} (show_logs={})",
            self.event_type,
            request.org,
            request.repo,
            request.show_logs
        );

        let response = self
            .client
            .post(&url)
            .json(&DispatchBody {
                event_type: &self.event_type,
                client_payload: request,
            })
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(DispatchOutcome::Accepted);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Dispatch answered {}: {}", status, body);
        Ok(DispatchOutcome::Rejected { status, body })
    }

    async fn recent_runs(&self, count: u32) -> Result<Vec<WorkflowRun>> {
        let response = self
            .client
            .get(self.repo_url("actions/runs"))
            .query(&[("per_page", count)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let page: RunsPage = response.json().await?;
        tracing::debug!("Fetched {} workflow runs", page.workflow_runs.len());
        Ok(page.workflow_runs)
    }

    async fn run_logs_url(&self, run_id: u64) -> Result<String> {
        let response = self
            .no_redirect_client
            .get(self.repo_url(&format!("actions/runs/{}/logs", run_id)))
            .send()
            .await?;

        if let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
        {
            return Ok(location.to_string());
        }

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(api_error(response).await);
        }

        tracing::warn!(
            run_id,
            status = status.as_u16(),
            "No logs redirect, falling back to the run page"
        );
        Ok(self.run_page_url(run_id))
    }
}
