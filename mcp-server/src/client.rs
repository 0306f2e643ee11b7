//! HTTP client for the Jira REST API
//!
//! Two surfaces are used: the classic REST API (`/rest/api/2`) and the agile
//! API (`/rest/agile/1.0`) for boards and sprints. Every call is a single GET;
//! bodies are passed through as untyped JSON.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use urlencoding::encode;

use crate::config::Config;
use crate::error::JiraError;

pub const DEFAULT_START_AT: u32 = 0;
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Client for both Jira API surfaces
#[derive(Clone)]
pub struct JiraClient {
    api: SurfaceClient,
    agile: SurfaceClient,
}

/// One pre-configured HTTP client bound to a base URL
#[derive(Clone)]
struct SurfaceClient {
    http: reqwest::Client,
    base_url: String,
}

/// Offset/limit pair passed through to paginated endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub start_at: u32,
    pub max_results: u32,
}

impl Page {
    pub fn new(start_at: Option<u32>, max_results: Option<u32>) -> Self {
        Self {
            start_at: start_at.unwrap_or(DEFAULT_START_AT),
            max_results: max_results.unwrap_or(DEFAULT_MAX_RESULTS),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Sprint state filter accepted by the agile API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Closed,
    Active,
    Future,
}

impl JiraClient {
    pub fn from_config(config: &Config) -> Result<Self, JiraError> {
        Self::new(&config.base_url(), &config.auth_token)
    }

    /// Create a client with explicit configuration
    ///
    /// `base_url` is the instance root (e.g., https://acme.atlassian.net).
    pub fn new(base_url: &str, auth_token: &str) -> Result<Self, JiraError> {
        let base_url = base_url.trim_end_matches('/');

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", auth_token))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            api: SurfaceClient::new(format!("{}/rest/api/2", base_url), headers.clone())?,
            agile: SurfaceClient::new(format!("{}/rest/agile/1.0", base_url), headers)?,
        })
    }

    #[cfg(test)]
    pub fn base_urls(&self) -> (&str, &str) {
        (&self.api.base_url, &self.agile.base_url)
    }

    // --- Issues ---

    pub async fn fetch_issue_details(
        &self,
        issue_id: &str,
        fields: Option<&str>,
        expand: Option<&str>,
    ) -> Result<Value, JiraError> {
        self.api
            .get_with_query(
                &format!("/issue/{}", encode(issue_id)),
                &IssueQuery { fields, expand },
            )
            .await
            .inspect_err(|e| error!(issue_id, error = %e, "Error fetching issue details"))
    }

    pub async fn fetch_issues_by_jql(
        &self,
        jql: &str,
        fields: Option<&str>,
        expand: Option<&str>,
        page: Page,
    ) -> Result<Value, JiraError> {
        let query = SearchQuery {
            jql,
            fields,
            expand,
            start_at: page.start_at,
            max_results: page.max_results,
        };
        self.api
            .get_with_query("/search", &query)
            .await
            .inspect_err(|e| error!(jql, error = %e, "Error fetching issues using JQL"))
    }

    pub async fn fetch_issue_transitions(&self, issue_id: &str) -> Result<Value, JiraError> {
        self.api
            .get(&format!("/issue/{}/transitions", encode(issue_id)))
            .await
            .and_then(|body| take_array(body, "transitions"))
            .inspect_err(|e| error!(issue_id, error = %e, "Error fetching issue transitions"))
    }

    pub async fn fetch_issue_comments(&self, issue_id: &str, page: Page) -> Result<Value, JiraError> {
        self.api
            .get_with_query(
                &format!("/issue/{}/comment", encode(issue_id)),
                &PageQuery {
                    start_at: page.start_at,
                    max_results: page.max_results,
                },
            )
            .await
            .and_then(|body| take_array(body, "comments"))
            .inspect_err(|e| error!(issue_id, error = %e, "Error fetching issue comments"))
    }

    // --- Users ---

    pub async fn fetch_assignable_users(&self, project: &str) -> Result<Value, JiraError> {
        self.api
            .get_with_query("/user/assignable/search", &UserQuery { project })
            .await
            .inspect_err(|e| error!(project, error = %e, "Error fetching users"))
    }

    // --- Projects ---

    pub async fn fetch_projects(&self) -> Result<Value, JiraError> {
        self.api
            .get("/project")
            .await
            .inspect_err(|e| error!(error = %e, "Error fetching projects"))
    }

    pub async fn fetch_project_components(&self, project_id: &str) -> Result<Value, JiraError> {
        self.api
            .get(&format!("/project/{}/components", encode(project_id)))
            .await
            .inspect_err(|e| error!(project_id, error = %e, "Error fetching components"))
    }

    pub async fn fetch_project_statuses(&self, project_id: &str) -> Result<Value, JiraError> {
        self.api
            .get(&format!("/project/{}/statuses", encode(project_id)))
            .await
            .inspect_err(|e| error!(project_id, error = %e, "Error fetching status"))
    }

    pub async fn fetch_project_issue_types(&self, project_id: &str) -> Result<Value, JiraError> {
        self.api
            .get(&format!("/project/{}/issuetypes", encode(project_id)))
            .await
            .inspect_err(|e| error!(project_id, error = %e, "Error fetching issue types"))
    }

    pub async fn fetch_project_versions(&self, project_id: &str) -> Result<Value, JiraError> {
        self.api
            .get(&format!("/project/{}/versions", encode(project_id)))
            .await
            .inspect_err(|e| error!(project_id, error = %e, "Error fetching versions"))
    }

    // --- Metadata ---

    pub async fn fetch_priorities(&self) -> Result<Value, JiraError> {
        self.api
            .get("/priority")
            .await
            .inspect_err(|e| error!(error = %e, "Error fetching priorities"))
    }

    pub async fn fetch_status_categories(&self) -> Result<Value, JiraError> {
        self.api
            .get("/statuscategory")
            .await
            .inspect_err(|e| error!(error = %e, "Error fetching status categories"))
    }

    // --- Agile ---

    /// Boards filtered by name and/or project. Returns the `values` array.
    pub async fn fetch_boards(
        &self,
        name: Option<&str>,
        project_key_or_id: Option<&str>,
    ) -> Result<Value, JiraError> {
        self.agile
            .get_with_query(
                "/board",
                &BoardQuery {
                    name,
                    project_key_or_id,
                },
            )
            .await
            .and_then(|body| take_array(body, "values"))
            .inspect_err(|e| {
                error!(?name, ?project_key_or_id, error = %e, "Error fetching boards")
            })
    }

    pub async fn fetch_board_sprints(
        &self,
        board_id: &str,
        state: Option<SprintState>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Value, JiraError> {
        self.agile
            .get_with_query(
                &format!("/board/{}/sprint", encode(board_id)),
                &SprintQuery {
                    state,
                    start_date,
                    end_date,
                },
            )
            .await
            .inspect_err(|e| error!(board_id, error = %e, "Error fetching sprints"))
    }
}

impl SurfaceClient {
    fn new(base_url: String, headers: HeaderMap) -> Result<Self, JiraError> {
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { http, base_url })
    }

    async fn get(&self, path: &str) -> Result<Value, JiraError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).send().await?;
        handle_response(response).await
    }

    async fn get_with_query<Q: Serialize>(&self, path: &str, query: &Q) -> Result<Value, JiraError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).query(query).send().await?;
        handle_response(response).await
    }
}

async fn handle_response(response: reqwest::Response) -> Result<Value, JiraError> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| JiraError::Deserialization(e.to_string()))
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(JiraError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull a named array out of a response envelope
fn take_array(mut body: Value, field: &'static str) -> Result<Value, JiraError> {
    match body.get_mut(field).map(Value::take) {
        Some(array @ Value::Array(_)) => Ok(array),
        _ => Err(JiraError::MissingField { field }),
    }
}

// --- Query Types ---

#[derive(Debug, Serialize)]
struct IssueQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expand: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery<'a> {
    jql: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expand: Option<&'a str>,
    start_at: u32,
    max_results: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageQuery {
    start_at: u32,
    max_results: u32,
}

#[derive(Debug, Serialize)]
struct UserQuery<'a> {
    project: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_key_or_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SprintQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<SprintState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<&'a str>,
}
