//! Jira MCP Server implementation
//!
//! Each tool maps onto exactly one `JiraClient` call. Failures never reach the
//! transport: they are logged and answered with a fixed message inside a
//! normal tool result.

use crate::client::{JiraClient, Page, SprintState};
use crate::config::Config;
use crate::error::JiraError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{
    handler::server::tool::ToolRouter,
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

/// Jira MCP Server
///
/// Read-only tools over the Jira REST and agile APIs.
#[derive(Clone)]
pub struct JiraServer {
    client: JiraClient,
    tool_router: ToolRouter<Self>,
}

impl JiraServer {
    pub fn from_config(config: &Config) -> Result<Self, JiraError> {
        Ok(Self::new(JiraClient::from_config(config)?))
    }

    pub fn new(client: JiraClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }
}

/// What a tool call produced, before it is wrapped for the transport
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Payload(Value),
    Failure(&'static str),
}

impl ToolOutcome {
    /// Log a failed call under `tool` and `subject`, keeping only the fixed
    /// `failure` text for the caller.
    fn from_result(
        tool: &str,
        subject: Option<&str>,
        result: Result<Value, JiraError>,
        failure: &'static str,
    ) -> Self {
        match result {
            Ok(value) => ToolOutcome::Payload(value),
            Err(e) => {
                error!(tool, ?subject, error = %e, "Tool call failed");
                ToolOutcome::Failure(failure)
            }
        }
    }

    /// Both variants become a success envelope with one text block.
    fn into_call_result(self) -> CallToolResult {
        let text = match self {
            ToolOutcome::Payload(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
            ToolOutcome::Failure(message) => message.to_string(),
        };
        CallToolResult::success(vec![Content::text(text)])
    }
}

fn respond(
    tool: &str,
    subject: Option<&str>,
    result: Result<Value, JiraError>,
    failure: &'static str,
) -> Result<CallToolResult, McpError> {
    Ok(ToolOutcome::from_result(tool, subject, result, failure).into_call_result())
}

// --- Tool Parameter Types ---

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetailsParams {
    /// Issue key or id (e.g., "PROJ-123")
    pub issue_key: String,
    /// Comma-separated list of fields to return
    #[serde(default)]
    pub fields: Option<String>,
    /// Comma-separated list of entities to expand (e.g., "changelog")
    #[serde(default)]
    pub expand: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JqlParams {
    /// JQL query (e.g., "project = PROJ AND status = Open")
    pub jql: String,
    /// Comma-separated list of fields to return
    #[serde(default)]
    pub fields: Option<String>,
    /// Comma-separated list of entities to expand
    #[serde(default)]
    pub expand: Option<String>,
    /// Index of the first result (default 0)
    #[serde(default)]
    pub start_at: Option<u32>,
    /// Maximum number of results (default 50)
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectParams {
    /// Project key or id
    pub project: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdParams {
    /// Project key or id
    pub project_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardsByProjectParams {
    /// Project key or id the boards belong to
    pub project_id_or_key: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardsByNameParams {
    /// Board name to filter by
    pub board_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SprintsParams {
    /// Board id
    pub board_id: String,
    /// Sprint state filter: "closed", "active", or "future"
    #[serde(default)]
    pub state: Option<SprintState>,
    /// Only sprints starting on or after this date
    #[serde(default)]
    pub start_date: Option<String>,
    /// Only sprints ending on or before this date
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueIdParams {
    /// Issue key or id
    pub issue_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentsParams {
    /// Issue key or id
    pub issue_id: String,
    /// Index of the first comment (default 0)
    #[serde(default)]
    pub start_at: Option<u32>,
    /// Maximum number of comments (default 50)
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[tool_router]
impl JiraServer {
    // === Issues ===

    #[tool(
        name = "get-jira-issue-details-by-key",
        description = "Fetch Jira issue details by key"
    )]
    async fn issue_details(
        &self,
        params: Parameters<IssueDetailsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .client
            .fetch_issue_details(
                &params.0.issue_key,
                params.0.fields.as_deref(),
                params.0.expand.as_deref(),
            )
            .await;
        respond(
            "get-jira-issue-details-by-key",
            Some(params.0.issue_key.as_str()),
            result,
            "Error fetching issue",
        )
    }

    #[tool(
        name = "get-jira-issues-by-jql",
        description = "Fetch Jira issues matching a JQL query. Paginate with startAt and maxResults."
    )]
    async fn issues_by_jql(&self, params: Parameters<JqlParams>) -> Result<CallToolResult, McpError> {
        let page = Page::new(params.0.start_at, params.0.max_results);
        let result = self
            .client
            .fetch_issues_by_jql(
                &params.0.jql,
                params.0.fields.as_deref(),
                params.0.expand.as_deref(),
                page,
            )
            .await;
        respond(
            "get-jira-issues-by-jql",
            Some(params.0.jql.as_str()),
            result,
            "Error fetching issues",
        )
    }

    #[tool(
        name = "get-jira-issue-transitions",
        description = "Fetch the workflow transitions available for a Jira issue"
    )]
    async fn issue_transitions(
        &self,
        params: Parameters<IssueIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.client.fetch_issue_transitions(&params.0.issue_id).await;
        respond(
            "get-jira-issue-transitions",
            Some(params.0.issue_id.as_str()),
            result,
            "Error fetching transitions",
        )
    }

    #[tool(
        name = "get-jira-issue-comments",
        description = "Fetch comments on a Jira issue. Paginate with startAt and maxResults."
    )]
    async fn issue_comments(
        &self,
        params: Parameters<CommentsParams>,
    ) -> Result<CallToolResult, McpError> {
        let page = Page::new(params.0.start_at, params.0.max_results);
        let result = self
            .client
            .fetch_issue_comments(&params.0.issue_id, page)
            .await;
        respond(
            "get-jira-issue-comments",
            Some(params.0.issue_id.as_str()),
            result,
            "Error fetching comments",
        )
    }

    // === Projects ===

    #[tool(name = "get-jira-projects", description = "Fetch Jira projects")]
    async fn projects(&self) -> Result<CallToolResult, McpError> {
        let result = self.client.fetch_projects().await;
        respond("get-jira-projects", None, result, "Error fetching projects")
    }

    #[tool(
        name = "get-jira-users-in-project",
        description = "Fetch Jira users assignable in a project"
    )]
    async fn users_in_project(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.client.fetch_assignable_users(&params.0.project).await;
        respond(
            "get-jira-users-in-project",
            Some(params.0.project.as_str()),
            result,
            "Error fetching users",
        )
    }

    #[tool(
        name = "get-jira-components-in-project",
        description = "Fetch Jira components in a project"
    )]
    async fn components_in_project(
        &self,
        params: Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .client
            .fetch_project_components(&params.0.project_id)
            .await;
        respond(
            "get-jira-components-in-project",
            Some(params.0.project_id.as_str()),
            result,
            "Error fetching components",
        )
    }

    #[tool(
        name = "get-jira-status-in-project",
        description = "Fetch Jira statuses in a project, grouped by issue type"
    )]
    async fn status_in_project(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.client.fetch_project_statuses(&params.0.project).await;
        respond(
            "get-jira-status-in-project",
            Some(params.0.project.as_str()),
            result,
            "Error fetching status",
        )
    }

    #[tool(
        name = "get-jira-issue-types-in-project",
        description = "Fetch Jira issue types in a project"
    )]
    async fn issue_types_in_project(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .client
            .fetch_project_issue_types(&params.0.project)
            .await;
        respond(
            "get-jira-issue-types-in-project",
            Some(params.0.project.as_str()),
            result,
            "Error fetching issue types",
        )
    }

    #[tool(
        name = "get-jira-versions-in-project",
        description = "Fetch Jira versions (releases) in a project"
    )]
    async fn versions_in_project(
        &self,
        params: Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .client
            .fetch_project_versions(&params.0.project_id)
            .await;
        respond(
            "get-jira-versions-in-project",
            Some(params.0.project_id.as_str()),
            result,
            "Error fetching versions",
        )
    }

    // === Metadata ===

    #[tool(name = "get-jira-priorities", description = "Fetch Jira priorities")]
    async fn priorities(&self) -> Result<CallToolResult, McpError> {
        let result = self.client.fetch_priorities().await;
        respond("get-jira-priorities", None, result, "Error fetching priorities")
    }

    #[tool(
        name = "get-jira-status-categories",
        description = "Fetch Jira status categories (To Do, In Progress, Done)"
    )]
    async fn status_categories(&self) -> Result<CallToolResult, McpError> {
        let result = self.client.fetch_status_categories().await;
        respond(
            "get-jira-status-categories",
            None,
            result,
            "Error fetching status categories",
        )
    }

    // === Boards & Sprints ===

    #[tool(
        name = "get-jira-boards-using-project-id-or-project-key",
        description = "Fetch Jira boards in a project"
    )]
    async fn boards_by_project(
        &self,
        params: Parameters<BoardsByProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .client
            .fetch_boards(None, Some(params.0.project_id_or_key.as_str()))
            .await;
        respond(
            "get-jira-boards-using-project-id-or-project-key",
            Some(params.0.project_id_or_key.as_str()),
            result,
            "Error fetching boards",
        )
    }

    #[tool(
        name = "get-jira-boards-using-board-name",
        description = "Fetch Jira boards by board name"
    )]
    async fn boards_by_name(
        &self,
        params: Parameters<BoardsByNameParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .client
            .fetch_boards(Some(params.0.board_name.as_str()), None)
            .await;
        respond(
            "get-jira-boards-using-board-name",
            Some(params.0.board_name.as_str()),
            result,
            "Error fetching boards",
        )
    }

    #[tool(
        name = "get-jira-sprints-in-board",
        description = "Fetch Jira sprints in a board, optionally filtered by state and dates"
    )]
    async fn sprints_in_board(
        &self,
        params: Parameters<SprintsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .client
            .fetch_board_sprints(
                &params.0.board_id,
                params.0.state,
                params.0.start_date.as_deref(),
                params.0.end_date.as_deref(),
            )
            .await;
        respond(
            "get-jira-sprints-in-board",
            Some(params.0.board_id.as_str()),
            result,
            "Error fetching sprints",
        )
    }
}

#[tool_handler]
impl ServerHandler for JiraServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "jira-mcp".into(),
                title: Some("Jira MCP Server".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                r#"Jira - read-only access to projects, issues, boards, and sprints

ISSUES:
- 'get-jira-issue-details-by-key' - One issue by key
- 'get-jira-issues-by-jql' - Search with JQL (startAt/maxResults, default 0/50)
- 'get-jira-issue-transitions' / 'get-jira-issue-comments'

PROJECTS:
- 'get-jira-projects', then components, statuses, issue types, versions,
  and assignable users for a project

AGILE:
- Find boards by project or name, then 'get-jira-sprints-in-board'

Failed calls return a short error message instead of data."#
                    .into(),
            ),
        }
    }
}
