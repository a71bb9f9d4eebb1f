//! MCP (Model Context Protocol) server implementation.
//!
//! Provides MCP tools for running FutureHouse jobs:
//! - `submit_task` - Run a query on any job and wait for the answer
//! - `submit_task_with_config` - Same, with a custom agent configuration
//! - `continue_task` - Ask a follow-up on an earlier task
//! - `list_available_jobs` - List the jobs the platform offers
//! - `create_agent_config` - Validate an agent configuration
//! - `quick_search`, `deep_search`, `precedent_search` - Fixed-job shortcuts
//! - `request_phoenix_smiles` - Chemistry requests to PHOENIX
//!
//! and one resource, `resource://futurehouse/api-info`.

use std::collections::HashMap;

use axum::Router;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Content, ListResourcesResult, PaginatedRequestParam,
        RawResource, ReadResourceRequestParam, ReadResourceResult, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
    ErrorData as McpError, RoleServer, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use futurehouse_core::{AgentConfig, JobDescriptor, JobName, TaskResult};

use crate::dispatcher::{preview, ConfigOverrides, Dispatcher};
use crate::error::DispatchError;

/// URI of the usage/info resource.
pub const API_INFO_URI: &str = "resource://futurehouse/api-info";

/// MCP server for FutureHouse jobs.
#[derive(Clone)]
pub struct FutureHouseMcpServer {
    dispatcher: Dispatcher,
    credential_hint: String,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Parameter Types
// ============================================================================

/// Parameters for submit_task.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SubmitTaskParams {
    /// Job to run: crow, falcon, owl or phoenix.
    pub job_name: String,

    /// The question or task to submit.
    pub query: String,
}

/// Parameters for submit_task_with_config.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SubmitTaskWithConfigParams {
    /// Job to run: crow, falcon, owl or phoenix.
    pub job_name: String,

    /// The question or task to submit.
    pub query: String,

    /// Agent type (default: SimpleAgent).
    #[serde(default)]
    pub agent_type: Option<String>,

    /// Model for the agent (default: gpt-4o).
    #[serde(default)]
    pub model: Option<String>,

    /// Sampling temperature between 0.0 and 1.0 (default: 0.0).
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Maximum reasoning steps, at least 1 (default: 10).
    #[serde(default)]
    pub max_steps: Option<i64>,

    /// Additional agent parameters.
    #[serde(default)]
    pub agent_kwargs: Option<HashMap<String, Value>>,
}

/// Parameters for continue_task.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ContinueTaskParams {
    /// ID of the task to continue.
    pub previous_task_id: String,

    /// Follow-up question.
    pub query: String,

    /// Job of the original task.
    pub job_name: String,
}

/// Parameters for create_agent_config.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateAgentConfigParams {
    /// Agent type (default: SimpleAgent).
    #[serde(default)]
    pub agent_type: Option<String>,

    /// Model for the agent (default: gpt-4o).
    #[serde(default)]
    pub model: Option<String>,

    /// Sampling temperature between 0.0 and 1.0 (default: 0.0).
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Maximum reasoning steps, at least 1 (default: 10).
    #[serde(default)]
    pub max_steps: Option<i64>,

    /// Additional agent parameters.
    #[serde(default)]
    pub additional_kwargs: Option<HashMap<String, Value>>,
}

/// Parameters for the fixed-job tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// The question or task to submit.
    pub query: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// Result of list_available_jobs.
#[derive(Debug, Serialize)]
pub struct ListJobsResult {
    pub available_jobs: Vec<JobDescriptor>,
    pub count: usize,
}

/// Result of create_agent_config.
#[derive(Debug, Serialize)]
pub struct AgentConfigResult {
    pub agent_config: AgentConfig,

    /// Wire form sent to the platform.
    pub runtime_config: Value,

    pub usage: &'static str,
}

fn to_kwargs(kwargs: Option<HashMap<String, Value>>) -> Option<Map<String, Value>> {
    kwargs.map(|map| map.into_iter().collect())
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Turn a dispatcher outcome into a tool result. Failures stay in-band.
fn task_outcome(tool: &str, outcome: Result<TaskResult, DispatchError>) -> CallToolResult {
    match outcome {
        Ok(result) => {
            info!(
                tool,
                task_id = %result.task_id,
                status = %result.status,
                "Tool call completed"
            );
            CallToolResult::success(vec![Content::text(to_json(&result))])
        }
        Err(e) => failure(tool, e),
    }
}

fn failure(tool: &str, err: DispatchError) -> CallToolResult {
    warn!(tool, code = err.code(), error = %err, "Tool call failed");
    CallToolResult::error(vec![Content::text(to_json(&err.to_failure()))])
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router(router = general_router)]
impl FutureHouseMcpServer {
    /// Submit a task to a job and run it until completion.
    #[tool(description = "Submit a task to a FutureHouse job (crow, falcon, owl, phoenix) and run it until completion")]
    async fn submit_task(
        &self,
        Parameters(params): Parameters<SubmitTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(job = %params.job_name, query = %preview(&params.query), "submit_task");
        let outcome = self
            .dispatcher
            .submit_task(&params.job_name, &params.query)
            .await;
        Ok(task_outcome("submit_task", outcome))
    }

    /// Submit a task with a custom runtime configuration.
    #[tool(description = "Submit a task to a FutureHouse job with custom agent configuration (model, temperature, max_steps, agent_type, agent_kwargs)")]
    async fn submit_task_with_config(
        &self,
        Parameters(params): Parameters<SubmitTaskWithConfigParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            job = %params.job_name,
            model = ?params.model,
            query = %preview(&params.query),
            "submit_task_with_config"
        );
        let overrides = ConfigOverrides {
            agent_type: params.agent_type,
            model: params.model,
            temperature: params.temperature,
            max_steps: params.max_steps,
            agent_kwargs: to_kwargs(params.agent_kwargs),
        };
        let outcome = self
            .dispatcher
            .submit_task_with_config(&params.job_name, &params.query, overrides)
            .await;
        Ok(task_outcome("submit_task_with_config", outcome))
    }

    /// Continue a previous task with a follow-up question.
    #[tool(description = "Continue a previous task with a follow-up question. Requires the previous task ID and its job name.")]
    async fn continue_task(
        &self,
        Parameters(params): Parameters<ContinueTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            previous_task_id = %params.previous_task_id,
            job = %params.job_name,
            "continue_task"
        );
        let outcome = self
            .dispatcher
            .continue_task(&params.previous_task_id, &params.query, &params.job_name)
            .await;
        Ok(task_outcome("continue_task", outcome))
    }

    /// List the jobs the platform offers.
    #[tool(description = "List all available job names in the FutureHouse platform")]
    async fn list_available_jobs(&self) -> Result<CallToolResult, McpError> {
        let jobs = self.dispatcher.list_available_jobs();
        info!(job_count = jobs.len(), "Listed jobs via MCP");

        let result = ListJobsResult {
            count: jobs.len(),
            available_jobs: jobs,
        };
        Ok(CallToolResult::success(vec![Content::text(to_json(&result))]))
    }

    /// Validate an agent configuration without submitting anything.
    #[tool(description = "Create and validate a custom agent configuration for use with submit_task_with_config")]
    async fn create_agent_config(
        &self,
        Parameters(params): Parameters<CreateAgentConfigParams>,
    ) -> Result<CallToolResult, McpError> {
        let overrides = ConfigOverrides {
            agent_type: params.agent_type,
            model: params.model,
            temperature: params.temperature,
            max_steps: params.max_steps,
            agent_kwargs: to_kwargs(params.additional_kwargs),
        };

        match self.dispatcher.create_agent_config(overrides) {
            Ok(config) => {
                info!(
                    agent_type = %config.agent_type,
                    model = %config.model,
                    "Created agent config via MCP"
                );
                let result = AgentConfigResult {
                    runtime_config: config.to_runtime_config(),
                    agent_config: config,
                    usage: "Pass these fields to submit_task_with_config",
                };
                Ok(CallToolResult::success(vec![Content::text(to_json(&result))]))
            }
            Err(e) => Ok(failure("create_agent_config", e)),
        }
    }

    /// Quick literature search on CROW.
    #[tool(description = "Quick literature search with concise, cited answers (runs the crow job)")]
    async fn quick_search(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.dispatcher.submit_job(JobName::Crow, &params.query).await;
        Ok(task_outcome("quick_search", outcome))
    }

    /// Deep literature review on FALCON.
    #[tool(description = "Deep literature review producing a long-form report (runs the falcon job)")]
    async fn deep_search(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.dispatcher.submit_job(JobName::Falcon, &params.query).await;
        Ok(task_outcome("deep_search", outcome))
    }

    /// Precedent search on OWL.
    #[tool(description = "Precedent search: has anyone done this before? (runs the owl job)")]
    async fn precedent_search(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.dispatcher.submit_job(JobName::Owl, &params.query).await;
        Ok(task_outcome("precedent_search", outcome))
    }
}

#[tool_router(router = chemistry_router)]
impl FutureHouseMcpServer {
    /// Chemistry requests on PHOENIX.
    #[tool(description = "Request PHOENIX to generate novel compounds with SMILES notation for drug discovery")]
    async fn request_phoenix_smiles(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .dispatcher
            .submit_job(JobName::Phoenix, &params.query)
            .await;
        Ok(task_outcome("request_phoenix_smiles", outcome))
    }
}

impl FutureHouseMcpServer {
    /// Create a server exposing every tool.
    pub fn new(dispatcher: Dispatcher, api_key: &str) -> Self {
        Self {
            dispatcher,
            credential_hint: mask_credential(api_key),
            tool_router: Self::general_router() + Self::chemistry_router(),
        }
    }

    /// Create a server exposing only `request_phoenix_smiles`.
    pub fn phoenix_only(dispatcher: Dispatcher, api_key: &str) -> Self {
        Self {
            dispatcher,
            credential_hint: mask_credential(api_key),
            tool_router: Self::chemistry_router(),
        }
    }

    /// Markdown served as the api-info resource.
    fn api_info(&self) -> String {
        let jobs: String = self
            .dispatcher
            .list_available_jobs()
            .iter()
            .map(|job| format!("- `{}` ({}): {}\n", job.name, job.remote_id, job.specialty))
            .collect();
        let poll = self.dispatcher.poll_settings();

        format!(
            "# FutureHouse MCP Server\n\n\
             ## Authentication\n\
             - Bearer API key: {key}\n\n\
             ## Available Jobs\n\
             {jobs}\n\
             ## Task Flow\n\
             1. Submit a query with a job name (`submit_task`)\n\
             2. Optionally override the agent (`submit_task_with_config`)\n\
             3. The call waits until the task finishes, polling every {interval}s for at most {max_wait}s\n\
             4. Ask follow-ups with `continue_task` and the returned `task_id`\n\n\
             ## Agent Configuration\n\
             - `agent_type` (default SimpleAgent)\n\
             - `model` (default gpt-4o)\n\
             - `temperature` between 0.0 and 1.0 (default 0.0)\n\
             - `max_steps` at least 1 (default 10)\n\
             - `agent_kwargs`: extra agent parameters\n",
            key = self.credential_hint,
            jobs = jobs,
            interval = poll.interval.as_secs(),
            max_wait = poll.max_wait.as_secs(),
        )
    }
}

/// First 8 characters of the key followed by an ellipsis.
fn mask_credential(api_key: &str) -> String {
    let head: String = api_key.chars().take(8).collect();
    format!("{}...", head)
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl ServerHandler for FutureHouseMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: rmcp::model::Implementation {
                name: "futurehouse-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "FutureHouse MCP Server - Run FutureHouse research agents as tools. \
                 Use list_available_jobs to see the jobs, submit_task to ask a question, \
                 and continue_task with the returned task_id for follow-ups."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resource = RawResource::new(API_INFO_URI, "api-info".to_string()).no_annotation();
        Ok(ListResourcesResult::with_all_items(vec![resource]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        if uri == API_INFO_URI {
            Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(self.api_info(), uri)],
            })
        } else {
            Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            ))
        }
    }
}

// ============================================================================
// HTTP Server Setup
// ============================================================================

/// Create an axum Router for the MCP HTTP server.
///
/// Handles MCP requests over the Streamable HTTP transport at `/mcp`.
pub fn create_mcp_router(server: FutureHouseMcpServer, ct: CancellationToken) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            cancellation_token: ct,
            ..Default::default()
        },
    );

    info!("MCP server initialized with Streamable HTTP transport");

    Router::new().nest_service("/mcp", service)
}
