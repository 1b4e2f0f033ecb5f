//! MCP server implementation.

use crate::context::Context;
use crate::models::{
    CheckAnomalyParams, FitBaselineParams, ImpactParams, LineageParams, ListMetricsParams,
};
use crate::tools::Tools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{
    ErrorData as McpError, handler::server::ServerHandler, tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// The lineage MCP server.
///
/// Serves one catalog, loaded before the server starts.
#[derive(Clone)]
pub struct LineageMcpServer {
    context: Arc<Context>,
    tools: Arc<Tools>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl LineageMcpServer {
    /// List metric definitions.
    #[tool(
        description = "List metric definitions with their owners and direct dependencies. Optionally filter by kind (counter, gauge, ratio, composite) or owner."
    )]
    async fn list_metrics(
        &self,
        Parameters(params): Parameters<ListMetricsParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .list_metrics(params.kind.as_deref(), params.owner.as_deref())
        {
            Ok(metrics) => Ok(CallToolResult::success(vec![Content::json(metrics)?])),
            Err(e) => Err(McpError::invalid_params(e.to_string(), None)),
        }
    }

    /// Upstream and downstream lineage of one metric.
    #[tool(
        description = "Show every metric a metric is derived from (upstream) and every metric derived from it (downstream). Unknown metrics return empty lists."
    )]
    async fn lineage(
        &self,
        Parameters(params): Parameters<LineageParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.tools.lineage(&params.metric);
        Ok(CallToolResult::success(vec![Content::json(response)?]))
    }

    /// Estimate which metrics a change affects.
    #[tool(
        description = "Estimate the blast radius of a change: the related metrics plus everything downstream of them. The severity score is the number of impacted metrics."
    )]
    async fn impact(
        &self,
        Parameters(params): Parameters<ImpactParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .impact(
                params.description,
                params.related_metrics,
                params.kind.as_deref(),
                params.service,
                params.event_id.as_deref(),
            )
            .await
        {
            Ok(report) => Ok(CallToolResult::success(vec![Content::json(report)?])),
            Err(e) => Err(McpError::invalid_params(e.to_string(), None)),
        }
    }

    /// Fit a metric's anomaly baseline.
    #[tool(
        description = "Learn a mean and standard deviation for a metric from historical samples, replacing any earlier baseline for that metric."
    )]
    async fn fit_baseline(
        &self,
        Parameters(params): Parameters<FitBaselineParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .fit_baseline(&params.metric, &params.samples, params.threshold)
            .await
        {
            Ok(baseline) => Ok(CallToolResult::success(vec![Content::json(baseline)?])),
            Err(e) => Err(McpError::invalid_params(e.to_string(), None)),
        }
    }

    /// Score a value against a fitted baseline.
    #[tool(
        description = "Check whether a value is anomalous for a metric using its fitted baseline. Metrics without a baseline are never flagged."
    )]
    async fn check_anomaly(
        &self,
        Parameters(params): Parameters<CheckAnomalyParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.tools.check_anomaly(&params.metric, params.value).await;
        Ok(CallToolResult::success(vec![Content::json(response)?]))
    }

    /// Export the dependency graph.
    #[tool(
        description = "Export the full metric dependency graph as node-link JSON (nodes plus source -> target links)."
    )]
    async fn export_graph(&self) -> Result<CallToolResult, McpError> {
        let graph = self.tools.export_graph();
        Ok(CallToolResult::success(vec![Content::json(graph)?]))
    }
}

impl LineageMcpServer {
    /// Create a server for a loaded context.
    #[must_use]
    pub fn new(context: Context) -> Self {
        let context = Arc::new(context);
        let tools = Arc::new(Tools::new(Arc::clone(&context)));

        Self {
            context,
            tools,
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the context.
    #[must_use]
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }
}

#[tool_handler]
impl ServerHandler for LineageMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "lineage-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Lineage MCP server for metric dependency analysis. Use list_metrics to see the catalog, lineage or impact to trace changes, and fit_baseline before check_anomaly."
                    .into(),
            ),
        }
    }
}
