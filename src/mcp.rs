//! MCP (Model Context Protocol) server for agronomy.
//!
//! Exposes the recommenders and advisory lookups as MCP tools so that AI
//! assistants (Claude Desktop, Cursor, etc.) can invoke them over stdio
//! JSON-RPC.
//!
//! Start with: `agronomy --mcp`

use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::AgronomyError;
use crate::ops;

// ── Parameter structs ───────────────────────────────────────────────────────
// Each struct maps 1:1 with a CLI subcommand. `JsonSchema` is required by
// rmcp so that the tool's input schema is auto-generated for the AI client.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CropParams {
    /// JSON array of soil/climate readings. Keys: nitrogen, phosphorous,
    /// potassium, temperature, humidity, ph, rainfall. Values may be numbers
    /// or numeric strings.
    pub records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FertilizerParams {
    /// JSON array of readings. Keys: nitrogen, phosphorous, potassium,
    /// temperature, humidity, moisture, soilType, cropType.
    pub records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SoilParams {
    /// JSON array of soil readings. Keys: nitrogen, phosphorous, potassium,
    /// ph, moisture.
    pub records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PriceParams {
    /// Crop name, case-insensitive. Omit to list every known crop.
    pub crop: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClassifyParams {
    /// JSON array of records; keys are the table's feature and tag names.
    pub records: Vec<serde_json::Value>,
    /// Inline reference table (name, weights, penalties, centroids).
    pub table: Option<serde_json::Value>,
    /// Builtin table name: "crop" or "fertilizer" (default: "crop").
    #[serde(default = "default_builtin")]
    pub builtin: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WeatherCodeParams {
    /// WMO weather interpretation code.
    pub code: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TableParams {
    /// Builtin table name: "crop" or "fertilizer".
    pub name: String,
}

// ── Default helpers ─────────────────────────────────────────────────────────

fn default_builtin() -> String {
    "crop".into()
}

// ── Shared helpers ──────────────────────────────────────────────────────────

fn json_text(v: &serde_json::Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn to_mcp_error(e: AgronomyError) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

// ── MCP Server ──────────────────────────────────────────────────────────────

/// The MCP server struct. Holds only the auto-generated tool router.
#[derive(Clone)]
pub struct AgronomyMcp {
    #[allow(dead_code)] // accessed at runtime by the #[tool_router] macro
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AgronomyMcp {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    // ── recommend_crop ──────────────────────────────────────────────────

    #[tool(
        name = "recommend_crop",
        description = "Recommend a crop for each soil/climate reading by weighted nearest-centroid match over 22 crops. Returns the records with `_crop` and `_distance` columns. A missing reading makes `_distance` null."
    )]
    async fn recommend_crop(
        &self,
        params: Parameters<CropParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || ops::op_crop(&p.records))
            .await
            .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?
            .map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── recommend_fertilizer ────────────────────────────────────────────

    #[tool(
        name = "recommend_fertilizer",
        description = "Recommend a fertilizer for each reading by weighted nearest-centroid match with soil and crop type penalties. Returns the records with `_fertilizer` and `_distance` columns."
    )]
    async fn recommend_fertilizer(
        &self,
        params: Parameters<FertilizerParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || ops::op_fertilizer(&p.records))
            .await
            .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?
            .map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── analyze_soil ────────────────────────────────────────────────────

    #[tool(
        name = "analyze_soil",
        description = "Score soil health (0-100) from pH, nitrogen and moisture. Returns the records with `_soil_score`, `_soil_status` (Healthy, Moderate, Poor) and `_suggestions` columns."
    )]
    async fn analyze_soil(
        &self,
        params: Parameters<SoilParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || ops::op_soil(&p.records))
            .await
            .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── price_outlook ───────────────────────────────────────────────────

    #[tool(
        name = "price_outlook",
        description = "Market price (per quintal), trend and five-step forecast for a crop. Unknown crops report N/A with a spelling suggestion when one is close."
    )]
    async fn price_outlook(
        &self,
        params: Parameters<PriceParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = match params.0.crop {
            Some(crop) => ops::op_price(&crop),
            None => ops::op_price_all(),
        };
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── classify ────────────────────────────────────────────────────────

    #[tool(
        name = "classify",
        description = "Nearest-centroid classification against an inline reference table or a builtin one (crop, fertilizer). Returns the records with `_label` and `_distance` columns."
    )]
    async fn classify(
        &self,
        params: Parameters<ClassifyParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || {
            let table =
                ops::resolve_table(p.table.as_ref(), None, Some(p.builtin.as_str()))?;
            Ok::<_, AgronomyError>(ops::op_classify(&p.records, &table))
        })
        .await
        .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?
        .map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── weather_code ────────────────────────────────────────────────────

    #[tool(
        name = "weather_code",
        description = "Describe a WMO weather interpretation code, e.g. 63 → \"Moderate rain\"."
    )]
    async fn weather_code(
        &self,
        params: Parameters<WeatherCodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = ops::op_weather_code(params.0.code);
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── table ───────────────────────────────────────────────────────────

    #[tool(
        name = "table",
        description = "Export a builtin reference table (crop or fertilizer) as JSON: weights, penalties and centroids."
    )]
    async fn table(&self, params: Parameters<TableParams>) -> Result<CallToolResult, McpError> {
        let result = ops::op_table(&params.0.name).map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }
}

impl Default for AgronomyMcp {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerHandler for AgronomyMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Agronomy advisory engine. Tools: recommend_crop, recommend_fertilizer, \
                 analyze_soil, price_outlook, classify, weather_code, table. \
                 Pass JSON records of field readings for the batch tools."
                    .into(),
            ),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "agronomy".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Agronomy Advisor".into()),
                description: Some(
                    "Nearest-centroid crop and fertilizer recommendations".into(),
                ),
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: Default::default(),
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_context = ToolCallContext::new(self, request, context);
        async move { self.tool_router.call(tool_context).await }
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tool_router.get(name).cloned()
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Start the MCP server on stdio. Called from `cli.rs` when `--mcp` is passed.
pub async fn serve_stdio() -> Result<(), Box<dyn std::error::Error>> {
    let server = AgronomyMcp::new();
    let transport = rmcp::transport::io::stdio();
    let service = server.serve(transport).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP serve error");
    })?;
    service.waiting().await?;
    Ok(())
}
