//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::cache::{PageGetParams, PageStoreParams, cleanup_impl, clear_impl, get_impl, store_impl};

use pagecache_core::Paginator;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for the page cache.
#[derive(Clone)]
pub struct PageCacheServer {
    tool_router: ToolRouter<Self>,
    paginator: Paginator,
    page_size: usize,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PageCacheServer {
    /// Create a new server handler.
    pub fn new(paginator: Paginator, page_size: usize) -> Self {
        Self { tool_router: Self::tool_router(), paginator, page_size }
    }

    /// Cache a result sequence and return its first page.
    #[tool(
        description = "Cache a sequence of JSON items under a URL. Returns the first page, the total count, and a cursor for the next page."
    )]
    async fn page_store(&self, params: Parameters<PageStoreParams>) -> Result<CallToolResult, McpError> {
        store_impl(&self.paginator, self.page_size, params.0).await
    }

    /// Fetch a later page of a cached sequence.
    #[tool(
        description = "Fetch the page a cursor points at. Returns an empty page if the cached sequence expired or the cursor is unknown."
    )]
    async fn page_get(&self, params: Parameters<PageGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.paginator, params.0).await
    }

    /// Drop cached sequences older than the TTL.
    #[tool(description = "Delete cached pages older than the configured TTL. Returns the number of rows deleted.")]
    async fn page_cleanup(&self) -> Result<CallToolResult, McpError> {
        cleanup_impl(&self.paginator).await
    }

    /// Drop every cached sequence.
    #[tool(description = "Delete every cached page regardless of age. Returns the number of rows deleted.")]
    async fn page_clear(&self) -> Result<CallToolResult, McpError> {
        clear_impl(&self.paginator).await
    }
}

impl ServerHandler for PageCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "page-cache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
