//! page_get tool implementation.
//!
//! Retrieves the page a cursor points at.

use pagecache_core::{Error, Page, PageCursor, Paginator};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for the page_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageGetParams {
    /// URL the sequence was stored under.
    pub url: String,

    /// Cursor returned by page_store or a previous page_get.
    pub cursor: PageCursor,
}

/// Output from the page_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageGetOutput {
    /// Elements of the page; empty if the generation is unknown or expired.
    pub items: Vec<Value>,

    /// Cursor for the following page.
    pub next: Option<PageCursor>,
}

/// Implementation of the page_get tool.
pub async fn get_impl(paginator: &Paginator, params: PageGetParams) -> Result<CallToolResult, McpError> {
    let Page { items, next } = paginator.page::<Value>(&params.url, &params.cursor).await?;

    let output = PageGetOutput { items, next };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize page: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
