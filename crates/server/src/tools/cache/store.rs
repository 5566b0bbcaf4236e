//! page_store tool implementation.
//!
//! Caches a result sequence and answers with its first page.

use pagecache_core::{Error, PageCursor, Paginator};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for the page_store tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageStoreParams {
    /// URL the sequence belongs to.
    pub url: String,

    /// The full result sequence.
    pub items: Vec<Value>,

    /// Elements in the first page and each following page (default: server page size).
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Output from the page_store tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageStoreOutput {
    /// The first page.
    pub items: Vec<Value>,

    /// Total number of elements, absent when the sequence could not be cached.
    pub total: Option<u64>,

    /// Cursor for the next page, absent when there is none.
    pub next: Option<PageCursor>,
}

/// Implementation of the page_store tool.
pub async fn store_impl(
    paginator: &Paginator, default_page_size: usize, params: PageStoreParams,
) -> Result<CallToolResult, McpError> {
    if params.url.is_empty() {
        return Err(Error::InvalidInput("url must not be empty".to_string()).into());
    }

    let page_size = params.page_size.unwrap_or(default_page_size);
    let first = paginator.first_page(&params.url, params.items, page_size).await;

    let output = PageStoreOutput { items: first.items, total: first.total, next: first.next };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
