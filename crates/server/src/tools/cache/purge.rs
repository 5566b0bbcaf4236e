//! page_cleanup and page_clear tool implementations.
//!
//! Purges expired generations, or every generation.

use pagecache_core::{Error, Paginator};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the purge tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PagePurgeOutput {
    /// Number of rows deleted.
    pub deleted: u64,
}

fn purge_result(deleted: u64) -> Result<CallToolResult, McpError> {
    let output = PagePurgeOutput { deleted };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Implementation of the page_cleanup tool.
pub async fn cleanup_impl(paginator: &Paginator) -> Result<CallToolResult, McpError> {
    let deleted = paginator.cache().cleanup().await?;
    purge_result(deleted)
}

/// Implementation of the page_clear tool.
pub async fn clear_impl(paginator: &Paginator) -> Result<CallToolResult, McpError> {
    let deleted = paginator.cache().clear().await?;
    purge_result(deleted)
}
