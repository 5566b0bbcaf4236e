//! page-cache server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use pagecache_core::{AppConfig, CacheDb, PaginateCache, Paginator};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod maintenance;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db_path = %config.db_path.display(), ttl_secs = config.ttl_secs, "Starting page-cache server on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let cache = PaginateCache::new(db, config.cache_settings());
    let cleanup = maintenance::spawn_cleanup(cache.clone(), config.cleanup_interval());

    let paginator = Paginator::new(cache).with_max_page_size(config.max_page_size);
    let handler = handler::PageCacheServer::new(paginator, config.page_size);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    cleanup.abort();

    Ok(())
}
