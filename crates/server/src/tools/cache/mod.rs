//! Page cache MCP tools.
//!
//! This module provides tools for storing sequences and reading them back page by page.

pub mod get;
pub mod purge;
pub mod store;

pub use get::{PageGetParams, get_impl};
pub use purge::{cleanup_impl, clear_impl};
pub use store::{PageStoreParams, store_impl};
