//! MCP tool implementations.
//!
//! This module contains all tools exposed by the page-cache server.

pub mod cache;
