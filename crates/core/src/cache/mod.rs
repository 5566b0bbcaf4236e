//! SQLite-backed page store.
//!
//! This module provides the persisted side of the paginate cache using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - URL grouping by SHA-256 digest
//! - Automatic schema migrations
//! - WAL mode so page reads proceed while generations are written
//! - Age-based, per-generation, and full purges

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod pages;

pub use crate::Error;

pub use connection::CacheDb;
pub use pages::{CacheEntry, PageStore};
