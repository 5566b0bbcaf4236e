//! Core types and shared functionality for the page cache.
//!
//! This crate provides:
//! - Prefix capture over single-pass sequences
//! - Token-addressed page cache with TTL expiry
//! - SQLite page store
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod paginate;
pub mod prefix;
pub mod source;

pub use cache::{CacheDb, CacheEntry, PageStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use paginate::{CacheSettings, FirstPage, Page, PageCursor, PaginateCache, Paginator, StoredGeneration};
pub use prefix::PrefixCapture;
pub use source::{SecureRandom, SystemClock, TimeSource, TokenGenerator};
