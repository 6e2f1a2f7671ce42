//! Melodia Catalog Server Library
//!
//! In-memory music catalog (songs, artists, users, libraries, play history)
//! kept consistent with a durable SQLite store.

pub mod cache;
pub mod catalog;
pub mod catalog_store;
pub mod config;
pub mod index;
pub mod sqlite_persistence;
pub mod structures;

// Re-export commonly used types for convenience
pub use cache::{CacheSettings, CacheState, CatalogCache, CatalogError, CatalogResult};
pub use catalog_store::{CatalogDb, SqliteCatalogDb};
