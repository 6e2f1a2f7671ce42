//! The store/cache composition layer.
//!
//! [`CatalogCache`] owns every index, loads them once from the durable store
//! and keeps them consistent across mutations. Durable writes always happen
//! before index updates, so a store failure leaves the indexes untouched.

mod artists;
mod catalog_cache;
mod error;
mod indexes;
mod integrity;
mod library;
mod playback;
mod search;
mod settings;
mod songs;
mod state;
mod users;

pub use catalog_cache::CatalogCache;
pub use error::{CatalogError, CatalogResult};
pub use settings::{CacheSettings, HashBuckets};
pub use state::CacheState;
