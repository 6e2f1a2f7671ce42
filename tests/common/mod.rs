//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{loaded_cache, ARTIST_1_ID};
//!
//! #[test]
//! fn test_get_artist() {
//!     let (cache, _dir) = loaded_cache();
//!     assert!(cache.get_artist(ARTIST_1_ID).is_ok());
//! }
//! ```
#![allow(dead_code)]

mod constants;
mod failing_db;
mod fixtures;

pub use constants::*;
pub use failing_db::FailingDb;
pub use fixtures::{create_test_catalog, loaded_cache, open_cache, open_failing_cache};
