use serde::Serialize;
use std::fmt;

/// Lifecycle of the cache. Only `Ready` serves operations; `Failed` is
/// terminal and means the startup load did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheState::Uninitialized => "uninitialized",
            CacheState::Loading => "loading",
            CacheState::Ready => "ready",
            CacheState::Failed => "failed",
        };
        f.write_str(name)
    }
}
