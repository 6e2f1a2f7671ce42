mod file_config;

pub use file_config::{CatalogFileConfig, FileConfig};

use crate::cache::{CacheSettings, HashBuckets};
use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_POPULAR_LIMIT: usize = 10;
pub const DEFAULT_RELATED_LIMIT: usize = 5;
pub const DEFAULT_ARTWORK_PLACEHOLDER: &str = "https://picsum.photos/seed/song-{id}/400";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub history_capacity: usize,
    pub queue_capacity: usize,
    pub search_limit: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_path: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub history_capacity: usize,
    pub playback_queue_capacity: usize,
    pub default_search_limit: usize,
    pub default_popular_limit: usize,
    pub default_related_limit: usize,
    pub artwork_placeholder: String,
    pub hash_buckets: HashBuckets,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = match file.db_path {
            Some(path) => PathBuf::from(path),
            None => match &cli.db_path {
                Some(path) => path.clone(),
                None => bail!("db_path must be specified via CLI or config file"),
            },
        };
        if db_path.is_dir() {
            bail!("Catalog database path is a directory: {:?}", db_path);
        }

        let history_capacity = file.history_capacity.unwrap_or(cli.history_capacity);
        let playback_queue_capacity = file.queue_capacity.unwrap_or(cli.queue_capacity);
        if history_capacity == 0 {
            bail!("history_capacity must be greater than zero");
        }
        if playback_queue_capacity == 0 {
            bail!("queue_capacity must be greater than zero");
        }

        let catalog = file.catalog.unwrap_or_default();
        let defaults = HashBuckets::default();
        let hash_buckets = HashBuckets {
            songs: catalog.song_buckets.unwrap_or(defaults.songs).max(1),
            artists: catalog.artist_buckets.unwrap_or(defaults.artists).max(1),
            users: catalog.user_buckets.unwrap_or(defaults.users).max(1),
        };

        Ok(Self {
            db_path,
            history_capacity,
            playback_queue_capacity,
            default_search_limit: file.search_limit.unwrap_or(cli.search_limit),
            default_popular_limit: catalog.popular_limit.unwrap_or(DEFAULT_POPULAR_LIMIT),
            default_related_limit: catalog.related_limit.unwrap_or(DEFAULT_RELATED_LIMIT),
            artwork_placeholder: catalog
                .artwork_placeholder
                .unwrap_or_else(|| DEFAULT_ARTWORK_PLACEHOLDER.to_string()),
            hash_buckets,
        })
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            history_capacity: self.history_capacity,
            playback_queue_capacity: self.playback_queue_capacity,
            default_search_limit: self.default_search_limit,
            default_popular_limit: self.default_popular_limit,
            default_related_limit: self.default_related_limit,
            artwork_placeholder: self.artwork_placeholder.clone(),
            hash_buckets: self.hash_buckets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with_db(dir: &TempDir) -> CliConfig {
        CliConfig {
            db_path: Some(dir.path().join("catalog.db")),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            history_capacity: 30,
            queue_capacity: 5,
            search_limit: 8,
            ..cli_with_db(&temp_dir)
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_path, temp_dir.path().join("catalog.db"));
        assert_eq!(config.history_capacity, 30);
        assert_eq!(config.playback_queue_capacity, 5);
        assert_eq!(config.default_search_limit, 8);
        assert_eq!(config.default_popular_limit, DEFAULT_POPULAR_LIMIT);
        assert_eq!(config.default_related_limit, DEFAULT_RELATED_LIMIT);
        assert_eq!(config.artwork_placeholder, DEFAULT_ARTWORK_PLACEHOLDER);
        assert_eq!(config.hash_buckets, HashBuckets::default());
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: Some(PathBuf::from("/should/be/overridden.db")),
            history_capacity: 30,
            ..Default::default()
        };
        let file_config = FileConfig {
            db_path: Some(temp_dir.path().join("toml.db").to_string_lossy().to_string()),
            history_capacity: Some(12),
            catalog: Some(CatalogFileConfig {
                related_limit: Some(3),
                song_buckets: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.db_path, temp_dir.path().join("toml.db"));
        assert_eq!(config.history_capacity, 12);
        assert_eq!(config.playback_queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.default_related_limit, 3);
        assert_eq!(config.hash_buckets.songs, 1);
    }

    #[test]
    fn test_resolve_missing_db_path_error() {
        let result = AppConfig::resolve(&CliConfig::default(), None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("db_path"));
    }

    #[test]
    fn test_resolve_db_path_is_directory_error() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_resolve_zero_capacity_error() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            history_capacity: 0,
            ..cli_with_db(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_cache_settings_carry_resolved_values() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(&cli_with_db(&temp_dir), None).unwrap();
        let settings = config.cache_settings();
        assert_eq!(settings.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(settings.playback_queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(settings.artwork_placeholder, DEFAULT_ARTWORK_PLACEHOLDER);
    }
}
