use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub history_capacity: Option<usize>,
    pub queue_capacity: Option<usize>,
    pub search_limit: Option<usize>,

    // Feature configs
    pub catalog: Option<CatalogFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogFileConfig {
    pub popular_limit: Option<usize>,
    pub related_limit: Option<usize>,
    /// Artwork used for songs without one, `{id}` expands to the song id.
    pub artwork_placeholder: Option<String>,
    pub song_buckets: Option<usize>,
    pub artist_buckets: Option<usize>,
    pub user_buckets: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
history_capacity = 25

[catalog]
artwork_placeholder = "https://img.example/{{id}}.png"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.history_capacity, Some(25));
        assert!(config.db_path.is_none());
        let catalog = config.catalog.unwrap();
        assert_eq!(
            catalog.artwork_placeholder.as_deref(),
            Some("https://img.example/{id}.png")
        );
        assert!(catalog.song_buckets.is_none());
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "history_capacity = \"lots\"").unwrap();
        assert!(FileConfig::load(file.path()).is_err());
        assert!(FileConfig::load(Path::new("/nonexistent/melodia.toml")).is_err());
    }
}
