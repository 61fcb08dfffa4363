use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Process configuration, read once at startup and treated as constant for
/// the process lifetime.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub http: HttpConfig,
    /// Maximum accepted content size in bytes. Longer submissions are
    /// silently truncated.
    pub size_limit: usize,
    /// When set, requests arriving for any other host are permanently
    /// redirected to this base URL.
    #[serde(default)]
    pub force_domain: Option<String>,
    /// Directory holding the page templates and static assets.
    #[serde(default = "default_assets")]
    pub assets: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HttpConfig {
    pub port: u16,
}

fn default_assets() -> PathBuf {
    PathBuf::from("static")
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw).context("failed to parse config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config: Config = toml::from_str(
            r#"
            size_limit = 65536
            force_domain = "http://paste.example.com"
            assets = "server/static"

            [db]
            path = "database"

            [http]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.size_limit, 65536);
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.db.path, PathBuf::from("database"));
        assert_eq!(
            config.force_domain.as_deref(),
            Some("http://paste.example.com")
        );
        assert_eq!(config.assets, PathBuf::from("server/static"));
    }

    #[test]
    fn optional_keys_have_defaults() {
        let config: Config =
            toml::from_str("size_limit = 1024\n\n[db]\npath = \"db\"\n\n[http]\nport = 3000\n")
                .unwrap();

        assert!(config.force_domain.is_none());
        assert_eq!(config.assets, PathBuf::from("static"));
    }
}
