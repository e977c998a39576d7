use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tessera_blocks::ContentDocument;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "tessera.config.json";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "TESSERA_CONFIG";

/// `chrono::Duration::seconds` panics above this
const MAX_PREVIEW_TTL_SECS: u64 = (i64::MAX / 1_000) as u64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid content file {path}: {source}")]
    Content {
        path: PathBuf,
        source: tessera_blocks::ModelError,
    },

    #[error("Invalid listen address {0}")]
    Address(String),
}

/// Tessera configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub host: String,

    pub port: u16,

    /// JSON document seeding the canonical content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_path: Option<String>,

    /// Presentation template used when the document names none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_template: Option<String>,

    pub preview_ttl_secs: u64,

    pub status_clear_ms: u64,

    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            content_path: None,
            default_template: None,
            preview_ttl_secs: 86_400,
            status_clear_ms: 3_000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load config from a directory. `TESSERA_CONFIG` takes precedence;
    /// a missing file yields the defaults.
    pub fn load(cwd: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => {
                let path = cwd.as_ref().join(DEFAULT_CONFIG_NAME);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }

    /// Absolute path to the seed content, relative paths resolved against `cwd`
    pub fn content_file(&self, cwd: impl AsRef<Path>) -> Option<PathBuf> {
        self.content_path.as_ref().map(|p| cwd.as_ref().join(p))
    }

    /// Seed document named by `contentPath`, or an empty document
    pub fn load_content(&self, cwd: impl AsRef<Path>) -> Result<ContentDocument, ConfigError> {
        let Some(path) = self.content_file(cwd) else {
            return Ok(ContentDocument::new());
        };
        let json = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        ContentDocument::from_json(&json).map_err(|source| ConfigError::Content { path, source })
    }

    /// Preview retention, capped at the largest span chrono can represent
    pub fn preview_ttl(&self) -> chrono::Duration {
        let secs = self.preview_ttl_secs.min(MAX_PREVIEW_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    pub fn status_clear_after(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "port": 8080,
            "contentPath": "content.json",
            "defaultTemplate": "classic",
            "previewTtlSecs": 60
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.content_path.as_deref(), Some("content.json"));
        assert_eq!(config.default_template.as_deref(), Some("classic"));
        assert_eq!(config.preview_ttl(), chrono::Duration::seconds(60));
        assert_eq!(config.status_clear_ms, 3_000);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "port": 4000 }"#).unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);

        let missing = Config::from_file(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_content() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        assert!(config.load_content(dir.path()).unwrap().pages.is_empty());

        let config = Config {
            content_path: Some("content.json".to_string()),
            ..Config::default()
        };
        std::fs::write(
            dir.path().join("content.json"),
            r#"{ "pages": { "home": { "id": "root", "type": "page" } } }"#,
        )
        .unwrap();
        let doc = config.load_content(dir.path()).unwrap();
        assert!(doc.page("home").is_some());

        std::fs::write(dir.path().join("content.json"), "not json").unwrap();
        assert!(matches!(
            config.load_content(dir.path()),
            Err(ConfigError::Content { .. })
        ));
    }

    #[test]
    fn test_listen_addr() {
        let config = Config::default();
        assert_eq!(config.listen_addr().unwrap().port(), 3030);

        let bad = Config {
            host: "not a host".to_string(),
            ..Config::default()
        };
        assert!(matches!(bad.listen_addr(), Err(ConfigError::Address(_))));
    }

    #[test]
    fn test_huge_preview_ttl_is_capped() {
        let config: Config = serde_json::from_str(r#"{ "previewTtlSecs": 18446744073709551615 }"#).unwrap();
        assert_eq!(config.preview_ttl(), chrono::Duration::seconds(i64::MAX / 1_000));

        let config = Config {
            preview_ttl_secs: 10_000_000_000_000_000,
            ..Config::default()
        };
        assert_eq!(config.preview_ttl(), chrono::Duration::seconds(i64::MAX / 1_000));
    }

    #[test]
    fn test_round_trip_omits_unset_paths() {
        let json = Config::default().to_json();
        assert!(!json.contains("contentPath"));
        assert!(json.contains("\"previewTtlSecs\": 86400"));
    }
}
