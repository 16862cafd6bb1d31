//! Optional RON configuration file. Every field is optional and only
//! overrides the matching [`FetchSettings`] default.
//!
//! ```ron
//! (
//!     api_base_url: "https://api.chzzk.naver.com/service/v1",
//!     request_timeout_secs: 30,
//!     log_file: "harvester.log",
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_engine::FetchSettings;
use ron::extensions::Extensions;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub api_base_url: Option<String>,
    pub web_base_url: Option<String>,
    pub user_agent: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_page_bytes: Option<u64>,
    pub listing_page_size: Option<u32>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Plain values are accepted for optional fields, no `Some(..)` needed.
    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)
    }

    pub fn apply(&self, mut settings: FetchSettings) -> FetchSettings {
        if let Some(url) = &self.api_base_url {
            settings.api_base_url = url.clone();
        }
        if let Some(url) = &self.web_base_url {
            settings.web_base_url = url.clone();
        }
        if let Some(agent) = &self.user_agent {
            settings.user_agent = agent.clone();
        }
        if let Some(secs) = self.connect_timeout_secs {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(bytes) = self.max_page_bytes {
            settings.max_page_bytes = bytes;
        }
        if let Some(size) = self.listing_page_size {
            settings.listing_page_size = size;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() {
        let config = ConfigFile::parse("()").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.apply(FetchSettings::default()), FetchSettings::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = ConfigFile::parse(
            r#"(
                web_base_url: "http://localhost:8080",
                request_timeout_secs: 30,
                listing_page_size: 50,
            )"#,
        )
        .unwrap();
        let settings = config.apply(FetchSettings::default());

        assert_eq!(settings.web_base_url, "http://localhost:8080");
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.listing_page_size, 50);
        assert_eq!(settings.api_base_url, FetchSettings::default().api_base_url);
    }

    #[test]
    fn load_reports_path_on_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.ron");
        assert!(matches!(
            ConfigFile::load(&missing),
            Err(ConfigError::Read { path, .. }) if path == missing
        ));

        let broken = dir.path().join("broken.ron");
        fs::write(&broken, "(api_base_url: ").unwrap();
        assert!(matches!(
            ConfigFile::load(&broken),
            Err(ConfigError::Parse { .. })
        ));

        let valid = dir.path().join("valid.ron");
        fs::write(&valid, "(log_file: \"harvester.log\")").unwrap();
        let config = ConfigFile::load(&valid).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("harvester.log")));
    }

    #[test]
    fn unknown_field_is_an_error() {
        assert!(ConfigFile::parse("(api_base: \"x\")").is_err());
    }
}
