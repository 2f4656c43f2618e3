use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::{ImporterError, Result};

pub const DEFAULT_USER_AGENT: &str = "RatingImporter/1.0";
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the remote archive: where the index lives, where files land,
/// and how long each kind of request may take.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub catalog_url: String,
    pub download_dir: PathBuf,
    pub catalog_timeout: Duration,
    pub download_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            catalog_url: String::new(),
            download_dir: PathBuf::from("./downloads"),
            catalog_timeout: Duration::from_secs(DEFAULT_CATALOG_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Checks the settings and returns the parsed catalog URL.
    pub fn validate(&self) -> Result<Url> {
        if self.catalog_timeout.is_zero() || self.download_timeout.is_zero() {
            return Err(ImporterError::ValidationError(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        let url = Url::parse(&self.catalog_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ImporterError::ValidationError(format!(
                "catalog URL must be http(s), got '{}'",
                self.catalog_url
            )));
        }

        Ok(url)
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_https_catalog() {
        let config = FetchConfig {
            catalog_url: "https://example.org/ratings/".to_string(),
            ..FetchConfig::default()
        };
        let url = config.validate().unwrap();
        assert_eq!(url.host_str(), Some("example.org"));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let config = FetchConfig {
            catalog_url: "ftp://example.org/ratings/".to_string(),
            ..FetchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = FetchConfig {
            catalog_url: "https://example.org/".to_string(),
            catalog_timeout: Duration::ZERO,
            ..FetchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = FetchConfig::default();
        assert!(config.validate().is_err());
    }
}
