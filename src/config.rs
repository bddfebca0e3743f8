//! Client configuration.
//!
//! Everything the client needs to know about its surroundings lives in
//! [`ClientConfig`], built via [`ClientConfigBuilder`] or read from the
//! environment with [`ClientConfig::from_env`].

use crate::error::DocConvError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "DOCCONV_API_URL";

/// Base URL used when [`API_URL_ENV`] is unset or empty.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration for an [`crate::client::ApiClient`].
///
/// # Example
/// ```rust
/// use docconv_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://convert.example.com/")
///     .output_dir("downloads")
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "https://convert.example.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme + host (+ optional path prefix) of the conversion service,
    /// without a trailing slash. Default: `http://localhost:8000`.
    pub base_url: String,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Directory downloads are written into. Default: current directory.
    pub output_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            user_agent: concat!("docconv-client/", env!("CARGO_PKG_VERSION")).to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults, with the base URL taken from `DOCCONV_API_URL` when set.
    pub fn from_env() -> Result<Self, DocConvError> {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                builder = builder.base_url(url);
            }
        }
        builder.build()
    }

    /// Join an endpoint path (`/api/...`) onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.base_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Build the configuration, validating the base URL.
    pub fn build(self) -> Result<ClientConfig, DocConvError> {
        let c = &self.config;
        let parsed = reqwest::Url::parse(&c.base_url).map_err(|e| {
            DocConvError::InvalidConfig(format!("base URL '{}' is not a URL: {}", c.base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DocConvError::InvalidConfig(format!(
                "base URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(DocConvError::InvalidConfig(
                "output directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_localhost() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(
            config.url_for("/api/pdf-to-txt"),
            "http://localhost:8000/api/pdf-to-txt"
        );
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = ClientConfig::builder()
            .base_url("http://svc:9000/prefix//")
            .build()
            .unwrap();
        assert_eq!(config.base_url, "http://svc:9000/prefix");
        assert_eq!(
            config.url_for("/api/pdf-unlock"),
            "http://svc:9000/prefix/api/pdf-unlock"
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::builder()
            .base_url("ftp://files.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, DocConvError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_garbage_url() {
        let err = ClientConfig::builder().base_url("not a url").build().unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn rejects_empty_output_dir() {
        assert!(ClientConfig::builder().output_dir("").build().is_err());
    }
}
