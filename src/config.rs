//! Configuration for talking to the conversion service.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. Callers set only the knobs they care about and rely
//! on the documented defaults for the rest.

use crate::error::Web2MdError;
use std::time::Duration;
use url::Url;

/// Default address of the conversion service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Upload limit for file mode: 50 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

pub const DEFAULT_MAX_PAGES: u32 = 20;
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// MIME types accepted for upload: PDF, legacy and OOXML Word/Excel/PowerPoint,
/// plain text.
pub const DEFAULT_ALLOWED_MIME_TYPES: [&str; 8] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
];

/// Configuration for a [`crate::converter::Converter`].
///
/// # Example
/// ```rust
/// use web2md_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .base_url("http://127.0.0.1:9000")
///     .request_timeout(Duration::from_secs(300))
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint_url("/crawl"), "http://127.0.0.1:9000/crawl");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the service. Default: `http://localhost:8000`.
    pub base_url: Url,

    /// Whole-request timeout. Default: none.
    ///
    /// A crawl can legitimately run for minutes, so the client waits
    /// indefinitely unless the caller opts in.
    pub request_timeout: Option<Duration>,

    /// TCP connect timeout. Default: none.
    pub connect_timeout: Option<Duration>,

    /// Largest file accepted for upload, in bytes. Default: 50 MiB.
    pub max_file_bytes: u64,

    /// Declared MIME types accepted for upload.
    pub allowed_mime_types: Vec<String>,

    /// Used when the max-pages field is unparseable or not positive. Default: 20.
    pub default_max_pages: u32,

    /// Used when the max-depth field is unparseable or not positive. Default: 3.
    pub default_max_depth: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: None,
            connect_timeout: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_max_pages: DEFAULT_MAX_PAGES,
            default_max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
            base_url: None,
        }
    }

    /// Absolute URL of `endpoint` (e.g. `"/convert"`) on the configured service.
    ///
    /// Endpoints are resolved against the base URL's path, so a base of
    /// `http://host/api` yields `http://host/api/convert`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{}", endpoint.trim_start_matches('/'))
    }

    /// Whether `mime` is on the upload allow-list (case-insensitive, parameters ignored).
    pub fn is_mime_allowed(&self, mime: &str) -> bool {
        let essence = mime.split(';').next().unwrap_or("").trim();
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
    base_url: Option<String>,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.config.max_file_bytes = bytes;
        self
    }

    pub fn allowed_mime_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_mime_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_max_pages(mut self, n: u32) -> Self {
        self.config.default_max_pages = n;
        self
    }

    pub fn default_max_depth(mut self, n: u32) -> Self {
        self.config.default_max_depth = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ClientConfig, Web2MdError> {
        if let Some(raw) = self.base_url.take() {
            let url = Url::parse(raw.trim()).map_err(|e| {
                Web2MdError::InvalidConfig(format!("base URL '{raw}' is invalid: {e}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Web2MdError::InvalidConfig(format!(
                    "base URL must use http or https, got '{}'",
                    url.scheme()
                )));
            }
            self.config.base_url = url;
        }

        let c = &self.config;
        if c.max_file_bytes == 0 {
            return Err(Web2MdError::InvalidConfig(
                "max file size must be ≥ 1 byte".into(),
            ));
        }
        if c.allowed_mime_types.is_empty() {
            return Err(Web2MdError::InvalidConfig(
                "at least one MIME type must be allowed".into(),
            ));
        }
        if c.default_max_pages == 0 || c.default_max_depth == 0 {
            return Err(Web2MdError::InvalidConfig(
                "default max pages and max depth must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
