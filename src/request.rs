//! Job descriptors and the validating request builders.
//!
//! Each builder turns raw form input into a [`JobRequest`] or a
//! [`ValidationError`]. They are pure: no I/O, no workflow transitions. The
//! [`crate::converter::Converter`] calls them first and only enters
//! `Submitting` when they succeed.

use crate::config::ClientConfig;
use crate::error::{ValidationError, Web2MdError};
use crate::mode::ConversionMode;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Languages offered by the crawl form's translation menu.
///
/// Any non-empty tag is accepted; this list only seeds front-end pickers.
pub const TRANSLATION_LANGUAGES: [&str; 7] = [
    "Korean", "English", "Japanese", "Chinese", "Spanish", "French", "German",
];

/// Accepted upload extensions and the MIME type each one declares.
const EXTENSION_MIME_TYPES: [(&str, &str); 8] = [
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("txt", "text/plain"),
];

const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

// ── Descriptors ──────────────────────────────────────────────────────────

/// Body of `POST /convert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebpageJob {
    pub url: String,
}

/// Body of `POST /crawl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlJob {
    pub url: String,
    pub max_pages: u32,
    pub max_depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_to: Option<String>,
}

/// A file selected for upload, held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    /// Declared MIME type, as a browser would report it.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read `path` from disk, declaring a MIME type inferred from its extension.
    ///
    /// Files larger than `max_bytes` are rejected with
    /// [`ValidationError::FileTooLarge`] before any content is read.
    pub async fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self, Web2MdError> {
        let path = path.as_ref();
        let read_failed = |source: std::io::Error| Web2MdError::FileRead {
            path: path.to_path_buf(),
            source,
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let size = tokio::fs::metadata(path).await.map_err(read_failed)?.len();
        if size > max_bytes {
            return Err(ValidationError::FileTooLarge {
                name,
                size,
                limit: max_bytes,
            }
            .into());
        }

        let bytes = tokio::fs::read(path).await.map_err(read_failed)?;
        let mime_type = mime_type_for(&name).to_string();
        debug!("Loaded {} ({} bytes, {})", name, bytes.len(), mime_type);
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// MIME type the upload form declares for a file name.
///
/// Unrecognised extensions yield `application/octet-stream`.
pub fn mime_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext {
        Some(ext) => EXTENSION_MIME_TYPES
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, mime)| *mime)
            .unwrap_or(UNKNOWN_MIME_TYPE),
        None => UNKNOWN_MIME_TYPE,
    }
}

/// A validated job descriptor, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    Webpage(WebpageJob),
    Crawl(CrawlJob),
    File(FileUpload),
}

impl JobRequest {
    pub fn mode(&self) -> ConversionMode {
        match self {
            JobRequest::Webpage(_) => ConversionMode::Webpage,
            JobRequest::Crawl(_) => ConversionMode::Multipage,
            JobRequest::File(_) => ConversionMode::File,
        }
    }
}

// ── Form input ───────────────────────────────────────────────────────────

/// Raw crawl form fields, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlForm {
    pub url: String,
    pub max_pages: String,
    pub max_depth: String,
    pub translate_to: String,
}

impl CrawlForm {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn max_pages(mut self, v: impl ToString) -> Self {
        self.max_pages = v.to_string();
        self
    }

    pub fn max_depth(mut self, v: impl ToString) -> Self {
        self.max_depth = v.to_string();
        self
    }

    pub fn translate_to(mut self, lang: impl Into<String>) -> Self {
        self.translate_to = lang.into();
        self
    }
}

// ── Builders ─────────────────────────────────────────────────────────────

/// Validate a single-page URL.
pub fn build_webpage_request(raw_url: &str) -> Result<JobRequest, ValidationError> {
    let url = raw_url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Url::parse(url).map_err(|e| ValidationError::InvalidUrl {
        input: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(JobRequest::Webpage(WebpageJob {
        url: url.to_string(),
    }))
}

/// Validate crawl form input, filling numeric defaults from `config`.
pub fn build_crawl_request(
    form: &CrawlForm,
    config: &ClientConfig,
) -> Result<JobRequest, ValidationError> {
    let url = form.url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    let translate_to = form.translate_to.trim();
    Ok(JobRequest::Crawl(CrawlJob {
        url: url.to_string(),
        max_pages: parse_positive_or(&form.max_pages, config.default_max_pages),
        max_depth: parse_positive_or(&form.max_depth, config.default_max_depth),
        translate_to: (!translate_to.is_empty()).then(|| translate_to.to_string()),
    }))
}

/// Validate a file selection: present, within the size limit, allowed type.
///
/// Size is checked before type.
pub fn build_file_request(
    file: Option<FileUpload>,
    config: &ClientConfig,
) -> Result<JobRequest, ValidationError> {
    let file = file.ok_or(ValidationError::NoFileSelected)?;
    if file.size() > config.max_file_bytes {
        return Err(ValidationError::FileTooLarge {
            name: file.name,
            size: file.bytes.len() as u64,
            limit: config.max_file_bytes,
        });
    }
    if !config.is_mime_allowed(&file.mime_type) {
        return Err(ValidationError::UnsupportedFileType {
            name: file.name,
            mime: file.mime_type,
        });
    }
    Ok(JobRequest::File(file))
}

/// Integer prefix of `raw` (`"25.5"` → 25, `"5 levels"` → 5), or `default`
/// when there is none or it is below 1.
fn parse_positive_or(raw: &str, default: u32) -> u32 {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if negative || digits.is_empty() {
        return default;
    }
    match digits.parse::<u64>() {
        Ok(0) => default,
        Ok(n) => u32::try_from(n).unwrap_or(u32::MAX),
        // Only overflow remains: the prefix is all ASCII digits.
        Err(_) => u32::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webpage_trims_and_accepts_valid_url() {
        let req = build_webpage_request("  https://docs.example.com/api  ").unwrap();
        assert_eq!(
            req,
            JobRequest::Webpage(WebpageJob {
                url: "https://docs.example.com/api".into()
            })
        );
        assert_eq!(req.mode(), ConversionMode::Webpage);
    }

    #[test]
    fn webpage_rejects_empty_and_invalid() {
        assert_eq!(build_webpage_request("   "), Err(ValidationError::EmptyUrl));
        assert!(matches!(
            build_webpage_request("docs.example.com"),
            Err(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn crawl_defaults_when_unparseable() {
        let config = ClientConfig::default();
        let form = CrawlForm::new("https://docs.stripe.com/api")
            .max_pages("lots")
            .max_depth("");
        let JobRequest::Crawl(job) = build_crawl_request(&form, &config).unwrap() else {
            panic!("expected crawl job");
        };
        assert_eq!(job.max_pages, 20);
        assert_eq!(job.max_depth, 3);
        assert_eq!(job.translate_to, None);
    }

    #[test]
    fn crawl_non_positive_falls_back() {
        let config = ClientConfig::default();
        let form = CrawlForm::new("https://a.example").max_pages(0).max_depth(-4);
        let JobRequest::Crawl(job) = build_crawl_request(&form, &config).unwrap() else {
            panic!("expected crawl job");
        };
        assert_eq!((job.max_pages, job.max_depth), (20, 3));
    }

    #[test]
    fn crawl_numbers_use_leading_integer() {
        let config = ClientConfig::default();
        let form = CrawlForm::new("https://a.example")
            .max_pages("25.5")
            .max_depth("5 levels");
        let JobRequest::Crawl(job) = build_crawl_request(&form, &config).unwrap() else {
            panic!("expected crawl job");
        };
        assert_eq!((job.max_pages, job.max_depth), (25, 5));

        assert_eq!(parse_positive_or("+7", 20), 7);
        assert_eq!(parse_positive_or("  12abc", 20), 12);
        assert_eq!(parse_positive_or("-3.5", 20), 20);
        assert_eq!(parse_positive_or(".5", 20), 20);
        assert_eq!(parse_positive_or("0.9", 3), 3);
        assert_eq!(parse_positive_or("99999999999", 20), u32::MAX);
    }

    #[test]
    fn crawl_keeps_explicit_values_and_language() {
        let config = ClientConfig::default();
        let form = CrawlForm::new("https://a.example")
            .max_pages(" 50 ")
            .max_depth(5)
            .translate_to(" Korean ");
        let JobRequest::Crawl(job) = build_crawl_request(&form, &config).unwrap() else {
            panic!("expected crawl job");
        };
        assert_eq!(job.max_pages, 50);
        assert_eq!(job.max_depth, 5);
        assert_eq!(job.translate_to.as_deref(), Some("Korean"));
    }

    #[test]
    fn crawl_only_checks_emptiness() {
        let config = ClientConfig::default();
        assert_eq!(
            build_crawl_request(&CrawlForm::new(""), &config),
            Err(ValidationError::EmptyUrl)
        );
        assert!(build_crawl_request(&CrawlForm::new("not-a-url"), &config).is_ok());
    }

    #[test]
    fn crawl_body_omits_empty_translation() {
        let job = CrawlJob {
            url: "https://a.example".into(),
            max_pages: 20,
            max_depth: 3,
            translate_to: None,
        };
        let json = serde_json::to_value(&job).unwrap();
        assert!(json.get("translate_to").is_none());
        assert_eq!(json["max_pages"], 20);
    }

    #[test]
    fn file_requires_selection() {
        let config = ClientConfig::default();
        assert_eq!(
            build_file_request(None, &config),
            Err(ValidationError::NoFileSelected)
        );
    }

    #[test]
    fn file_size_checked_before_type() {
        let config = ClientConfig::builder().max_file_bytes(4).build().unwrap();
        let file = FileUpload::new("huge.png", "image/png", vec![0; 5]);
        assert!(matches!(
            build_file_request(Some(file), &config),
            Err(ValidationError::FileTooLarge { size: 5, limit: 4, .. })
        ));
    }

    #[test]
    fn file_type_must_be_allowed() {
        let config = ClientConfig::default();
        let file = FileUpload::new("photo.png", "image/png", vec![1, 2, 3]);
        assert!(matches!(
            build_file_request(Some(file), &config),
            Err(ValidationError::UnsupportedFileType { .. })
        ));

        let ok = FileUpload::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(build_file_request(Some(ok), &config).is_ok());
    }

    #[test]
    fn every_office_type_is_allowed() {
        let config = ClientConfig::default();
        for (ext, mime) in EXTENSION_MIME_TYPES {
            assert!(
                crate::config::DEFAULT_ALLOWED_MIME_TYPES.contains(&mime),
                "{mime} missing from the allow-list"
            );
            let file = FileUpload::new(format!("upload.{ext}"), mime, vec![0; 8]);
            assert!(
                build_file_request(Some(file), &config).is_ok(),
                "{mime} was rejected"
            );
        }
        for mime in crate::config::DEFAULT_ALLOWED_MIME_TYPES {
            let file = FileUpload::new("upload", mime, vec![0; 8]);
            assert!(build_file_request(Some(file), &config).is_ok(), "{mime} was rejected");
        }
    }

    #[test]
    fn file_at_exact_limit_is_accepted() {
        let config = ClientConfig::builder().max_file_bytes(3).build().unwrap();
        let file = FileUpload::new("a.pdf", "application/pdf", vec![0; 3]);
        assert!(build_file_request(Some(file), &config).is_ok());
    }

    #[test]
    fn mime_inferred_from_extension() {
        assert_eq!(mime_type_for("Report.PDF"), "application/pdf");
        assert_eq!(mime_type_for("deck.pptx"), EXTENSION_MIME_TYPES[6].1);
        assert_eq!(mime_type_for("image.png"), "application/octet-stream");
        assert_eq!(mime_type_for("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn from_path_checks_size_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        std::fs::write(&path, vec![0u8; 10]).unwrap();

        let err = FileUpload::from_path(&path, 4).await.unwrap_err();
        assert!(matches!(
            err,
            Web2MdError::Validation(ValidationError::FileTooLarge { size: 10, limit: 4, .. })
        ));

        let file = FileUpload::from_path(&path, 10).await.unwrap();
        assert_eq!(file.name, "big.pdf");
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.size(), 10);
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileUpload::from_path(dir.path().join("gone.txt"), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, Web2MdError::FileRead { .. }));
    }

    #[test]
    fn debug_hides_file_bytes() {
        let file = FileUpload::new("a.txt", "text/plain", vec![b'x'; 1000]);
        let dbg = format!("{file:?}");
        assert!(dbg.contains("size: 1000"));
        assert!(!dbg.contains("120, 120"));
    }
}
