//! Error types for the web2md-client library.
//!
//! Three error types mirror the three places a submission can go wrong:
//!
//! * [`ValidationError`] — **Local**: the form input is missing or malformed.
//!   Detected before any network call; the workflow never enters
//!   `Submitting`.
//!
//! * [`TransportError`] — **Network**: the request could not be sent or the
//!   response body could not be read. Never returned to callers of
//!   [`crate::converter::Converter`]; it is folded into a failure
//!   [`crate::result::ConversionResult`] so the display layer renders it like
//!   any other failed conversion.
//!
//! * [`Web2MdError`] — **Caller-facing**: everything a library caller can get
//!   back as `Err(..)` (validation, single-flight rejection, configuration,
//!   local file I/O).

use crate::mode::ConversionMode;
use crate::notify::{Notification, Severity};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned as `Err(..)` by the web2md-client library.
///
/// Service-reported failures are *not* errors at this level: they settle the
/// workflow with a failure [`crate::result::ConversionResult`].
#[derive(Debug, Error)]
pub enum Web2MdError {
    // ── Submission errors ─────────────────────────────────────────────────
    /// Input failed client-side validation; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another conversion is still in flight.
    #[error("A {mode} conversion is already in progress")]
    Busy { mode: ConversionMode },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read a file selected for upload.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The result carries no Markdown (it is a failure result).
    #[error("The conversion failed; there is no Markdown to write")]
    NoMarkdown,
}

/// Input rejected before any network exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The URL field is empty or whitespace.
    #[error("A URL is required")]
    EmptyUrl,

    /// The URL text does not parse as a URL.
    #[error("'{input}' is not a valid URL: {reason}")]
    InvalidUrl { input: String, reason: String },

    /// File mode was submitted with no file.
    #[error("No file selected")]
    NoFileSelected,

    /// The selected file exceeds the upload limit.
    #[error("'{name}' is {size} bytes; the limit is {limit} bytes")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    /// The declared MIME type is not on the allow-list.
    #[error("'{name}' has unsupported type '{mime}'")]
    UnsupportedFileType { name: String, mime: String },
}

impl ValidationError {
    /// The user-facing notification raised for this error in `mode`.
    pub fn notification(&self, mode: ConversionMode) -> Notification {
        let (title, description): (&str, String) = match self {
            ValidationError::EmptyUrl => (
                "Enter a URL",
                match mode {
                    ConversionMode::Multipage => {
                        "Enter the URL of the documentation site to crawl."
                    }
                    _ => "Enter the URL of the web page to convert.",
                }
                .into(),
            ),
            ValidationError::InvalidUrl { .. } => (
                "Invalid URL",
                "Enter a full URL, including the scheme (https://…).".into(),
            ),
            ValidationError::NoFileSelected => {
                ("Select a file", "Choose the file you want to convert.".into())
            }
            ValidationError::FileTooLarge { limit, .. } => (
                "File too large",
                format!("Files may not be larger than {}.", describe_limit(*limit)),
            ),
            ValidationError::UnsupportedFileType { .. } => (
                "Unsupported file type",
                "Only PDF, Word, Excel, PowerPoint and text files are supported.".into(),
            ),
        };
        Notification::new(title, description, Severity::Destructive)
    }
}

/// `50 MB` for whole mebibytes, else the exact byte count.
fn describe_limit(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// The network exchange itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("Could not reach the conversion service at {endpoint}: {reason}")]
    Request { endpoint: String, reason: String },

    /// The response arrived but its body could not be read.
    #[error("Failed to read the response from {endpoint}: {reason}")]
    Body { endpoint: String, reason: String },
}
