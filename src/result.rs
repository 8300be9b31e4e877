//! The canonical, mode-agnostic conversion outcome.
//!
//! A [`ConversionResult`] is either a `Success` carrying exactly one Markdown
//! document or a `Failure` carrying exactly one error message. The service's
//! single-page (`markdown`) and multi-page (`combined_markdown`) fields are
//! reconciled into [`ConversionOutput::markdown`] by the normalizer, so the
//! display layer never has to pick between them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of a crawl's `pages[]` list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrawledPage {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_type: Option<String>,
    #[serde(default)]
    pub success: bool,
}

/// Crawl summary. Only `successful_pages` is interpreted; the rest is kept opaque.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrawlSummary {
    #[serde(default)]
    pub successful_pages: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mode-specific payload of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentKind {
    /// Webpage or file conversion.
    Document {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
    /// Multi-page crawl.
    Crawl {
        pages: Vec<CrawledPage>,
        summary: CrawlSummary,
    },
}

/// Content of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub markdown: String,
    #[serde(flatten)]
    pub kind: ContentKind,
    /// Server-side storage reference, when the service kept a copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_file: Option<String>,
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionResult {
    Success(ConversionOutput),
    Failure { error: String },
}

impl ConversionResult {
    pub fn failure(error: impl Into<String>) -> Self {
        ConversionResult::Failure {
            error: error.into(),
        }
    }

    /// A single-document success without metadata.
    pub fn document(markdown: impl Into<String>) -> Self {
        ConversionResult::Success(ConversionOutput {
            markdown: markdown.into(),
            kind: ContentKind::Document { metadata: None },
            saved_file: None,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }

    pub fn output(&self) -> Option<&ConversionOutput> {
        match self {
            ConversionResult::Success(out) => Some(out),
            ConversionResult::Failure { .. } => None,
        }
    }

    pub fn markdown_text(&self) -> Option<&str> {
        self.output().map(|o| o.markdown.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ConversionResult::Failure { error } => Some(error),
            ConversionResult::Success(_) => None,
        }
    }

    pub fn metadata(&self) -> Option<&Value> {
        match self.output().map(|o| &o.kind) {
            Some(ContentKind::Document { metadata }) => metadata.as_ref(),
            _ => None,
        }
    }

    pub fn pages(&self) -> Option<&[CrawledPage]> {
        match self.output().map(|o| &o.kind) {
            Some(ContentKind::Crawl { pages, .. }) => Some(pages),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&CrawlSummary> {
        match self.output().map(|o| &o.kind) {
            Some(ContentKind::Crawl { summary, .. }) => Some(summary),
            _ => None,
        }
    }

    pub fn saved_file_path(&self) -> Option<&str> {
        self.output().and_then(|o| o.saved_file.as_deref())
    }
}
