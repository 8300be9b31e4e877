//! The three mutually exclusive conversion modes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of job the user is preparing. Exactly one is selected at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Convert a single web page. (default)
    #[default]
    Webpage,
    /// Crawl a documentation site and combine the pages.
    Multipage,
    /// Upload a document file.
    File,
}

impl ConversionMode {
    /// Path of the service endpoint that handles this mode.
    pub fn endpoint(self) -> &'static str {
        match self {
            ConversionMode::Webpage => "/convert",
            ConversionMode::Multipage => "/crawl",
            ConversionMode::File => "/convert-file",
        }
    }

    /// Busy copy shown while a job of this mode is in flight.
    pub fn progress_message(self) -> &'static str {
        match self {
            ConversionMode::Webpage => "Analysing the web page and converting it to Markdown…",
            ConversionMode::Multipage => "Classifying pages and exploring related documents…",
            ConversionMode::File => "Processing the file and converting it to Markdown…",
        }
    }

    /// Error message used when the service gives no detail.
    pub fn fallback_error(self) -> &'static str {
        match self {
            ConversionMode::Webpage => "An error occurred during conversion.",
            ConversionMode::Multipage => "An error occurred while crawling.",
            ConversionMode::File => "An error occurred while converting the file.",
        }
    }

    pub(crate) fn success_title(self) -> &'static str {
        match self {
            ConversionMode::Multipage => "Crawl complete!",
            _ => "Conversion complete!",
        }
    }

    pub(crate) fn failure_title(self) -> &'static str {
        match self {
            ConversionMode::Multipage => "Crawl failed",
            _ => "Conversion failed",
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversionMode::Webpage => "webpage",
            ConversionMode::Multipage => "multipage",
            ConversionMode::File => "file",
        };
        f.write_str(s)
    }
}
