//! # web2md-client
//!
//! Submit conversion jobs to a Markdown conversion service and track them
//! through a single-flight workflow.
//!
//! The service offers three modes: convert one web page, crawl a
//! documentation site into one combined document, or convert an uploaded
//! office/PDF/text file. Each answers with a different JSON shape. This crate
//! validates input locally, sends exactly one request per submission, and
//! folds every outcome (success, service error, transport error) into one
//! [`ConversionResult`] that a display layer can render without caring which
//! mode produced it.
//!
//! ## Workflow Overview
//!
//! ```text
//! select_mode ─▶ form input
//!                   │
//!                   ├─ 1. Validate   URL syntax / crawl limits / file size + type
//!                   ├─ 2. Start      WorkflowController: Idle|Settled → Submitting
//!                   ├─ 3. Exchange   POST /convert | /crawl | /convert-file
//!                   ├─ 4. Normalize  raw status + body → ConversionResult
//!                   ├─ 5. Complete   WorkflowController: Submitting → Settled
//!                   └─ 6. Notify     transient title + description
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use web2md_client::{ClientConfig, Converter, CrawlForm};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new(ClientConfig::default())?;
//!
//!     let page = converter.convert_webpage("https://docs.example.com/api").await?;
//!     println!("{}", page.markdown_text().unwrap_or_default());
//!
//!     let site = converter
//!         .crawl(&CrawlForm::new("https://docs.example.com").max_pages(10))
//!         .await?;
//!     if let Some(summary) = site.summary() {
//!         eprintln!("{} pages converted", summary.successful_pages);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `web2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod converter;
pub mod error;
pub mod mode;
pub mod normalize;
pub mod notify;
pub mod output;
pub mod request;
pub mod result;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder};
pub use controller::{Phase, SubmissionId, WorkflowController, WorkflowState};
pub use converter::Converter;
pub use error::{TransportError, ValidationError, Web2MdError};
pub use mode::ConversionMode;
pub use notify::{Notification, Notifier, NoopNotifier, Severity, SharedNotifier, TracingNotifier};
pub use output::{format_content_length, suggested_filename, write_markdown, write_markdown_to_dir};
pub use request::{CrawlForm, CrawlJob, FileUpload, JobRequest, WebpageJob, TRANSLATION_LANGUAGES};
pub use result::{ContentKind, ConversionOutput, ConversionResult, CrawledPage, CrawlSummary};
pub use service::{ConversionService, HttpConversionService, RawExchange};
