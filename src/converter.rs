//! Submission entry points: one per conversion mode.
//!
//! Every entry point follows the same sequence:
//!
//! ```text
//! form input ──▶ build_*_request ──▶ start_conversion ──▶ exchange ──▶ normalize ──▶ complete_conversion
//!                  │ (invalid)           │ (busy)                                          │
//!                  ▼                     ▼                                                 ▼
//!            notify + Err          notify + Err                                   notify + Ok(result)
//! ```
//!
//! Only local validation and single-flight rejection come back as `Err`.
//! Every network-originating failure settles the workflow with a failure
//! [`ConversionResult`] and is returned as `Ok`, exactly like a success.

use crate::config::ClientConfig;
use crate::controller::{SubmissionId, WorkflowController};
use crate::error::{ValidationError, Web2MdError};
use crate::mode::ConversionMode;
use crate::normalize;
use crate::notify::{Notification, NoopNotifier, SharedNotifier};
use crate::request::{
    build_crawl_request, build_file_request, build_webpage_request, CrawlForm, FileUpload,
    JobRequest,
};
use crate::result::ConversionResult;
use crate::service::{ConversionService, HttpConversionService};
use std::sync::Arc;
use tracing::{debug, warn};

/// Message used when a submission future is dropped before it settles.
pub const CANCELLED_MESSAGE: &str = "The conversion was interrupted before it finished.";

/// Drives submissions against a [`ConversionService`] and records them in a
/// [`WorkflowController`].
pub struct Converter {
    config: ClientConfig,
    service: Arc<dyn ConversionService>,
    controller: Arc<WorkflowController>,
    notifier: SharedNotifier,
}

impl Converter {
    /// A converter talking HTTP to `config.base_url`, with notifications discarded.
    pub fn new(config: ClientConfig) -> Result<Self, Web2MdError> {
        let service = HttpConversionService::new(config.clone())?;
        Ok(Self::with_service(config, Arc::new(service)))
    }

    /// A converter using a caller-supplied service.
    pub fn with_service(config: ClientConfig, service: Arc<dyn ConversionService>) -> Self {
        Self {
            config,
            service,
            controller: Arc::new(WorkflowController::new()),
            notifier: Arc::new(NoopNotifier),
        }
    }

    /// Replace the notification sink.
    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Share an existing controller (e.g. one the display layer already watches).
    pub fn with_controller(mut self, controller: Arc<WorkflowController>) -> Self {
        self.controller = controller;
        self
    }

    pub fn controller(&self) -> &Arc<WorkflowController> {
        &self.controller
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit a single web page.
    pub async fn convert_webpage(&self, url: &str) -> Result<ConversionResult, Web2MdError> {
        let job = build_webpage_request(url)
            .map_err(|e| self.reject(ConversionMode::Webpage, e))?;
        self.submit(job).await
    }

    /// Submit a multi-page crawl.
    pub async fn crawl(&self, form: &CrawlForm) -> Result<ConversionResult, Web2MdError> {
        let job = build_crawl_request(form, &self.config)
            .map_err(|e| self.reject(ConversionMode::Multipage, e))?;
        self.submit(job).await
    }

    /// Submit a file upload. `None` means nothing was selected.
    pub async fn convert_file(
        &self,
        file: Option<FileUpload>,
    ) -> Result<ConversionResult, Web2MdError> {
        let job = build_file_request(file, &self.config)
            .map_err(|e| self.reject(ConversionMode::File, e))?;
        self.submit(job).await
    }

    fn reject(&self, mode: ConversionMode, err: ValidationError) -> Web2MdError {
        warn!("{} input rejected: {}", mode, err);
        self.notifier.notify(err.notification(mode));
        err.into()
    }

    async fn submit(&self, job: JobRequest) -> Result<ConversionResult, Web2MdError> {
        let mode = job.mode();
        let id = match self.controller.start_conversion(mode) {
            Ok(id) => id,
            Err(e) => {
                self.notifier.notify(Notification::destructive(
                    "Conversion in progress",
                    "Wait for the current conversion to finish.",
                ));
                return Err(e);
            }
        };
        let guard = InFlight {
            controller: &self.controller,
            id,
            settled: false,
        };

        let file_name = match &job {
            JobRequest::File(file) => Some(file.name.clone()),
            _ => None,
        };

        let result = match self.service.exchange(job).await {
            Ok(exchange) => normalize::normalize(mode, &exchange),
            Err(e) => normalize::from_transport_error(mode, &e),
        };

        guard.settle(result.clone());
        self.notifier
            .notify(terminal_notification(mode, &result, file_name.as_deref()));
        Ok(result)
    }
}

/// Settles the workflow if a submission future is dropped mid-flight.
struct InFlight<'a> {
    controller: &'a WorkflowController,
    id: SubmissionId,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, result: ConversionResult) {
        self.settled = true;
        self.controller.complete_conversion(result);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Submission #{} dropped before settling", self.id);
            self.controller
                .complete_conversion(ConversionResult::failure(CANCELLED_MESSAGE));
        }
    }
}

fn terminal_notification(
    mode: ConversionMode,
    result: &ConversionResult,
    file_name: Option<&str>,
) -> Notification {
    match result {
        ConversionResult::Failure { error } => {
            Notification::destructive(mode.failure_title(), error.clone())
        }
        ConversionResult::Success(_) => {
            let description = match mode {
                ConversionMode::Webpage => {
                    "The web page was converted to Markdown.".to_string()
                }
                ConversionMode::Multipage => format!(
                    "{} pages were converted.",
                    result.summary().map(|s| s.successful_pages).unwrap_or(0)
                ),
                ConversionMode::File => format!(
                    "{} was converted to Markdown.",
                    file_name.unwrap_or("The file")
                ),
            };
            Notification::info(mode.success_title(), description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::service::RawExchange;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Scripted {
        calls: AtomicUsize,
        reply: Result<RawExchange, TransportError>,
    }

    #[async_trait]
    impl ConversionService for Scripted {
        async fn exchange(&self, _job: JobRequest) -> Result<RawExchange, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    /// Never answers.
    struct Pending;

    #[async_trait]
    impl ConversionService for Pending {
        async fn exchange(&self, _job: JobRequest) -> Result<RawExchange, TransportError> {
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notification>>);

    impl crate::notify::Notifier for Recorder {
        fn notify(&self, n: Notification) {
            self.0.lock().unwrap().push(n);
        }
    }

    fn scripted(reply: Result<RawExchange, TransportError>) -> Arc<Scripted> {
        Arc::new(Scripted {
            calls: AtomicUsize::new(0),
            reply,
        })
    }

    #[tokio::test]
    async fn invalid_url_never_starts() {
        let service = scripted(Ok(RawExchange {
            status: 200,
            body: br#"{"success":true,"markdown":"x"}"#.to_vec(),
        }));
        let recorder = Arc::new(Recorder::default());
        let converter = Converter::with_service(ClientConfig::default(), service.clone())
            .with_notifier(recorder.clone());

        let err = converter.convert_webpage("not a url").await.unwrap_err();
        assert!(matches!(
            err,
            Web2MdError::Validation(ValidationError::InvalidUrl { .. })
        ));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        let s = converter.controller().snapshot();
        assert!(!s.is_loading);
        assert_eq!(s.submissions, 0);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transport_error_settles_with_failure() {
        let service = scripted(Err(TransportError::Request {
            endpoint: "http://localhost:8000/convert".into(),
            reason: "connection refused".into(),
        }));
        let recorder = Arc::new(Recorder::default());
        let converter = Converter::with_service(ClientConfig::default(), service)
            .with_notifier(recorder.clone());

        let result = converter
            .convert_webpage("https://example.com")
            .await
            .unwrap();
        assert!(!result.is_success());

        let s = converter.controller().snapshot();
        assert!(!s.is_loading);
        assert_eq!((s.submissions, s.completions), (1, 1));
        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_destructive());
        assert_eq!(seen[0].title, "Conversion failed");
    }

    #[tokio::test]
    async fn file_success_notification_names_file() {
        let service = scripted(Ok(RawExchange {
            status: 200,
            body: br#"{"success":true,"markdown":"text"}"#.to_vec(),
        }));
        let recorder = Arc::new(Recorder::default());
        let converter = Converter::with_service(ClientConfig::default(), service)
            .with_notifier(recorder.clone());

        let file = FileUpload::new("notes.txt", "text/plain", b"hello".to_vec());
        converter.convert_file(Some(file)).await.unwrap();

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen[0].description, "notes.txt was converted to Markdown.");
    }

    #[tokio::test]
    async fn shared_controller_sees_submissions() {
        let service = scripted(Ok(RawExchange {
            status: 200,
            body: br#"{"success":true,"markdown":"shared"}"#.to_vec(),
        }));
        let controller = Arc::new(WorkflowController::new());
        controller.select_mode(ConversionMode::File);
        let converter = Converter::with_service(ClientConfig::default(), service)
            .with_controller(Arc::clone(&controller));

        converter.convert_webpage("https://example.com").await.unwrap();

        let s = controller.snapshot();
        assert_eq!(s.selected_mode, ConversionMode::File);
        assert_eq!(s.completions, 1);
        assert_eq!(
            s.last_result.as_ref().and_then(|r| r.markdown_text()),
            Some("shared")
        );
    }

    #[tokio::test]
    async fn dropped_submission_still_settles() {
        let converter =
            Converter::with_service(ClientConfig::default(), Arc::new(Pending));
        let submission = converter.convert_webpage("https://example.com");
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), submission).await;
        assert!(timed_out.is_err());

        let s = converter.controller().snapshot();
        assert!(!s.is_loading);
        assert_eq!(s.completions, 1);
        assert_eq!(
            s.last_result.as_ref().and_then(|r| r.error()),
            Some(CANCELLED_MESSAGE)
        );
    }

    #[tokio::test]
    async fn overlapping_submission_is_rejected() {
        let converter =
            Arc::new(Converter::with_service(ClientConfig::default(), Arc::new(Pending)));
        let first = {
            let converter = Arc::clone(&converter);
            tokio::spawn(async move { converter.convert_webpage("https://a.example").await })
        };
        while !converter.controller().is_loading() {
            tokio::task::yield_now().await;
        }

        let err = converter
            .crawl(&CrawlForm::new("https://b.example"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Web2MdError::Busy {
                mode: ConversionMode::Webpage
            }
        ));
        assert_eq!(converter.controller().snapshot().submissions, 1);
        first.abort();
    }
}
