//! The network exchange with the remote conversion service.
//!
//! [`ConversionService`] is the seam between the workflow and the network:
//! one validated [`JobRequest`] in, one [`RawExchange`] (status + body) out.
//! Interpretation of the body is left to [`crate::normalize`], so a service
//! implementation only has to move bytes. Tests substitute their own
//! implementation to count calls or script responses.

use crate::config::ClientConfig;
use crate::error::{TransportError, Web2MdError};
use crate::request::JobRequest;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Instant;
use tracing::{debug, info};

/// Status and raw body of one completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExchange {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawExchange {
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs exactly one request per call. No retries.
#[async_trait]
pub trait ConversionService: Send + Sync {
    async fn exchange(&self, job: JobRequest) -> Result<RawExchange, TransportError>;
}

/// reqwest-backed service speaking the `/convert`, `/crawl`, `/convert-file` contract.
#[derive(Debug, Clone)]
pub struct HttpConversionService {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpConversionService {
    pub fn new(config: ClientConfig) -> Result<Self, Web2MdError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Web2MdError::HttpClient(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl ConversionService for HttpConversionService {
    async fn exchange(&self, job: JobRequest) -> Result<RawExchange, TransportError> {
        let endpoint = self.config.endpoint_url(job.mode().endpoint());
        let request = self.client.post(&endpoint);
        let request = match job {
            JobRequest::Webpage(body) => request.json(&body),
            JobRequest::Crawl(body) => request.json(&body),
            JobRequest::File(file) => {
                let size = file.bytes.len();
                let part = Part::bytes(file.bytes)
                    .file_name(file.name)
                    .mime_str(&file.mime_type)
                    .map_err(|e| TransportError::Request {
                        endpoint: endpoint.clone(),
                        reason: e.to_string(),
                    })?;
                debug!("Uploading {} bytes as multipart field `file`", size);
                request.multipart(Form::new().part("file", part))
            }
        };

        info!("POST {}", endpoint);
        let start = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| TransportError::Body {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        info!(
            "POST {} → {} ({} bytes, {}ms)",
            endpoint,
            status,
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(RawExchange {
            status,
            body: body.to_vec(),
        })
    }
}
