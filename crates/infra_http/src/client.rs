//! reqwest-backed implementation of the claims API port
//!
//! Bodies are returned raw, envelope included; unwrapping and normalization
//! belong to the domain. The adapter only guarantees that a 2xx answer
//! carried JSON.

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::{debug, warn};

use core_kernel::{AttachmentId, ClaimId, DomainPort, PortError};
use domain_claims::{ClaimsApiPort, DownloadedFile, FilePayload};

use crate::config::{Addressing, ClaimsApiConfig};
use crate::error::{parse_json, status_error, transport_error, ConfigError};

/// Multipart field carrying each uploaded file
pub const UPLOAD_FIELD: &str = "files";

/// HTTP adapter for the claims REST backend
#[derive(Debug, Clone)]
pub struct HttpClaimsApi {
    client: Client,
    base: Url,
    config: ClaimsApiConfig,
}

impl HttpClaimsApi {
    /// Builds a client with the configured timeout
    pub fn new(config: ClaimsApiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base = config.endpoint()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ConfigError::Client)?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    pub fn config(&self) -> &ClaimsApiConfig {
        &self.config
    }

    /// Appends route segments to the base URL, percent-encoding each one
    fn url<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.base.clone();
        // http and https URLs always have a path to extend
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(segments.iter().map(AsRef::as_ref));
        }
        url
    }

    /// Sends a request and returns the body of a 2xx answer
    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response, PortError> {
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(err, operation, self.config.timeout()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        let err = status_error(status, &body);
        debug!(operation, status = status.as_u16(), error = %err, "Backend refused request");
        Err(err)
    }

    async fn json(&self, method: Method, url: Url, operation: &str) -> Result<Value, PortError> {
        debug!(%method, %url, operation, "Calling claims API");
        let response = self.send(self.client.request(method, url), operation).await?;
        self.read_json(response, operation).await
    }

    async fn read_json(&self, response: Response, operation: &str) -> Result<Value, PortError> {
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(err, operation, self.config.timeout()))?;
        parse_json(&body, operation)
    }

    /// Candidate paths for one file, in the order they are tried
    fn file_urls(&self, claim_id: &ClaimId, attachment_id: &AttachmentId) -> Vec<Url> {
        let nested = self.url(&["api", "claims", claim_id.as_str(), "files", attachment_id.as_str()]);
        let flat = self.url(&["api", "files", attachment_id.as_str()]);
        match self.config.addressing {
            Addressing::Nested => vec![nested],
            Addressing::Flat => vec![flat],
            Addressing::Auto => vec![nested, flat],
        }
    }

    /// Sends a single-file request, moving to the next route on 404 or 405
    async fn send_file_request(
        &self,
        method: Method,
        claim_id: &ClaimId,
        attachment_id: &AttachmentId,
        operation: &str,
    ) -> Result<Response, PortError> {
        let urls = self.file_urls(claim_id, attachment_id);
        let last = urls.len() - 1;
        let mut outcome = Err(PortError::internal("no file route configured"));
        for (index, url) in urls.into_iter().enumerate() {
            debug!(%method, %url, operation, "Calling claims API");
            outcome = self.send(self.client.request(method.clone(), url), operation).await;
            match &outcome {
                Err(PortError::Status { status: 404 | 405, .. }) if index < last => {
                    debug!(claim_id = %claim_id, attachment_id = %attachment_id, "Nested file route refused, trying flat route");
                }
                _ => break,
            }
        }
        outcome
    }
}

impl DomainPort for HttpClaimsApi {}

#[async_trait]
impl ClaimsApiPort for HttpClaimsApi {
    async fn fetch_claims(&self) -> Result<Value, PortError> {
        let url = self.url(&["api", "claims"]);
        self.json(Method::GET, url, "fetch claims").await
    }

    async fn fetch_stats(&self) -> Result<Value, PortError> {
        let url = self.url(&["api", "claims", "stats"]);
        self.json(Method::GET, url, "fetch stats").await
    }

    async fn fetch_claim(&self, claim_id: &ClaimId) -> Result<Value, PortError> {
        let url = self.url(&["api", "claims", claim_id.as_str()]);
        self.json(Method::GET, url, "fetch claim").await
    }

    async fn fetch_attachments(&self, claim_id: &ClaimId) -> Result<Value, PortError> {
        let url = self.url(&["api", "claims", claim_id.as_str(), "files"]);
        self.json(Method::GET, url, "list attachments").await
    }

    async fn upload_attachments(
        &self,
        claim_id: &ClaimId,
        files: &[FilePayload],
    ) -> Result<Value, PortError> {
        let mut form = Form::new();
        for file in files {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
            if let Some(content_type) = file.content_type.as_deref() {
                part = part.mime_str(content_type).map_err(|err| {
                    PortError::validation(format!(
                        "Invalid content type for {}: {}",
                        file.filename, err
                    ))
                })?;
            }
            form = form.part(UPLOAD_FIELD, part);
        }

        let url = self.url(&["api", "claims", claim_id.as_str(), "files"]);
        debug!(%url, claim_id = %claim_id, files = files.len(), "Uploading attachments");
        let request = self.client.post(url).multipart(form);
        let response = self.send(request, "upload attachments").await.map_err(|err| {
            warn!(claim_id = %claim_id, error = %err, "Upload request failed");
            err
        })?;
        self.read_json(response, "upload attachments").await
    }

    async fn download_attachment(
        &self,
        claim_id: &ClaimId,
        attachment_id: &AttachmentId,
    ) -> Result<DownloadedFile, PortError> {
        let operation = "download attachment";
        let response = self
            .send_file_request(Method::GET, claim_id, attachment_id, operation)
            .await?;

        let headers = response.headers();
        let suggested_filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|err| transport_error(err, operation, self.config.timeout()))?;
        debug!(claim_id = %claim_id, attachment_id = %attachment_id, bytes = bytes.len(), "Attachment downloaded");

        Ok(DownloadedFile {
            bytes: bytes.to_vec(),
            suggested_filename,
            content_type,
        })
    }

    async fn delete_attachment(
        &self,
        claim_id: &ClaimId,
        attachment_id: &AttachmentId,
    ) -> Result<Value, PortError> {
        let operation = "delete attachment";
        let response = self
            .send_file_request(Method::DELETE, claim_id, attachment_id, operation)
            .await?;
        self.read_json(response, operation).await
    }
}

/// Filename from a `Content-Disposition` header.
///
/// `filename*=UTF-8''name` wins over `filename=`; quotes are stripped.
pub fn disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                extended = value.split_once("''").map(|(_, name)| name.to_string());
            }
            "filename" => plain = Some(value.to_string()),
            _ => {}
        }
    }
    extended.or(plain).filter(|name| !name.is_empty())
}
