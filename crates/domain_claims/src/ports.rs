//! Claims Domain Ports
//!
//! The `ClaimsApiPort` trait is everything the directory and the attachment
//! manager need from the claims backend. Adapters return raw JSON so that
//! envelope handling and normalization stay in one place, independent of
//! which backend version answered.
//!
//! - **HTTP Adapter**: talks to the REST backend (infra_http)
//! - **Mock Adapter**: in-memory backend for tests
//!
//! ```rust,ignore
//! use domain_claims::ports::ClaimsApiPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn ClaimsApiPort> = Arc::new(HttpClaimsApi::new(config)?);
//! let directory = ClaimsDirectory::new(port.clone());
//! let attachments = AttachmentManager::new(port);
//! ```

use async_trait::async_trait;
use serde_json::Value;

use core_kernel::{AttachmentId, ClaimId, DomainPort, PortError};

use crate::attachment::{DownloadedFile, FilePayload};

/// Operations the claims backend offers
///
/// JSON results may or may not be wrapped in a `{success, data}` envelope;
/// callers unwrap them. A body that is not JSON at all is reported as
/// `PortError::Transformation`.
#[async_trait]
pub trait ClaimsApiPort: DomainPort {
    /// Raw claim collection
    async fn fetch_claims(&self) -> Result<Value, PortError>;

    /// Raw aggregate statistics
    async fn fetch_stats(&self) -> Result<Value, PortError>;

    /// One raw claim
    async fn fetch_claim(&self, claim_id: &ClaimId) -> Result<Value, PortError>;

    /// Raw attachment list for a claim
    async fn fetch_attachments(&self, claim_id: &ClaimId) -> Result<Value, PortError>;

    /// Uploads all files in a single request
    async fn upload_attachments(
        &self,
        claim_id: &ClaimId,
        files: &[FilePayload],
    ) -> Result<Value, PortError>;

    /// Raw bytes of one attachment
    async fn download_attachment(
        &self,
        claim_id: &ClaimId,
        attachment_id: &AttachmentId,
    ) -> Result<DownloadedFile, PortError>;

    /// Deletes one attachment
    async fn delete_attachment(
        &self,
        claim_id: &ClaimId,
        attachment_id: &AttachmentId,
    ) -> Result<Value, PortError>;
}

/// In-memory backend for tests
///
/// Behaves like the REST backend: stores uploaded files per claim, answers
/// in the enveloped shape unless told otherwise, and can be made to fail,
/// to store fewer files than it was sent, or to pause inside a call.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::{Notify, RwLock};

    use crate::state::lock;

    /// Port operations, for failure injection and call counting
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum MockOperation {
        FetchClaims,
        FetchStats,
        FetchClaim,
        FetchAttachments,
        Upload,
        Download,
        Delete,
    }

    /// A failure the mock reports instead of answering
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MockFailure {
        /// Backend unreachable
        Unreachable,
        /// Non-2xx response
        Status(u16, String),
        /// `{success: false, error}` envelope
        Unsuccessful(String),
        /// A JSON body of the wrong shape
        Malformed,
    }

    /// Pauses one call until released
    #[derive(Debug, Clone)]
    pub struct MockGate {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl MockGate {
        /// Resolves once the held call has started
        pub async fn entered(&self) {
            self.entered.notified().await;
        }

        /// Lets the held call finish
        pub fn release(&self) {
            self.release.notify_one();
        }
    }

    #[derive(Debug, Clone)]
    struct StoredFile {
        id: AttachmentId,
        original_filename: String,
        stored_filename: String,
        bytes: Vec<u8>,
        uploaded_at: DateTime<Utc>,
    }

    impl StoredFile {
        fn to_json(&self, claim_id: &ClaimId) -> Value {
            json!({
                "id": self.id.as_str(),
                "claim_id": claim_id.as_str(),
                "filename": self.stored_filename,
                "original_filename": self.original_filename,
                "file_size": self.bytes.len(),
                "uploaded_at": self.uploaded_at.to_rfc3339(),
            })
        }
    }

    /// In-memory implementation of ClaimsApiPort
    #[derive(Debug)]
    pub struct MockClaimsApi {
        claims: RwLock<Vec<Value>>,
        stats: RwLock<Value>,
        files: RwLock<HashMap<ClaimId, Vec<StoredFile>>>,
        failures: RwLock<HashMap<MockOperation, MockFailure>>,
        store_limit: RwLock<Option<usize>>,
        enveloped: AtomicBool,
        calls: Mutex<HashMap<MockOperation, usize>>,
        gates: Mutex<HashMap<MockOperation, MockGate>>,
    }

    impl Default for MockClaimsApi {
        fn default() -> Self {
            Self {
                claims: RwLock::new(Vec::new()),
                stats: RwLock::new(json!({})),
                files: RwLock::new(HashMap::new()),
                failures: RwLock::new(HashMap::new()),
                store_limit: RwLock::new(None),
                enveloped: AtomicBool::new(true),
                calls: Mutex::new(HashMap::new()),
                gates: Mutex::new(HashMap::new()),
            }
        }
    }

    impl MockClaimsApi {
        /// Creates an empty backend
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the raw claim collection
        pub fn with_claims(mut self, claims: Vec<Value>) -> Self {
            *self.claims.get_mut() = claims;
            self
        }

        /// Sets the raw stats payload
        pub fn with_stats(mut self, stats: Value) -> Self {
            *self.stats.get_mut() = stats;
            self
        }

        /// Answers with bare payloads instead of `{success, data}` envelopes
        pub fn without_envelope(self) -> Self {
            self.enveloped.store(false, Ordering::SeqCst);
            self
        }

        /// Stores at most `limit` files per upload request
        pub fn with_store_limit(mut self, limit: usize) -> Self {
            *self.store_limit.get_mut() = Some(limit);
            self
        }

        /// Adds an already stored file to a claim
        pub async fn add_file(
            &self,
            claim_id: &ClaimId,
            filename: &str,
            bytes: impl Into<Vec<u8>>,
        ) -> AttachmentId {
            let stored = Self::store(filename, bytes.into());
            let id = stored.id.clone();
            self.files
                .write()
                .await
                .entry(claim_id.clone())
                .or_default()
                .push(stored);
            id
        }

        /// Original filenames currently stored for a claim
        pub async fn stored_files(&self, claim_id: &ClaimId) -> Vec<String> {
            self.files
                .read()
                .await
                .get(claim_id)
                .map(|files| files.iter().map(|f| f.original_filename.clone()).collect())
                .unwrap_or_default()
        }

        /// Makes every later call of `operation` fail
        pub async fn fail(&self, operation: MockOperation, failure: MockFailure) {
            self.failures.write().await.insert(operation, failure);
        }

        pub async fn recover(&self, operation: MockOperation) {
            self.failures.write().await.remove(&operation);
        }

        /// Holds the next call of `operation` until the gate is released
        pub fn hold(&self, operation: MockOperation) -> MockGate {
            let gate = MockGate {
                entered: Arc::new(Notify::new()),
                release: Arc::new(Notify::new()),
            };
            lock(&self.gates).insert(operation, gate.clone());
            gate
        }

        /// Number of calls made to `operation`
        pub fn calls(&self, operation: MockOperation) -> usize {
            lock(&self.calls).get(&operation).copied().unwrap_or(0)
        }

        /// Total number of calls across all operations
        pub fn total_calls(&self) -> usize {
            lock(&self.calls).values().sum()
        }

        fn store(filename: &str, bytes: Vec<u8>) -> StoredFile {
            let uploaded_at = Utc::now();
            StoredFile {
                id: AttachmentId::generate(),
                original_filename: filename.to_string(),
                stored_filename: format!("{}-{}", uploaded_at.timestamp_millis(), filename),
                bytes,
                uploaded_at,
            }
        }

        /// Counts the call, waits on any gate, then reports injected failures
        async fn enter(&self, operation: MockOperation) -> Result<(), PortError> {
            *lock(&self.calls).entry(operation).or_insert(0) += 1;

            let gate = lock(&self.gates).remove(&operation);
            if let Some(gate) = gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }

            match self.failures.read().await.get(&operation) {
                None | Some(MockFailure::Unsuccessful(_)) | Some(MockFailure::Malformed) => Ok(()),
                Some(MockFailure::Unreachable) => {
                    Err(PortError::connection("connection refused"))
                }
                Some(MockFailure::Status(status, message)) => {
                    Err(PortError::status(*status, message.clone()))
                }
            }
        }

        /// Shapes a successful payload, honoring envelope mode and
        /// body-level injected failures
        async fn respond(&self, operation: MockOperation, data: Value) -> Value {
            match self.failures.read().await.get(&operation) {
                Some(MockFailure::Unsuccessful(error)) => {
                    return json!({"success": false, "error": error});
                }
                Some(MockFailure::Malformed) => return json!("<html>maintenance</html>"),
                _ => {}
            }
            if self.enveloped.load(Ordering::SeqCst) {
                json!({"success": true, "data": data})
            } else {
                data
            }
        }

        fn claim_matches(raw: &Value, claim_id: &ClaimId) -> bool {
            match raw.get("id") {
                Some(Value::String(id)) => id == claim_id.as_str(),
                Some(Value::Number(id)) => id.to_string() == claim_id.as_str(),
                _ => false,
            }
        }
    }

    impl DomainPort for MockClaimsApi {}

    #[async_trait]
    impl ClaimsApiPort for MockClaimsApi {
        async fn fetch_claims(&self) -> Result<Value, PortError> {
            self.enter(MockOperation::FetchClaims).await?;
            let claims = Value::Array(self.claims.read().await.clone());
            Ok(self.respond(MockOperation::FetchClaims, claims).await)
        }

        async fn fetch_stats(&self) -> Result<Value, PortError> {
            self.enter(MockOperation::FetchStats).await?;
            let stats = self.stats.read().await.clone();
            Ok(self.respond(MockOperation::FetchStats, stats).await)
        }

        async fn fetch_claim(&self, claim_id: &ClaimId) -> Result<Value, PortError> {
            self.enter(MockOperation::FetchClaim).await?;
            let claim = self
                .claims
                .read()
                .await
                .iter()
                .find(|raw| Self::claim_matches(raw, claim_id))
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
            Ok(self.respond(MockOperation::FetchClaim, claim).await)
        }

        async fn fetch_attachments(&self, claim_id: &ClaimId) -> Result<Value, PortError> {
            self.enter(MockOperation::FetchAttachments).await?;
            let listing: Vec<Value> = self
                .files
                .read()
                .await
                .get(claim_id)
                .map(|files| files.iter().map(|f| f.to_json(claim_id)).collect())
                .unwrap_or_default();
            Ok(self
                .respond(MockOperation::FetchAttachments, Value::Array(listing))
                .await)
        }

        async fn upload_attachments(
            &self,
            claim_id: &ClaimId,
            files: &[FilePayload],
        ) -> Result<Value, PortError> {
            self.enter(MockOperation::Upload).await?;
            if let Some(MockFailure::Unsuccessful(error)) =
                self.failures.read().await.get(&MockOperation::Upload)
            {
                return Ok(json!({"success": false, "error": error}));
            }
            let limit = self.store_limit.read().await.unwrap_or(files.len());
            let stored: Vec<StoredFile> = files
                .iter()
                .take(limit)
                .map(|file| Self::store(&file.filename, file.bytes.clone()))
                .collect();
            let accepted: Vec<Value> = stored.iter().map(|f| f.to_json(claim_id)).collect();
            self.files
                .write()
                .await
                .entry(claim_id.clone())
                .or_default()
                .extend(stored);

            if let Some(MockFailure::Malformed) =
                self.failures.read().await.get(&MockOperation::Upload)
            {
                return Ok(json!("<html>maintenance</html>"));
            }
            if self.enveloped.load(Ordering::SeqCst) {
                Ok(json!({
                    "success": true,
                    "message": format!("{} file(s) uploaded successfully", accepted.len()),
                    "data": accepted,
                }))
            } else {
                Ok(Value::Array(accepted))
            }
        }

        async fn download_attachment(
            &self,
            claim_id: &ClaimId,
            attachment_id: &AttachmentId,
        ) -> Result<DownloadedFile, PortError> {
            self.enter(MockOperation::Download).await?;
            let files = self.files.read().await;
            let file = files
                .get(claim_id)
                .and_then(|files| files.iter().find(|f| &f.id == attachment_id))
                .ok_or_else(|| PortError::not_found("Attachment", attachment_id))?;
            Ok(DownloadedFile {
                bytes: file.bytes.clone(),
                suggested_filename: Some(file.stored_filename.clone()),
                content_type: Some("application/octet-stream".to_string()),
            })
        }

        async fn delete_attachment(
            &self,
            claim_id: &ClaimId,
            attachment_id: &AttachmentId,
        ) -> Result<Value, PortError> {
            self.enter(MockOperation::Delete).await?;
            {
                let mut files = self.files.write().await;
                let stored = files
                    .get_mut(claim_id)
                    .ok_or_else(|| PortError::not_found("Attachment", attachment_id))?;
                let before = stored.len();
                stored.retain(|f| &f.id != attachment_id);
                if stored.len() == before {
                    return Err(PortError::not_found("Attachment", attachment_id));
                }
            }
            Ok(self
                .respond(MockOperation::Delete, json!({"message": "File deleted successfully"}))
                .await)
        }
    }
}
