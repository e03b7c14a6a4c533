//! Attachment model and file payloads

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AttachmentId, ClaimId, DateValue};

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// A file stored against a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub claim_id: ClaimId,
    /// Name as stored by the server
    pub filename: String,
    /// Name as uploaded, when the server reports it
    pub original_filename: Option<String>,
    pub size_bytes: u64,
    pub uploaded_at: DateValue,
}

impl Attachment {
    /// Name to offer when saving or confirming: original first, stored second
    pub fn display_name(&self) -> &str {
        self.original_filename.as_deref().unwrap_or(&self.filename)
    }

    pub fn size_display(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

/// One file chosen for upload
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePayload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Raw bytes returned by the download endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub bytes: Vec<u8>,
    /// Filename the server suggested, e.g. from `Content-Disposition`
    pub suggested_filename: Option<String>,
    pub content_type: Option<String>,
}

/// A download handed to the save sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub attachment_id: AttachmentId,
    pub filename: String,
    pub size_bytes: u64,
}

/// Human-readable size: `0 B`, `512 B`, `1.5 KB`, `2.25 MB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut unit = 0;
    let mut divisor = 1u64;
    while unit < SIZE_UNITS.len() - 1 && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }
    let value = (bytes as f64 / divisor as f64 * 100.0).round() / 100.0;
    format!("{} {}", value, SIZE_UNITS[unit])
}

/// Strips path components so a server-chosen name cannot escape the target directory
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"');
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
