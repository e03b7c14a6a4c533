//! Claims Dashboard Domain
//!
//! This crate turns whatever the claims backend returns into stable,
//! renderable state:
//!
//! - **Normalization**: raw claim, attachment and stats payloads of any known
//!   backend version become canonical models with display defaults
//! - **Directory**: the claim collection, dashboard totals and claim detail
//! - **Attachments**: list, upload, download and delete for the open claim
//!
//! # Request Lifecycle
//!
//! ```text
//! Idle -> Loading -> Ready
//!                \-> Failed   (data degraded to its empty default)
//! ```
//!
//! Every operation resolves to an [`Outcome`]; nothing here panics or
//! propagates a transport failure to the caller.

pub mod attachment;
pub mod attachment_manager;
pub mod claim;
pub mod directory;
pub mod envelope;
pub mod error;
pub mod normalize;
pub mod ports;
pub mod state;
pub mod stats;

pub use attachment::{format_file_size, Attachment, DownloadedFile, FilePayload, SavedFile};
pub use attachment_manager::{
    AttachmentManager, AttachmentView, Confirm, DeleteReceipt, FileSink, Listing, UploadReceipt,
};
pub use claim::{Activity, Claim, ClaimStatus, Priority, NOT_AVAILABLE, UNASSIGNED};
pub use directory::{filter_claims, ClaimsDirectory, DirectoryView};
pub use error::{ClaimsError, FailureKind, Notice, ValidationError};
pub use normalize::{normalize_attachments, normalize_claim, normalize_claims, normalize_stats};
pub use ports::ClaimsApiPort;
pub use state::{Generation, LoadPhase, Outcome, ViewState};
pub use stats::ClaimsStats;
