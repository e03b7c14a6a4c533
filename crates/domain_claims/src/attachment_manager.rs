//! Attachment lifecycle for the claim open in the detail view
//!
//! The manager caches the attachment list of at most one claim. The server
//! list is authoritative: every successful mutation is followed by a fresh
//! fetch, never by a local splice.
//!
//! Opening or closing a claim starts a new session. A list or download that
//! resolves for an earlier session is reported as [`Outcome::Stale`] and
//! leaves the state alone. An upload or delete belongs to its claim rather
//! than its session: if the claim is open when the mutation lands, the open
//! list is re-fetched; if the claim was closed or switched away, the result
//! is stale. Upload and delete are serialized per claim: while one is in
//! flight, another is rejected without touching the network.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use core_kernel::{AttachmentId, ClaimId};

use crate::attachment::{sanitize_filename, Attachment, FilePayload, SavedFile};
use crate::envelope::{expect_array, unwrap_envelope};
use crate::error::{ClaimsError, Notice, ValidationError};
use crate::normalize::normalize_attachments;
use crate::ports::ClaimsApiPort;
use crate::state::{lock, Generation, Outcome, RequestGuard, Tracked, ViewState};

/// Asks the user to approve a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Destination for downloaded bytes
pub trait FileSink {
    fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// The server list as re-fetched after a mutation
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Listing {
    pub attachments: Vec<Attachment>,
    /// Set when the mutation succeeded but the re-fetch did not
    pub refresh_error: Option<Notice>,
}

impl Listing {
    fn from_fetch(fetched: Result<Vec<Attachment>, ClaimsError>) -> Self {
        match fetched {
            Ok(attachments) => Self {
                attachments,
                refresh_error: None,
            },
            Err(err) => Self {
                attachments: Vec::new(),
                refresh_error: Some(err.notice("Error loading files")),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReceipt {
    pub requested: usize,
    /// Files the server reports as stored, when it says
    pub accepted: Option<usize>,
    pub notice: String,
    pub listing: Listing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteReceipt {
    pub attachment_id: AttachmentId,
    pub notice: String,
    pub listing: Listing,
}

/// Renderable snapshot of the manager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentView {
    pub claim_id: Option<ClaimId>,
    pub list: ViewState<Vec<Attachment>>,
    /// A mutation for the open claim is in flight
    pub busy: bool,
    /// Filenames selected for the next upload
    pub pending: Vec<String>,
    pub last_notice: Option<String>,
    pub last_error: Option<Notice>,
}

#[derive(Debug, Default)]
struct AttachmentState {
    claim_id: Option<ClaimId>,
    session: Generation,
    list: Tracked<Vec<Attachment>>,
    in_flight: HashSet<ClaimId>,
    selection: Vec<FilePayload>,
    last_notice: Option<String>,
    last_error: Option<Notice>,
}

impl AttachmentState {
    fn switch_to(&mut self, claim_id: Option<ClaimId>) {
        self.claim_id = claim_id;
        self.session = self.session.next();
        self.list.invalidate();
        self.selection.clear();
        self.last_notice = None;
        self.last_error = None;
    }

    fn is_open(&self, claim_id: &ClaimId) -> bool {
        self.claim_id.as_ref() == Some(claim_id)
    }
}

fn list_slot(state: &mut AttachmentState) -> &mut Tracked<Vec<Attachment>> {
    &mut state.list
}

/// Where a mutation started: which session, and whether its claim was open
#[derive(Debug, Clone, Copy)]
struct Origin {
    session: Generation,
    was_open: bool,
}

/// Marks a claim as having a mutation in flight until dropped
struct MutationSlot<'a> {
    state: &'a Mutex<AttachmentState>,
    claim_id: ClaimId,
    origin: Origin,
}

impl Drop for MutationSlot<'_> {
    fn drop(&mut self) {
        lock(self.state).in_flight.remove(&self.claim_id);
    }
}

/// Upload, download, delete and list for one claim at a time
pub struct AttachmentManager {
    port: Arc<dyn ClaimsApiPort>,
    state: Mutex<AttachmentState>,
}

impl AttachmentManager {
    pub fn new(port: Arc<dyn ClaimsApiPort>) -> Self {
        Self {
            port,
            state: Mutex::new(AttachmentState::default()),
        }
    }

    /// Makes `claim_id` the open claim and loads its attachments
    pub async fn open(&self, claim_id: &ClaimId) -> Outcome<Vec<Attachment>> {
        self.load(claim_id, true).await
    }

    /// Tears down the open claim; pending responses become stale
    pub fn close(&self) {
        let mut state = lock(&self.state);
        if let Some(claim_id) = state.claim_id.as_ref() {
            debug!(claim_id = %claim_id, "Closing attachment view");
        }
        state.switch_to(None);
    }

    /// The open claim, if any
    pub fn current_claim(&self) -> Option<ClaimId> {
        lock(&self.state).claim_id.clone()
    }

    /// Fetches the attachment list, opening the claim if another is open.
    ///
    /// On failure the cached list becomes empty and the notice is returned.
    pub async fn list_attachments(&self, claim_id: &ClaimId) -> Outcome<Vec<Attachment>> {
        self.load(claim_id, false).await
    }

    /// Replaces the pending selection for the open claim
    pub fn select_files(&self, files: Vec<FilePayload>) {
        lock(&self.state).selection = files;
    }

    pub fn pending_selection(&self) -> Vec<String> {
        lock(&self.state)
            .selection
            .iter()
            .map(|file| file.filename.clone())
            .collect()
    }

    /// True when a claim is open, files are selected and nothing is in flight
    pub fn can_upload(&self) -> bool {
        let state = lock(&self.state);
        match state.claim_id.as_ref() {
            Some(claim_id) => !state.selection.is_empty() && !state.in_flight.contains(claim_id),
            None => false,
        }
    }

    /// Uploads the pending selection to the open claim
    pub async fn upload_selected(&self) -> Outcome<UploadReceipt> {
        let (claim_id, files) = {
            let state = lock(&self.state);
            (state.claim_id.clone(), state.selection.clone())
        };
        match claim_id {
            Some(claim_id) => self.upload_attachments(&claim_id, files).await,
            None => Outcome::Rejected(ValidationError::EmptySelection),
        }
    }

    /// Uploads all files in one request, then re-fetches the list
    pub async fn upload_attachments(
        &self,
        claim_id: &ClaimId,
        files: Vec<FilePayload>,
    ) -> Outcome<UploadReceipt> {
        if files.is_empty() {
            return Outcome::Rejected(ValidationError::EmptySelection);
        }
        let slot = match self.begin_mutation(claim_id) {
            Ok(slot) => slot,
            Err(reason) => return Outcome::Rejected(reason),
        };

        let requested = files.len();
        info!(claim_id = %claim_id, files = requested, "Uploading attachments");

        let accepted = match self.port.upload_attachments(claim_id, &files).await {
            Ok(payload) => unwrap_envelope(payload).map(|data| accepted_count(&data)),
            Err(err) => Err(ClaimsError::from(err)),
        };
        let accepted = match accepted {
            Ok(accepted) => accepted,
            Err(err) => {
                let notice = err.notice("Error uploading files");
                warn!(claim_id = %claim_id, error = %err, "Upload failed");
                return self.fail(&slot, notice);
            }
        };

        let notice = match accepted {
            Some(stored) => format!("{} of {} file(s) uploaded", stored, requested),
            None => "Upload submitted".to_string(),
        };
        info!(claim_id = %claim_id, requested, accepted = ?accepted, "Upload finished");

        if !self.conclude(&slot, &notice, |state| state.selection.clear()) {
            return Outcome::Stale;
        }
        match self.refresh(&slot).await {
            Some(listing) => Outcome::Completed(UploadReceipt {
                requested,
                accepted,
                notice,
                listing,
            }),
            None => Outcome::Stale,
        }
    }

    /// Deletes one attachment after confirmation, then re-fetches the list
    pub async fn delete_attachment(
        &self,
        claim_id: &ClaimId,
        attachment_id: &AttachmentId,
        confirm: &impl Confirm,
    ) -> Outcome<DeleteReceipt> {
        let slot = match self.begin_mutation(claim_id) {
            Ok(slot) => slot,
            Err(reason) => return Outcome::Rejected(reason),
        };

        let filename = self
            .cached(claim_id, attachment_id)
            .map(|attachment| attachment.display_name().to_string())
            .unwrap_or_else(|| attachment_id.to_string());
        if !confirm.confirm(&format!("Delete {}?", filename)) {
            debug!(claim_id = %claim_id, attachment_id = %attachment_id, "Delete declined");
            return Outcome::Rejected(ValidationError::Unconfirmed { filename });
        }

        info!(claim_id = %claim_id, attachment_id = %attachment_id, "Deleting attachment");
        let deleted = match self.port.delete_attachment(claim_id, attachment_id).await {
            Ok(payload) => unwrap_envelope(payload).map(|_| ()),
            Err(err) => Err(ClaimsError::from(err)),
        };
        if let Err(err) = deleted {
            let notice = err.notice("Error deleting file");
            warn!(claim_id = %claim_id, attachment_id = %attachment_id, error = %err, "Delete failed");
            return self.fail(&slot, notice);
        }

        let notice = "File deleted".to_string();
        if !self.conclude(&slot, &notice, |_| {}) {
            return Outcome::Stale;
        }
        match self.refresh(&slot).await {
            Some(listing) => Outcome::Completed(DeleteReceipt {
                attachment_id: attachment_id.clone(),
                notice,
                listing,
            }),
            None => Outcome::Stale,
        }
    }

    /// Fetches one attachment and hands it to `sink` under a safe filename.
    ///
    /// The name is the original upload name when known, then the stored
    /// name, then the server's suggestion, then `attachment-<id>`.
    pub async fn download_attachment(
        &self,
        claim_id: &ClaimId,
        attachment_id: &AttachmentId,
        sink: &impl FileSink,
    ) -> Outcome<SavedFile> {
        let origin = self.origin(claim_id);
        let cached = self.cached(claim_id, attachment_id);

        let downloaded = match self.port.download_attachment(claim_id, attachment_id).await {
            Ok(downloaded) => downloaded,
            Err(err) => {
                let err = ClaimsError::from(err);
                warn!(claim_id = %claim_id, attachment_id = %attachment_id, error = %err, "Download failed");
                let notice = err.notice("Error downloading file");
                self.record_error(origin, &notice);
                return Outcome::Failed(notice);
            }
        };

        let filename = cached
            .iter()
            .flat_map(|attachment| {
                [attachment.original_filename.as_deref(), Some(attachment.filename.as_str())]
            })
            .chain([downloaded.suggested_filename.as_deref()])
            .flatten()
            .find_map(sanitize_filename)
            .unwrap_or_else(|| format!("attachment-{}", attachment_id));

        if let Err(io) = sink.save(&filename, &downloaded.bytes) {
            let err = ClaimsError::Save {
                filename,
                message: io.to_string(),
            };
            warn!(claim_id = %claim_id, error = %err, "Saving download failed");
            let notice = err.notice("Error downloading file");
            self.record_error(origin, &notice);
            return Outcome::Failed(notice);
        }

        info!(claim_id = %claim_id, attachment_id = %attachment_id, filename = %filename, "Attachment saved");
        Outcome::Completed(SavedFile {
            attachment_id: attachment_id.clone(),
            filename,
            size_bytes: downloaded.bytes.len() as u64,
        })
    }

    /// Current state, for rendering
    pub fn snapshot(&self) -> AttachmentView {
        let state = lock(&self.state);
        AttachmentView {
            claim_id: state.claim_id.clone(),
            list: state.list.view.clone(),
            busy: state
                .claim_id
                .as_ref()
                .is_some_and(|claim_id| state.in_flight.contains(claim_id)),
            pending: state.selection.iter().map(|f| f.filename.clone()).collect(),
            last_notice: state.last_notice.clone(),
            last_error: state.last_error.clone(),
        }
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        lock(&self.state).list.view.data.clone()
    }

    async fn load(&self, claim_id: &ClaimId, reopen: bool) -> Outcome<Vec<Attachment>> {
        let Some(guard) = RequestGuard::try_begin(&self.state, list_slot, |state| {
            if reopen || !state.is_open(claim_id) {
                debug!(claim_id = %claim_id, "Opening attachment view");
                state.switch_to(Some(claim_id.clone()));
            }
            true
        }) else {
            return Outcome::Stale;
        };
        self.settle_list(claim_id, guard).await
    }

    /// Re-fetches after a mutation; `None` when the view moved on meanwhile
    ///
    /// While the claim is open the fetch goes through the tracked list. A
    /// newer list of the same claim may supersede it; that list started after
    /// the mutation landed, so the receipt keeps this fetch's result.
    async fn refresh(&self, slot: &MutationSlot<'_>) -> Option<Listing> {
        let claim_id = &slot.claim_id;
        let Some(guard) =
            RequestGuard::try_begin(&self.state, list_slot, |state| state.is_open(claim_id))
        else {
            if slot.origin.was_open {
                return None;
            }
            return Some(Listing::from_fetch(self.fetch_list(claim_id).await));
        };

        let generation = guard.generation();
        let fetched = self.fetch_list(claim_id).await;
        let settled = match &fetched {
            Ok(attachments) => guard.settle(Ok(attachments.clone())),
            Err(err) => {
                warn!(claim_id = %claim_id, epoch = generation.value(), error = %err, "Reloading attachments failed");
                guard.settle(Err(err.notice("Error loading files")))
            }
        };
        if !settled {
            if slot.origin.was_open && !self.is_open(claim_id) {
                return None;
            }
            debug!(claim_id = %claim_id, epoch = generation.value(), "Reload superseded by a newer list");
        }
        Some(Listing::from_fetch(fetched))
    }

    async fn settle_list(
        &self,
        claim_id: &ClaimId,
        guard: RequestGuard<'_, AttachmentState, Vec<Attachment>>,
    ) -> Outcome<Vec<Attachment>> {
        let generation = guard.generation();
        match self.fetch_list(claim_id).await {
            Ok(attachments) => {
                if guard.settle(Ok(attachments.clone())) {
                    debug!(claim_id = %claim_id, epoch = generation.value(), count = attachments.len(), "Attachments loaded");
                    Outcome::Completed(attachments)
                } else {
                    Outcome::Stale
                }
            }
            Err(err) => {
                warn!(claim_id = %claim_id, epoch = generation.value(), error = %err, "Loading attachments failed");
                let notice = err.notice("Error loading files");
                if guard.settle(Err(notice.clone())) {
                    Outcome::Failed(notice)
                } else {
                    Outcome::Stale
                }
            }
        }
    }

    async fn fetch_list(&self, claim_id: &ClaimId) -> Result<Vec<Attachment>, ClaimsError> {
        let payload = self.port.fetch_attachments(claim_id).await?;
        let items = expect_array(payload, "attachment list")?;
        Ok(normalize_attachments(&items, claim_id))
    }

    fn is_open(&self, claim_id: &ClaimId) -> bool {
        lock(&self.state).is_open(claim_id)
    }

    fn origin(&self, claim_id: &ClaimId) -> Origin {
        let state = lock(&self.state);
        Origin {
            session: state.session,
            was_open: state.is_open(claim_id),
        }
    }

    fn cached(&self, claim_id: &ClaimId, attachment_id: &AttachmentId) -> Option<Attachment> {
        let state = lock(&self.state);
        if !state.is_open(claim_id) {
            return None;
        }
        state
            .list
            .view
            .data
            .iter()
            .find(|attachment| &attachment.id == attachment_id)
            .cloned()
    }

    fn begin_mutation(&self, claim_id: &ClaimId) -> Result<MutationSlot<'_>, ValidationError> {
        let mut state = lock(&self.state);
        if !state.in_flight.insert(claim_id.clone()) {
            debug!(claim_id = %claim_id, "Mutation already in flight");
            return Err(ValidationError::MutationInFlight {
                claim_id: claim_id.clone(),
            });
        }
        Ok(MutationSlot {
            state: &self.state,
            claim_id: claim_id.clone(),
            origin: Origin {
                session: state.session,
                was_open: state.is_open(claim_id),
            },
        })
    }

    /// Records a success notice on the open claim.
    ///
    /// Returns false when the claim was open at the start but no longer is.
    /// `apply` only runs if the session that started the mutation is current.
    fn conclude(
        &self,
        slot: &MutationSlot<'_>,
        notice: &str,
        apply: impl FnOnce(&mut AttachmentState),
    ) -> bool {
        let mut state = lock(&self.state);
        if !state.is_open(&slot.claim_id) {
            return !slot.origin.was_open;
        }
        if state.session == slot.origin.session {
            apply(&mut state);
        }
        state.last_notice = Some(notice.to_string());
        state.last_error = None;
        true
    }

    fn fail<T>(&self, slot: &MutationSlot<'_>, notice: Notice) -> Outcome<T> {
        let mut state = lock(&self.state);
        if state.is_open(&slot.claim_id) {
            state.last_error = Some(notice.clone());
        } else if slot.origin.was_open {
            return Outcome::Stale;
        }
        Outcome::Failed(notice)
    }

    fn record_error(&self, origin: Origin, notice: &Notice) {
        let mut state = lock(&self.state);
        if origin.was_open && state.session == origin.session {
            state.last_error = Some(notice.clone());
        }
    }
}

/// Number of stored files the upload response reports, if any
fn accepted_count(data: &Value) -> Option<usize> {
    match data {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => map
            .get("files")
            .and_then(Value::as_array)
            .map(Vec::len)
            .or_else(|| {
                ["uploaded", "count"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_u64))
                    .and_then(|n| usize::try_from(n).ok())
            }),
        _ => None,
    }
}
