//! Tests for the attachment manager

use std::io;
use std::sync::{Arc, Mutex};

use core_kernel::{AttachmentId, ClaimId};
use domain_claims::ports::mock::{MockClaimsApi, MockFailure, MockOperation};
use domain_claims::{
    AttachmentManager, FailureKind, FileSink, FilePayload, LoadPhase, Outcome, ValidationError,
};
use test_utils::{
    assert_completed, assert_failed, assert_rejected, assert_settled, SelectionBuilder,
};

fn claim() -> ClaimId {
    ClaimId::from(1u64)
}

fn manager(port: &Arc<MockClaimsApi>) -> AttachmentManager {
    AttachmentManager::new(port.clone())
}

/// Collects saved files in memory
#[derive(Default)]
struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FileSink for MemorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

struct FullDisk;

impl FileSink for FullDisk {
    fn save(&self, _filename: &str, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
    }
}

// ============================================================================
// Listing Tests
// ============================================================================

mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_open_lists_attachments() {
        let port = Arc::new(MockClaimsApi::new());
        port.add_file(&claim(), "roof.jpg", vec![1, 2, 3]).await;
        let mgr = manager(&port);

        let list = assert_completed(mgr.open(&claim()).await);

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].display_name(), "roof.jpg");
        assert_eq!(list[0].size_bytes, 3);
        assert_eq!(mgr.current_claim(), Some(claim()));
        assert_eq!(mgr.snapshot().list.phase, LoadPhase::Ready);
    }

    #[tokio::test]
    async fn test_list_failure_empties_cached_set() {
        let port = Arc::new(MockClaimsApi::new());
        port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);

        port.fail(MockOperation::FetchAttachments, MockFailure::Unreachable).await;
        let message = assert_failed(mgr.list_attachments(&claim()).await, FailureKind::Transport);

        assert!(message.starts_with("Error loading files"));
        assert!(mgr.attachments().is_empty());
        assert_eq!(mgr.snapshot().list.phase, LoadPhase::Failed);
        assert_eq!(port.calls(MockOperation::FetchAttachments), 2);
    }

    #[tokio::test]
    async fn test_listing_another_claim_switches() {
        let port = Arc::new(MockClaimsApi::new());
        let other = ClaimId::from(2u64);
        port.add_file(&claim(), "a.pdf", vec![1]).await;
        port.add_file(&other, "b.pdf", vec![2]).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);
        mgr.select_files(SelectionBuilder::new().file("pending.txt").build());

        let list = assert_completed(mgr.list_attachments(&other).await);

        assert_eq!(list[0].display_name(), "b.pdf");
        assert_eq!(mgr.current_claim(), Some(other));
        assert!(mgr.pending_selection().is_empty());
    }

    #[tokio::test]
    async fn test_close_clears_state() {
        let port = Arc::new(MockClaimsApi::new());
        port.add_file(&claim(), "a.pdf", vec![1]).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);

        mgr.close();

        let view = mgr.snapshot();
        assert_eq!(view.claim_id, None);
        assert!(view.list.data.is_empty());
        assert_eq!(view.list.phase, LoadPhase::Idle);
    }

    #[tokio::test]
    async fn test_list_resolving_after_close_is_stale() {
        let port = Arc::new(MockClaimsApi::new());
        port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let mgr = Arc::new(manager(&port));
        let gate = port.hold(MockOperation::FetchAttachments);

        let pending = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.open(&claim()).await })
        };
        gate.entered().await;
        mgr.close();
        gate.release();

        assert_eq!(pending.await.unwrap(), Outcome::Stale);
        let view = mgr.snapshot();
        assert_eq!(view.claim_id, None);
        assert!(view.list.data.is_empty());
        assert_eq!(view.list.phase, LoadPhase::Idle);
    }

    #[tokio::test]
    async fn test_dropped_list_request_never_sticks_loading() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = Arc::new(manager(&port));
        let gate = port.hold(MockOperation::FetchAttachments);

        let pending = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.open(&claim()).await })
        };
        gate.entered().await;
        assert!(mgr.snapshot().list.is_loading());

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert_settled(&mgr.snapshot().list);
    }
}

// ============================================================================
// Upload Tests
// ============================================================================

mod upload_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_upload_makes_no_calls() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = manager(&port);

        assert_rejected(
            mgr.upload_attachments(&claim(), Vec::new()).await,
            ValidationError::EmptySelection,
        );
        assert_rejected(mgr.upload_selected().await, ValidationError::EmptySelection);
        assert_eq!(port.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_refreshes_from_server() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);

        let receipt = assert_completed(
            mgr.upload_attachments(&claim(), SelectionBuilder::new().photos(2).build())
                .await,
        );

        assert_eq!(receipt.requested, 2);
        assert_eq!(receipt.accepted, Some(2));
        assert_eq!(receipt.notice, "2 of 2 file(s) uploaded");
        assert_eq!(receipt.listing.attachments.len(), 2);
        assert!(receipt.listing.refresh_error.is_none());
        assert_eq!(mgr.attachments().len(), 2);
        assert_eq!(port.calls(MockOperation::Upload), 1);
        assert_eq!(port.calls(MockOperation::FetchAttachments), 2);
        assert_eq!(mgr.snapshot().last_notice.as_deref(), Some("2 of 2 file(s) uploaded"));
    }

    #[tokio::test]
    async fn test_bare_upload_response_still_counts() {
        let port = Arc::new(MockClaimsApi::new().without_envelope());
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);

        let receipt = assert_completed(
            mgr.upload_attachments(&claim(), SelectionBuilder::new().file("a.txt").build())
                .await,
        );
        assert_eq!(receipt.accepted, Some(1));
    }

    #[tokio::test]
    async fn test_selection_cleared_only_on_success() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);
        mgr.select_files(SelectionBuilder::new().file("a.txt").file("b.txt").build());
        assert!(mgr.can_upload());

        port.fail(MockOperation::Upload, MockFailure::Status(500, "boom".into())).await;
        let message = assert_failed(mgr.upload_selected().await, FailureKind::Transport);
        assert_eq!(message, "Error uploading files: HTTP 500: boom");
        assert_eq!(mgr.pending_selection(), vec!["a.txt".to_string(), "b.txt".to_string()]);
        assert!(mgr.snapshot().last_error.is_some());

        port.recover(MockOperation::Upload).await;
        assert_completed(mgr.upload_selected().await);
        assert!(mgr.pending_selection().is_empty());
        assert!(!mgr.can_upload());
        assert!(mgr.snapshot().last_error.is_none());
    }

    #[tokio::test]
    async fn test_rejected_envelope_is_a_failure() {
        let port = Arc::new(MockClaimsApi::new());
        port.fail(MockOperation::Upload, MockFailure::Unsuccessful("file too large".into())).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);

        let message = assert_failed(
            mgr.upload_attachments(&claim(), SelectionBuilder::new().file("a.txt").build())
                .await,
            FailureKind::Transport,
        );
        assert!(message.contains("file too large"));
        assert!(port.stored_files(&claim()).await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_uploads_are_serialized() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = Arc::new(manager(&port));
        assert_completed(mgr.open(&claim()).await);
        let gate = port.hold(MockOperation::Upload);

        let first = {
            let mgr = mgr.clone();
            let files = SelectionBuilder::new().file("first.txt").build();
            tokio::spawn(async move { mgr.upload_attachments(&claim(), files).await })
        };
        gate.entered().await;
        assert!(mgr.snapshot().busy);

        assert_rejected(
            mgr.upload_attachments(&claim(), SelectionBuilder::new().file("second.txt").build())
                .await,
            ValidationError::MutationInFlight { claim_id: claim() },
        );
        assert_rejected(
            mgr.delete_attachment(&claim(), &AttachmentId::from("x"), &|_: &str| true)
                .await,
            ValidationError::MutationInFlight { claim_id: claim() },
        );

        gate.release();
        assert_completed(first.await.unwrap());
        assert_eq!(port.calls(MockOperation::Upload), 1);
        assert_eq!(port.calls(MockOperation::Delete), 0);
        assert_eq!(port.stored_files(&claim()).await, vec!["first.txt".to_string()]);
        assert!(!mgr.snapshot().busy);
    }

    #[tokio::test]
    async fn test_other_claims_are_not_blocked() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = Arc::new(manager(&port));
        let gate = port.hold(MockOperation::Upload);

        let first = {
            let mgr = mgr.clone();
            let files = SelectionBuilder::new().file("a.txt").build();
            tokio::spawn(async move { mgr.upload_attachments(&claim(), files).await })
        };
        gate.entered().await;

        let other = ClaimId::from(2u64);
        assert_completed(
            mgr.upload_attachments(&other, SelectionBuilder::new().file("b.txt").build())
                .await,
        );
        gate.release();
        assert_completed(first.await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_completing_after_close_is_stale() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = Arc::new(manager(&port));
        assert_completed(mgr.open(&claim()).await);
        let gate = port.hold(MockOperation::Upload);

        let pending = {
            let mgr = mgr.clone();
            let files = SelectionBuilder::new().file("late.txt").build();
            tokio::spawn(async move { mgr.upload_attachments(&claim(), files).await })
        };
        gate.entered().await;
        mgr.close();
        gate.release();

        assert_eq!(pending.await.unwrap(), Outcome::Stale);
        let view = mgr.snapshot();
        assert_eq!(view.last_notice, None);
        assert!(view.list.data.is_empty());
        assert_eq!(port.stored_files(&claim()).await, vec!["late.txt".to_string()]);
    }
}

// ============================================================================
// Delete Tests
// ============================================================================

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_declined_delete_makes_no_call() {
        let port = Arc::new(MockClaimsApi::new());
        let id = port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);
        let prompts = Mutex::new(Vec::new());

        let outcome = mgr
            .delete_attachment(&claim(), &id, &|prompt: &str| {
                prompts.lock().unwrap().push(prompt.to_string());
                false
            })
            .await;

        assert_rejected(
            outcome,
            ValidationError::Unconfirmed {
                filename: "roof.jpg".to_string(),
            },
        );
        assert_eq!(*prompts.lock().unwrap(), vec!["Delete roof.jpg?".to_string()]);
        assert_eq!(port.calls(MockOperation::Delete), 0);
        assert_eq!(mgr.attachments().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_list_reflects_removal() {
        let port = Arc::new(MockClaimsApi::new());
        let keep = port.add_file(&claim(), "keep.pdf", vec![1]).await;
        let drop = port.add_file(&claim(), "drop.pdf", vec![2]).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);

        let receipt = assert_completed(mgr.delete_attachment(&claim(), &drop, &|_: &str| true).await);

        assert_eq!(receipt.notice, "File deleted");
        assert_eq!(receipt.listing.attachments.len(), 1);
        assert_eq!(receipt.listing.attachments[0].id, keep);

        let listed = assert_completed(mgr.list_attachments(&claim()).await);
        assert_eq!(listed.len(), 1);
        assert_eq!(port.stored_files(&claim()).await, vec!["keep.pdf".to_string()]);
        assert_eq!(mgr.snapshot().last_notice.as_deref(), Some("File deleted"));
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_list_intact() {
        let port = Arc::new(MockClaimsApi::new());
        let id = port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);
        port.fail(MockOperation::Delete, MockFailure::Status(403, "forbidden".into())).await;

        let message = assert_failed(
            mgr.delete_attachment(&claim(), &id, &|_: &str| true).await,
            FailureKind::Transport,
        );

        assert!(message.starts_with("Error deleting file"));
        assert_eq!(mgr.attachments().len(), 1);
        assert_eq!(mgr.snapshot().list.phase, LoadPhase::Ready);
    }

    #[tokio::test]
    async fn test_delete_completing_after_close_is_stale() {
        let port = Arc::new(MockClaimsApi::new());
        let id = port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let mgr = Arc::new(manager(&port));
        assert_completed(mgr.open(&claim()).await);
        let gate = port.hold(MockOperation::Delete);

        let pending = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.delete_attachment(&claim(), &id, &|_: &str| true).await })
        };
        gate.entered().await;
        mgr.close();
        gate.release();

        assert_eq!(pending.await.unwrap(), Outcome::Stale);
        assert_eq!(mgr.snapshot().last_notice, None);
        assert!(mgr.attachments().is_empty());
        assert!(port.stored_files(&claim()).await.is_empty());
        assert_eq!(port.calls(MockOperation::FetchAttachments), 1);
    }

    #[tokio::test]
    async fn test_delete_completing_after_switch_is_stale() {
        let port = Arc::new(MockClaimsApi::new());
        let id = port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let other = ClaimId::from(2u64);
        port.add_file(&other, "other.pdf", vec![2]).await;
        let mgr = Arc::new(manager(&port));
        assert_completed(mgr.open(&claim()).await);
        let gate = port.hold(MockOperation::Delete);

        let pending = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.delete_attachment(&claim(), &id, &|_: &str| true).await })
        };
        gate.entered().await;
        assert_completed(mgr.open(&other).await);
        gate.release();

        assert_eq!(pending.await.unwrap(), Outcome::Stale);
        assert_eq!(mgr.current_claim(), Some(other));
        assert_eq!(mgr.attachments().len(), 1);
        assert_eq!(mgr.attachments()[0].display_name(), "other.pdf");
    }

    #[tokio::test]
    async fn test_delete_prompt_falls_back_to_id() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = manager(&port);
        let missing = AttachmentId::from("f-9");

        assert_rejected(
            mgr.delete_attachment(&claim(), &missing, &|_: &str| false).await,
            ValidationError::Unconfirmed {
                filename: "f-9".to_string(),
            },
        );
    }
}

// ============================================================================
// Reads Overlapping Mutations
// ============================================================================

mod overlap_tests {
    use super::*;

    fn cached_names(mgr: &AttachmentManager) -> Vec<String> {
        mgr.attachments()
            .iter()
            .map(|attachment| attachment.display_name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_reopen_during_upload_still_refreshes() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = Arc::new(manager(&port));
        assert_completed(mgr.open(&claim()).await);
        let gate = port.hold(MockOperation::Upload);

        let pending = {
            let mgr = mgr.clone();
            let files = SelectionBuilder::new().file("a.txt").build();
            tokio::spawn(async move { mgr.upload_attachments(&claim(), files).await })
        };
        gate.entered().await;
        assert!(assert_completed(mgr.open(&claim()).await).is_empty());
        gate.release();

        let receipt = assert_completed(pending.await.unwrap());
        assert_eq!(receipt.notice, "1 of 1 file(s) uploaded");
        assert_eq!(cached_names(&mgr), port.stored_files(&claim()).await);
        assert_eq!(cached_names(&mgr), vec!["a.txt".to_string()]);
        assert_eq!(mgr.snapshot().last_notice.as_deref(), Some("1 of 1 file(s) uploaded"));
    }

    #[tokio::test]
    async fn test_close_and_reopen_during_delete_still_refreshes() {
        let port = Arc::new(MockClaimsApi::new());
        let id = port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let mgr = Arc::new(manager(&port));
        assert_completed(mgr.open(&claim()).await);
        let gate = port.hold(MockOperation::Delete);

        let pending = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.delete_attachment(&claim(), &id, &|_: &str| true).await })
        };
        gate.entered().await;
        mgr.close();
        assert_eq!(assert_completed(mgr.open(&claim()).await).len(), 1);
        gate.release();

        let receipt = assert_completed(pending.await.unwrap());
        assert!(receipt.listing.attachments.is_empty());
        assert!(mgr.attachments().is_empty());
        assert_eq!(mgr.snapshot().list.phase, LoadPhase::Ready);
    }

    #[tokio::test]
    async fn test_list_superseding_refresh_keeps_upload_completed() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = Arc::new(manager(&port));
        assert_completed(mgr.open(&claim()).await);
        let gate = port.hold(MockOperation::FetchAttachments);

        let pending = {
            let mgr = mgr.clone();
            let files = SelectionBuilder::new().file("a.txt").build();
            tokio::spawn(async move { mgr.upload_attachments(&claim(), files).await })
        };
        gate.entered().await;
        let listed = assert_completed(mgr.list_attachments(&claim()).await);
        assert_eq!(listed.len(), 1);
        gate.release();

        let receipt = assert_completed(pending.await.unwrap());
        assert_eq!(receipt.accepted, Some(1));
        assert_eq!(receipt.listing.attachments.len(), 1);
        assert_eq!(receipt.listing.refresh_error, None);
        assert_eq!(cached_names(&mgr), vec!["a.txt".to_string()]);
        assert_eq!(mgr.snapshot().list.phase, LoadPhase::Ready);
    }
}

// ============================================================================
// Download Tests
// ============================================================================

mod download_tests {
    use super::*;

    #[tokio::test]
    async fn test_download_uses_original_filename() {
        let port = Arc::new(MockClaimsApi::new());
        let id = port.add_file(&claim(), "roof.jpg", vec![7, 8, 9]).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);
        let sink = MemorySink::default();

        let saved = assert_completed(mgr.download_attachment(&claim(), &id, &sink).await);

        assert_eq!(saved.filename, "roof.jpg");
        assert_eq!(saved.size_bytes, 3);
        assert_eq!(
            *sink.saved.lock().unwrap(),
            vec![("roof.jpg".to_string(), vec![7, 8, 9])]
        );
    }

    #[tokio::test]
    async fn test_download_without_cache_uses_server_name() {
        let port = Arc::new(MockClaimsApi::new());
        let id = port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let mgr = manager(&port);
        let sink = MemorySink::default();

        let saved = assert_completed(mgr.download_attachment(&claim(), &id, &sink).await);

        assert!(saved.filename.ends_with("-roof.jpg"));
    }

    #[tokio::test]
    async fn test_download_save_failure() {
        let port = Arc::new(MockClaimsApi::new());
        let id = port.add_file(&claim(), "roof.jpg", vec![1]).await;
        let mgr = manager(&port);
        assert_completed(mgr.open(&claim()).await);

        let message = assert_failed(
            mgr.download_attachment(&claim(), &id, &FullDisk).await,
            FailureKind::LocalSave,
        );
        assert!(message.contains("roof.jpg"));
        assert!(message.contains("no space left"));
    }

    #[tokio::test]
    async fn test_download_missing_file_fails() {
        let port = Arc::new(MockClaimsApi::new());
        let mgr = manager(&port);
        let sink = MemorySink::default();

        assert_failed(
            mgr.download_attachment(&claim(), &AttachmentId::from("nope"), &sink)
                .await,
            FailureKind::Transport,
        );
        assert!(sink.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn test_payload_debug_hides_bytes() {
        let payload = FilePayload::new("a.bin", vec![0u8; 4096]);
        let rendered = format!("{:?}", payload);
        assert!(rendered.contains("4096"));
        assert!(rendered.len() < 200);
    }
}
