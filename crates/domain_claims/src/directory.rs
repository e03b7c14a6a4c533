//! Claims Directory Service
//!
//! Loads the claim collection and the aggregate stats for the dashboard, and
//! single claims for the detail view. Each of the three is an independent
//! tracked fetch; a failure degrades that one to its empty default and leaves
//! the others alone.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use core_kernel::ClaimId;

use crate::claim::{Claim, NOT_AVAILABLE};
use crate::envelope::{expect_array, expect_object};
use crate::error::ClaimsError;
use crate::normalize::{normalize_claim, normalize_claims, normalize_stats};
use crate::ports::ClaimsApiPort;
use crate::state::{lock, Outcome, RequestGuard, Tracked, ViewState};
use crate::stats::ClaimsStats;

/// Renderable snapshot of the directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryView {
    pub claims: ViewState<Vec<Claim>>,
    pub stats: ViewState<ClaimsStats>,
    pub detail: ViewState<Option<Claim>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    claims: Tracked<Vec<Claim>>,
    stats: Tracked<ClaimsStats>,
    detail: Tracked<Option<Claim>>,
    detail_id: Option<ClaimId>,
}

fn claims_slot(state: &mut DirectoryState) -> &mut Tracked<Vec<Claim>> {
    &mut state.claims
}

fn stats_slot(state: &mut DirectoryState) -> &mut Tracked<ClaimsStats> {
    &mut state.stats
}

fn detail_slot(state: &mut DirectoryState) -> &mut Tracked<Option<Claim>> {
    &mut state.detail
}

pub struct ClaimsDirectory {
    port: Arc<dyn ClaimsApiPort>,
    state: Mutex<DirectoryState>,
}

impl ClaimsDirectory {
    pub fn new(port: Arc<dyn ClaimsApiPort>) -> Self {
        Self {
            port,
            state: Mutex::new(DirectoryState::default()),
        }
    }

    /// Loads claims and stats concurrently
    pub async fn open(&self) -> (Outcome<Vec<Claim>>, Outcome<ClaimsStats>) {
        tokio::join!(self.list_claims(), self.get_stats())
    }

    /// Fetches and normalizes the claim collection
    pub async fn list_claims(&self) -> Outcome<Vec<Claim>> {
        let guard = RequestGuard::begin(&self.state, claims_slot);
        let result = self.fetch_claims().await;
        if let Ok(claims) = &result {
            info!(count = claims.len(), epoch = guard.generation().value(), "Claims loaded");
        }
        settle(guard, result, "Error loading claims")
    }

    /// Fetches the aggregate totals
    pub async fn get_stats(&self) -> Outcome<ClaimsStats> {
        let guard = RequestGuard::begin(&self.state, stats_slot);
        let result = self.fetch_stats().await;
        settle(guard, result, "Error loading stats")
    }

    /// Fetches one claim for the detail view.
    ///
    /// Opening another claim, or closing the detail, before this resolves
    /// turns the response into [`Outcome::Stale`].
    pub async fn get_claim(&self, claim_id: &ClaimId) -> Outcome<Claim> {
        let Some(guard) = RequestGuard::try_begin(&self.state, detail_slot, |state| {
            state.detail_id = Some(claim_id.clone());
            true
        }) else {
            return Outcome::Stale;
        };
        debug!(claim_id = %claim_id, epoch = guard.generation().value(), "Loading claim");
        let result = self.fetch_claim(claim_id).await.map(Some);
        settle(guard, result, "Error loading claim").map(Option::unwrap_or_default)
    }

    /// Discards the detail view; an in-flight `get_claim` becomes stale
    pub fn close_detail(&self) {
        let mut state = lock(&self.state);
        state.detail.invalidate();
        state.detail_id = None;
    }

    pub fn claims(&self) -> Vec<Claim> {
        lock(&self.state).claims.view.data.clone()
    }

    pub fn stats(&self) -> ClaimsStats {
        lock(&self.state).stats.view.data.clone()
    }

    pub fn detail(&self) -> Option<Claim> {
        lock(&self.state).detail.view.data.clone()
    }

    /// Claims matching `term`, in stored order
    pub fn search(&self, term: &str) -> Vec<Claim> {
        let state = lock(&self.state);
        filter_claims(&state.claims.view.data, term)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> DirectoryView {
        let state = lock(&self.state);
        DirectoryView {
            claims: state.claims.view.clone(),
            stats: state.stats.view.clone(),
            detail: state.detail.view.clone(),
        }
    }

    async fn fetch_claims(&self) -> Result<Vec<Claim>, ClaimsError> {
        let payload = self.port.fetch_claims().await?;
        let items = expect_array(payload, "claim list")?;
        Ok(normalize_claims(&items))
    }

    async fn fetch_stats(&self) -> Result<ClaimsStats, ClaimsError> {
        let payload = self.port.fetch_stats().await?;
        let stats = expect_object(payload, "claim stats")?;
        Ok(normalize_stats(&stats))
    }

    async fn fetch_claim(&self, claim_id: &ClaimId) -> Result<Claim, ClaimsError> {
        let payload = self.port.fetch_claim(claim_id).await?;
        let raw = expect_object(payload, "claim")?;
        Ok(normalize_claim(&raw))
    }
}

fn settle<T: Default + Clone>(
    guard: RequestGuard<'_, DirectoryState, T>,
    result: Result<T, ClaimsError>,
    context: &str,
) -> Outcome<T> {
    match result {
        Ok(data) => {
            if guard.settle(Ok(data.clone())) {
                Outcome::Completed(data)
            } else {
                Outcome::Stale
            }
        }
        Err(err) => {
            warn!(error = %err, "{}", context);
            let notice = err.notice(context);
            if guard.settle(Err(notice.clone())) {
                Outcome::Failed(notice)
            } else {
                Outcome::Stale
            }
        }
    }
}

/// Claims whose policyholder name or claim number contains `term`,
/// ignoring case. A blank term matches everything.
pub fn filter_claims<'a>(claims: &'a [Claim], term: &str) -> Vec<&'a Claim> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return claims.iter().collect();
    }
    let matches = |value: &str| value != NOT_AVAILABLE && value.to_lowercase().contains(&needle);
    claims
        .iter()
        .filter(|claim| matches(&claim.policyholder.name) || matches(&claim.claim_number))
        .collect()
}
