//! Typed repository for bid documents.
//!
//! Bid creation is the one correctness-critical region in the system: the
//! (bidder email, job id) uniqueness check and the insert share the bids
//! collection write lock, and the job's bid counter is a store-level
//! atomic increment. If the increment fails the inserted bid is removed
//! so the counter invariant never silently drifts.

use serde_json::Value;
use tracing::{info, warn};

use solo_models::{Bid, BidStatus, NewBid};

use crate::error::{StoreError, StoreResult};
use crate::store::{
    from_document, to_document, Document, Filter, Store, UpdateOutcome, BIDS_COLLECTION,
    JOBS_COLLECTION,
};

/// Repository for the "bids" collection.
#[derive(Clone)]
pub struct BidRepository {
    store: Store,
}

impl BidRepository {
    /// Create a new bid repository over an injected store handle.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Place a bid.
    ///
    /// Fails with `AlreadyExists` when the bidder already has a bid on
    /// this job, and with `NotFound` when the job is gone (in which case
    /// the just-inserted bid is rolled back).
    pub async fn create(&self, new_bid: NewBid) -> StoreResult<Bid> {
        let unique = Filter::new()
            .eq("email", new_bid.email.as_str())
            .eq("jobId", new_bid.job_id.as_str());

        let mut doc = to_document(&new_bid)?;
        if !doc.contains_key("status") {
            doc.insert(
                "status".to_string(),
                Value::String(BidStatus::Pending.as_str().to_string()),
            );
        }

        let job_id = new_bid.job_id.as_str().to_string();
        let id = self.store.insert_unique(BIDS_COLLECTION, &unique, doc).await?;

        if let Err(err) = self
            .store
            .increment(JOBS_COLLECTION, &job_id, "bid_count", 1)
            .await
        {
            warn!(bid_id = %id, job_id = %job_id, %err, "Bid counter update failed, rolling back bid");
            self.store.delete_one(BIDS_COLLECTION, &id).await;
            return Err(err);
        }

        info!(bid_id = %id, job_id = %job_id, bidder = %new_bid.email, "Created bid");

        let stored = self
            .store
            .find_by_id(BIDS_COLLECTION, &id)
            .await
            .ok_or_else(|| StoreError::not_found(format!("bids/{id}")))?;
        from_document(stored)
    }

    /// List bids placed by the given bidder email.
    pub async fn list_by_bidder(&self, email: &str) -> StoreResult<Vec<Bid>> {
        let filter = Filter::new().eq("email", email);
        let docs = self.store.find(BIDS_COLLECTION, &filter, None).await;
        docs.into_iter().map(from_document).collect()
    }

    /// List bids received by the given buyer email. Callers must have
    /// passed the ownership gate for this email already.
    pub async fn list_by_buyer(&self, email: &str) -> StoreResult<Vec<Bid>> {
        let filter = Filter::new().eq("buyer", email);
        let docs = self.store.find(BIDS_COLLECTION, &filter, None).await;
        docs.into_iter().map(from_document).collect()
    }

    /// Set a bid's status. Only pending bids may transition; accepted and
    /// rejected are terminal and yield `PreconditionFailed`.
    pub async fn update_status(&self, id: &str, status: BidStatus) -> StoreResult<UpdateOutcome> {
        let doc = self
            .store
            .find_by_id(BIDS_COLLECTION, id)
            .await
            .ok_or_else(|| StoreError::not_found(format!("bids/{id}")))?;

        let current: BidStatus = doc
            .get("status")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();
        if current.is_terminal() {
            return Err(StoreError::precondition_failed(format!(
                "bid is already {current}"
            )));
        }

        let mut patch = Document::new();
        patch.insert(
            "status".to_string(),
            Value::String(status.as_str().to_string()),
        );

        // Guard against a concurrent transition between the read above
        // and this write.
        let guard = Filter::new().eq("status", BidStatus::Pending.as_str());
        let outcome = self
            .store
            .update_one_matching(BIDS_COLLECTION, id, &guard, patch)
            .await;
        if outcome.matched == 0 {
            return Err(StoreError::precondition_failed(
                "bid status changed concurrently",
            ));
        }

        info!(bid_id = %id, status = %status, "Updated bid status");
        Ok(outcome)
    }
}
