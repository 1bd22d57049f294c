//! Typed repository for job documents.

use serde_json::{Number, Value};
use tracing::info;

use solo_models::{Job, NewJob};

use crate::error::{StoreError, StoreResult};
use crate::query::JobQuery;
use crate::store::{
    from_document, to_document, DeleteOutcome, Document, Filter, Store, UpdateOutcome, ID_FIELD,
    JOBS_COLLECTION,
};

/// Repository for the "jobs" collection.
#[derive(Clone)]
pub struct JobRepository {
    store: Store,
}

impl JobRepository {
    /// Create a new job repository over an injected store handle.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Insert a job as given, with the bid counter forced to zero.
    pub async fn create(&self, new_job: NewJob) -> StoreResult<Job> {
        let mut doc = to_document(&new_job)?;
        doc.insert("bid_count".to_string(), Value::Number(Number::from(0)));

        let id = self.store.insert_one(JOBS_COLLECTION, doc).await;
        info!(job_id = %id, "Created job");

        let stored = self
            .store
            .find_by_id(JOBS_COLLECTION, &id)
            .await
            .ok_or_else(|| StoreError::not_found(format!("jobs/{id}")))?;
        from_document(stored)
    }

    /// List jobs matching the search/filter/sort parameters.
    pub async fn list(&self, query: &JobQuery) -> StoreResult<Vec<Job>> {
        let (filter, sort) = query.build();
        let docs = self.store.find(JOBS_COLLECTION, &filter, sort.as_ref()).await;
        docs.into_iter().map(from_document).collect()
    }

    /// List every job, storage-natural order.
    pub async fn list_all(&self) -> StoreResult<Vec<Job>> {
        self.list(&JobQuery::default()).await
    }

    /// List jobs owned by the given buyer email.
    pub async fn list_by_owner(&self, email: &str) -> StoreResult<Vec<Job>> {
        let filter = Filter::new().eq("buyer.email", email);
        let docs = self.store.find(JOBS_COLLECTION, &filter, None).await;
        docs.into_iter().map(from_document).collect()
    }

    /// Fetch a job by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Job>> {
        match self.store.find_by_id(JOBS_COLLECTION, id).await {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Merge-update a job, creating it under the given id when missing.
    ///
    /// The bid counter is owned by the bid-creation workflow, so it is
    /// stripped from the patch along with the id field. The merged
    /// document must still deserialize as a job; a patch that would
    /// leave an incomplete or malformed document is refused so it can
    /// never break every later read of the collection.
    pub async fn upsert(&self, id: &str, mut patch: Document) -> StoreResult<UpdateOutcome> {
        patch.remove("bid_count");
        patch.remove(ID_FIELD);

        let mut candidate = match self.store.find_by_id(JOBS_COLLECTION, id).await {
            Some(existing) => existing,
            None => {
                let mut doc = Document::new();
                doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
                doc
            }
        };
        candidate.extend(patch.clone());
        let _: Job = from_document(candidate).map_err(|e| {
            StoreError::precondition_failed(format!("job update would leave an invalid document: {e}"))
        })?;

        Ok(self.store.update_one(JOBS_COLLECTION, id, patch, true).await)
    }

    /// Delete a job by id. Missing ids report zero deleted; bids placed
    /// against the job are left in place.
    pub async fn delete(&self, id: &str) -> DeleteOutcome {
        self.store.delete_one(JOBS_COLLECTION, id).await
    }

    /// Atomically adjust the bid counter. `NotFound` when the job is gone.
    pub async fn increment_bid_count(&self, id: &str, delta: i64) -> StoreResult<i64> {
        self.store.increment(JOBS_COLLECTION, id, "bid_count", delta).await
    }
}
