//! Document store and typed repositories for the SoloSphere backend.
//!
//! This crate provides:
//! - An in-process document store addressed by collection name and
//!   query predicate, with store-level uniqueness and atomic increments
//! - Typed repositories over the "jobs" and "bids" collections
//! - The listing query builder translating search/filter/sort parameters

pub mod bids;
pub mod error;
pub mod jobs;
pub mod query;
pub mod store;

pub use bids::BidRepository;
pub use error::{StoreError, StoreResult};
pub use jobs::JobRepository;
pub use query::{DeadlineOrder, JobQuery};
pub use store::{
    from_document, to_document, DeleteOutcome, Document, Filter, Sort, SortDirection, Store,
    UpdateOutcome, BIDS_COLLECTION, JOBS_COLLECTION,
};
