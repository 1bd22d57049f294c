//! Shared data models for the SoloSphere backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs posted by buyers
//! - Bids placed by bidders and their status lifecycle
//! - Request payloads with validation rules

pub mod bid;
pub mod job;

// Re-export common types
pub use bid::{Bid, BidId, BidStatus, NewBid};
pub use job::{Buyer, Job, JobId, NewJob};
