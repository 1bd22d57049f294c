//! Bid definitions.
//!
//! A bid is an offer by a bidder against a specific job. At most one bid
//! may exist per (bidder email, job id) pair; the store enforces that at
//! insert time. Descriptive fields (price, comment, proposed deadline)
//! travel in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::job::JobId;

/// Unique identifier for a bid document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidId(pub String);

impl BidId {
    /// Generate a new random bid ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BidId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    /// Awaiting a decision by the job owner.
    #[default]
    Pending,
    /// Accepted by the job owner (terminal).
    Accepted,
    /// Rejected by the job owner (terminal).
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Pending => "pending",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
        }
    }

    /// Accepted and rejected admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BidStatus::Accepted | BidStatus::Rejected)
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    /// Unique bid ID (assigned by the store on creation).
    #[serde(rename = "_id")]
    pub id: BidId,

    /// The job this bid targets.
    #[serde(rename = "jobId")]
    pub job_id: JobId,

    /// Bidder identity (the wire name is `email`, matching what the
    /// client sends).
    pub email: String,

    /// The job owner's email, denormalized at creation time so that
    /// received-bid queries need no join.
    pub buyer: String,

    /// Lifecycle status.
    #[serde(default)]
    pub status: BidStatus,

    /// Descriptive fields (price, comment, proposed deadline, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating a bid.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewBid {
    #[serde(rename = "jobId")]
    pub job_id: JobId,

    #[validate(email)]
    pub email: String,

    #[validate(email)]
    pub buyer: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
