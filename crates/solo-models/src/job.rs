//! Job definitions.
//!
//! A job is a work request posted by a buyer. Besides the fields the
//! marketplace reasons about (title, category, deadline, owner, bid
//! counter), clients attach arbitrary descriptive fields; those are kept
//! verbatim in `extra` and round-trip untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Unique identifier for a job document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
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

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity that owns a job and receives bids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Buyer {
    /// Owner identity. Ownership checks compare this exact string.
    #[validate(email)]
    pub email: String,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// A posted job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID (assigned by the store on creation).
    #[serde(rename = "_id")]
    pub id: JobId,

    /// Job title (substring-searchable).
    pub title: String,

    /// Category (exact-match filterable).
    pub category: String,

    /// Submission deadline.
    pub deadline: NaiveDate,

    /// Owner identity.
    pub buyer: Buyer,

    /// Number of bids placed on this job. Maintained by the bid-creation
    /// workflow only; never writable through a job update.
    #[serde(default)]
    pub bid_count: u32,

    /// Additional descriptive fields supplied by the creator
    /// (description, price range, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating a job.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewJob {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,

    pub deadline: NaiveDate,

    #[validate(nested)]
    pub buyer: Buyer,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
