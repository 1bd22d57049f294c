//! Bid handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use solo_models::{Bid, BidStatus, NewBid};
use solo_store::UpdateOutcome;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /add-bid — place a bid.
///
/// Returns 400 when this bidder already has a bid on the job. The job's
/// bid counter is incremented as part of the same workflow.
pub async fn add_bid(
    State(state): State<AppState>,
    Json(payload): Json<NewBid>,
) -> ApiResult<Json<Bid>> {
    payload.validate()?;
    let bid = state.bids.create(payload).await?;
    Ok(Json(bid))
}

/// GET /bids/:email — list bids placed by a bidder.
pub async fn bids_by_bidder(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Bid>>> {
    let bids = state.bids.list_by_bidder(&email).await?;
    Ok(Json(bids))
}

/// GET /bid-request/:email — list bids received by a buyer.
///
/// Protected: the verified session identity must equal the requested
/// email. The gate runs before the query, so a mismatch never touches
/// the store.
pub async fn bid_requests(
    State(state): State<AppState>,
    user: AuthUser,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Bid>>> {
    user.require_owner(&email)?;

    let bids = state.bids.list_by_buyer(&email).await?;
    Ok(Json(bids))
}

/// Body of PATCH /bid-status-update/:id.
#[derive(Debug, Deserialize)]
pub struct BidStatusUpdate {
    pub status: BidStatus,
}

/// PATCH /bid-status-update/:id — set a bid's status.
///
/// Transitions out of accepted/rejected are refused with 400.
pub async fn bid_status_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<BidStatusUpdate>,
) -> ApiResult<Json<UpdateOutcome>> {
    let outcome = state.bids.update_status(&id, payload.status).await?;
    Ok(Json(outcome))
}
