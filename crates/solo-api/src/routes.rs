//! API routes.

use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::bids::{add_bid, bid_requests, bid_status_update, bids_by_bidder};
use crate::handlers::health::{health, root};
use crate::handlers::jobs::{
    add_job, all_jobs, all_jobs_tab, delete_job, get_job, jobs_by_owner, update_job,
};
use crate::handlers::session::{issue_token, logout};
use crate::middleware::{cors_layer, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/jwt", post(issue_token))
        .route("/logout", get(logout));

    let job_routes = Router::new()
        .route("/add-job", post(add_job))
        .route("/all-jobs", get(all_jobs))
        .route("/all-jobs-tab", get(all_jobs_tab))
        // GET reads the segment as a buyer email, DELETE as a job id;
        // axum requires one parameter name per path.
        .route("/jobs/:id", get(jobs_by_owner).delete(delete_job))
        .route("/job/:id", get(get_job))
        .route("/update-job/:id", put(update_job));

    let bid_routes = Router::new()
        .route("/add-bid", post(add_bid))
        .route("/bids/:email", get(bids_by_bidder))
        // Session + ownership gate, enforced in the handler before the
        // store is queried.
        .route("/bid-request/:email", get(bid_requests))
        .route("/bid-status-update/:id", patch(bid_status_update));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(session_routes)
        .merge(job_routes)
        .merge(bid_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
