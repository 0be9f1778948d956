//! # REST API for Monthly Allocations
//!
//! Read-only view of which reward each day of a month holds.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;

use super::{error_response, parse_track_month};
use crate::backend::io::rest::mappers::RewardMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:track/:year/:month", get(get_allocation))
}

/// Get the allocation of a track for a month, computing it on first access
pub async fn get_allocation(
    State(state): State<AppState>,
    Path((track, year, month)): Path<(String, i32, u32)>,
) -> impl IntoResponse {
    info!("GET /api/allocations/{}/{}/{}", track, year, month);

    let (track, month) = match parse_track_month(&track, year, month) {
        Ok(parsed) => parsed,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state.reward_service.allocation(track, month).await {
        Ok(allocation) => {
            let response = RewardMapper::to_allocation_response(track, &allocation);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error retrieving allocation", e),
    }
}
