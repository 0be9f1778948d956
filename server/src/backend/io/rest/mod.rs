//! # REST API Interface Layer
//!
//! HTTP endpoints of the daily rewards server, nested under `/api`:
//!
//! - `/allocations`: a month's reward allocation per track
//! - `/players`: a player's ledger and taking granted rewards
//! - `/sessions`: join/leave notifications that drive the scheduler
//! - `/admin`: resets and manual ledger edits
//!
//! Domain validation errors (`RewardError`) become 4xx responses; anything else
//! is logged and reported as 500.

pub mod admin_apis;
pub mod allocation_apis;
pub mod mappers;
pub mod player_apis;
pub mod session_apis;

#[cfg(test)]
pub mod test_support;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use log::error;

use crate::backend::domain::models::{MonthKey, RewardError, Track};
use crate::backend::AppState;

/// All API routes, to be nested under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/allocations", allocation_apis::router())
        .nest("/players", player_apis::router())
        .nest("/sessions", session_apis::router())
        .nest("/admin", admin_apis::router())
}

/// Parse the `{track}/{year}/{month}` path segments shared by several routes
pub fn parse_track_month(track: &str, year: i32, month: u32) -> Result<(Track, MonthKey), RewardError> {
    Ok((track.parse()?, MonthKey::new(year, month)?))
}

pub fn reward_error_status(error: &RewardError) -> StatusCode {
    match error {
        RewardError::DayNotRewarded(_) | RewardError::NothingRewarded => StatusCode::NOT_FOUND,
        RewardError::MonthComplete(_) => StatusCode::CONFLICT,
        RewardError::InvalidMonth(_)
        | RewardError::InvalidMonthKey(_)
        | RewardError::UnknownTrack(_)
        | RewardError::EmptyItemSpec
        | RewardError::InvalidItemCount(_)
        | RewardError::UnknownItem(_)
        | RewardError::InvalidDay { .. } => StatusCode::BAD_REQUEST,
    }
}

/// Map a service error to a response, logging failures that are not the caller's fault
pub fn error_response(context: &str, e: anyhow::Error) -> Response {
    match e.downcast_ref::<RewardError>() {
        Some(reward_error) => (reward_error_status(reward_error), reward_error.to_string()).into_response(),
        None => {
            error!("{}: {:#}", context, e);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string()).into_response()
        }
    }
}
