//! # REST API for Player Rewards
//!
//! A player's ledger for the current month, and taking a granted stack once
//! the game has handed it over.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;
use shared::TakeRewardResponse;

use super::error_response;
use crate::backend::domain::models::Track;
use crate::backend::io::rest::mappers::RewardMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:player_id/rewards/:track", get(get_player_rewards))
        .route("/:player_id/rewards/:track/:day/take", post(take_reward))
}

/// Get a player's ledger for the current month
pub async fn get_player_rewards(
    State(state): State<AppState>,
    Path((player_id, track)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("GET /api/players/{}/rewards/{}", player_id, track);

    let track: Track = match track.parse() {
        Ok(track) => track,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let service = &state.reward_service;
    let month = service.current_month();
    match service.player_record(track, month, &player_id).await {
        Ok(record) => {
            let today = service.clock().today();
            let response =
                RewardMapper::to_player_response(&player_id, track, month, &record, &today);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error retrieving player rewards", e),
    }
}

/// Mark the stack of a day as taken by the player
pub async fn take_reward(
    State(state): State<AppState>,
    Path((player_id, track, day)): Path<(String, String, u32)>,
) -> impl IntoResponse {
    info!("POST /api/players/{}/rewards/{}/{}/take", player_id, track, day);

    let track: Track = match track.parse() {
        Ok(track) => track,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state.reward_service.take_reward(track, &player_id, day).await {
        Ok(Some(stack)) => {
            let response = TakeRewardResponse {
                day,
                success_message: format!("Took {} from day {}", stack, day),
                item: Some(RewardMapper::to_item_dto(stack)),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => (
            StatusCode::CONFLICT,
            format!("Day {} has nothing left to take", day),
        )
            .into_response(),
        Err(e) => error_response("Error taking reward", e),
    }
}
