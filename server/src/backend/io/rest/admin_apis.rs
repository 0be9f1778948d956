//! # REST API for Reward Administration
//!
//! Resets and manual ledger edits for one track and month. Permission checks
//! are left to whatever sits in front of the server.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, post, put},
    Router,
};
use log::info;
use shared::{AdminActionResponse, DayRewardRequest, DayRewardResponse};

use super::{error_response, parse_track_month};
use crate::backend::io::rest::mappers::RewardMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:track/:year/:month/reset", post(reset_allocation))
        .route("/:track/:year/:month/players", delete(reset_ledger))
        .route("/:track/:year/:month/players/:player_id", delete(clear_player))
        .route(
            "/:track/:year/:month/players/:player_id/days",
            post(add_reward_day).delete(remove_last_reward_day),
        )
        .route(
            "/:track/:year/:month/players/:player_id/days/:day",
            put(set_reward_for_day),
        )
}

/// Discard the month's allocation so it is computed again
pub async fn reset_allocation(
    State(state): State<AppState>,
    Path((track, year, month)): Path<(String, i32, u32)>,
) -> impl IntoResponse {
    info!("POST /api/admin/{}/{}/{}/reset", track, year, month);

    let (track, month) = match parse_track_month(&track, year, month) {
        Ok(parsed) => parsed,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state.reward_service.reset_allocation(track, month).await {
        Ok(_) => {
            let response = AdminActionResponse {
                success_message: format!("Reset {} allocation for {}", track, month),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error resetting allocation", e),
    }
}

/// Remove every player's record of the month
pub async fn reset_ledger(
    State(state): State<AppState>,
    Path((track, year, month)): Path<(String, i32, u32)>,
) -> impl IntoResponse {
    info!("DELETE /api/admin/{}/{}/{}/players", track, year, month);

    let (track, month) = match parse_track_month(&track, year, month) {
        Ok(parsed) => parsed,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state.reward_service.reset_ledger(track, month).await {
        Ok(removed) => {
            let response = AdminActionResponse {
                success_message: format!(
                    "Reset {} {} records for {}",
                    removed, track, month
                ),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error resetting ledger", e),
    }
}

pub async fn clear_player(
    State(state): State<AppState>,
    Path((track, year, month, player_id)): Path<(String, i32, u32, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/admin/{}/{}/{}/players/{}", track, year, month, player_id);

    let (track, month) = match parse_track_month(&track, year, month) {
        Ok(parsed) => parsed,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state.reward_service.clear_player(track, month, &player_id).await {
        Ok(true) => {
            let response = AdminActionResponse {
                success_message: format!("Cleared {} rewards of {} for {}", track, player_id, month),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            format!("Player {} has no {} rewards for {}", player_id, track, month),
        )
            .into_response(),
        Err(e) => error_response("Error clearing player", e),
    }
}

/// Grant an item as the player's next day
pub async fn add_reward_day(
    State(state): State<AppState>,
    Path((track, year, month, player_id)): Path<(String, i32, u32, String)>,
    Json(request): Json<DayRewardRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/admin/{}/{}/{}/players/{}/days - request: {:?}",
        track, year, month, player_id, request
    );

    let (track, month) = match parse_track_month(&track, year, month) {
        Ok(parsed) => parsed,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let service = &state.reward_service;
    match service
        .add_reward_day(track, month, &player_id, &request.item)
        .await
    {
        Ok((day, item)) => {
            let response = DayRewardResponse {
                day,
                rewarded_days: day,
                slot: RewardMapper::to_slot_dto(&item),
                success_message: format!("Added day {} with {}", day, item),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("Error adding reward day", e),
    }
}

/// Replace the item of a day that was already rewarded
pub async fn set_reward_for_day(
    State(state): State<AppState>,
    Path((track, year, month, player_id, day)): Path<(String, i32, u32, String, u32)>,
    Json(request): Json<DayRewardRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/admin/{}/{}/{}/players/{}/days/{} - request: {:?}",
        track, year, month, player_id, day, request
    );

    let (track, month) = match parse_track_month(&track, year, month) {
        Ok(parsed) => parsed,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let service = &state.reward_service;
    match service
        .set_reward_for_day(track, month, &player_id, day, &request.item)
        .await
    {
        Ok(item) => {
            let rewarded_days = match service.player_record(track, month, &player_id).await {
                Ok(record) => record.rewarded_days,
                Err(e) => return error_response("Error reading player record", e),
            };
            let response = DayRewardResponse {
                day,
                rewarded_days,
                slot: RewardMapper::to_slot_dto(&item),
                success_message: format!("Set day {} to {}", day, item),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error setting reward day", e),
    }
}

/// Remove the latest rewarded day and its item
pub async fn remove_last_reward_day(
    State(state): State<AppState>,
    Path((track, year, month, player_id)): Path<(String, i32, u32, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/admin/{}/{}/{}/players/{}/days", track, year, month, player_id);

    let (track, month) = match parse_track_month(&track, year, month) {
        Ok(parsed) => parsed,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state
        .reward_service
        .remove_last_reward_day(track, month, &player_id)
        .await
    {
        Ok((remaining, removed)) => {
            let removed = removed.unwrap_or_default();
            let response = DayRewardResponse {
                day: remaining + 1,
                rewarded_days: remaining,
                slot: RewardMapper::to_slot_dto(&removed),
                success_message: format!("Removed day {} ({})", remaining + 1, removed),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error removing reward day", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::domain::models::{MonthKey, Track};
    use crate::backend::io::rest::test_support::{cyclic_config, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::{AdminActionResponse, AllocationResponse, DayRewardResponse, PlayerRewardsResponse, RewardSlot};

    const PLAYER_DAYS: &str = "/api/admin/general/2026/10/players/p1/days";

    #[tokio::test]
    async fn test_add_set_and_remove_days() {
        let app = test_app(cyclic_config()).await;

        let added: DayRewardResponse = app
            .json(Method::POST, PLAYER_DAYS, Some(json!({ "item": "minecraft:gold_ingot:3" })))
            .await;
        assert_eq!(added.day, 1);
        assert_eq!(added.rewarded_days, 1);
        assert_eq!(
            added.slot,
            RewardSlot::Item {
                item_id: "minecraft:gold_ingot".to_string(),
                count: 3
            }
        );

        let set: DayRewardResponse = app
            .json(
                Method::PUT,
                &format!("{}/1", PLAYER_DAYS),
                Some(json!({ "item": "daily_rewards:skip_day" })),
            )
            .await;
        assert_eq!(set.slot, RewardSlot::SkipDay);
        assert_eq!(set.rewarded_days, 1);

        let player: PlayerRewardsResponse = app
            .json(Method::GET, "/api/players/p1/rewards/general", None)
            .await;
        assert_eq!(player.granted_items, vec![RewardSlot::SkipDay]);
        assert!(player.rewarded_today);

        let removed: DayRewardResponse = app.json(Method::DELETE, PLAYER_DAYS, None).await;
        assert_eq!(removed.rewarded_days, 0);
        assert_eq!(removed.slot, RewardSlot::SkipDay);

        let (status, _) = app.request(Method::DELETE, PLAYER_DAYS, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_day_edits_validate_input() {
        let app = test_app(cyclic_config()).await;

        let (status, _) = app
            .request(
                Method::PUT,
                &format!("{}/2", PLAYER_DAYS),
                Some(json!({ "item": "minecraft:apple" })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .request(
                Method::PUT,
                &format!("{}/32", PLAYER_DAYS),
                Some(json!({ "item": "minecraft:apple" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .request(Method::POST, PLAYER_DAYS, Some(json!({ "item": "minecraft:apple:0" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .request(
                Method::POST,
                "/api/admin/general/2026/0/players/p1/days",
                Some(json!({ "item": "minecraft:apple" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clear_and_reset_ledger() {
        let app = test_app(cyclic_config()).await;
        let october = MonthKey::new(2026, 10).unwrap();
        for player in ["p1", "p2"] {
            app.state
                .reward_service
                .grant_next_reward(Track::General, october, player, "2026-10-05")
                .await
                .unwrap();
        }

        let cleared: AdminActionResponse = app
            .json(Method::DELETE, "/api/admin/general/2026/10/players/p1", None)
            .await;
        assert!(cleared.success_message.contains("p1"));

        let (status, _) = app
            .request(Method::DELETE, "/api/admin/general/2026/10/players/p1", None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let reset: AdminActionResponse = app
            .json(Method::DELETE, "/api/admin/general/2026/10/players", None)
            .await;
        assert!(reset.success_message.starts_with("Reset 1 "));

        let player: PlayerRewardsResponse = app
            .json(Method::GET, "/api/players/p2/rewards/general", None)
            .await;
        assert_eq!(player.rewarded_days, 0);
    }

    #[tokio::test]
    async fn test_reset_allocation_recomputes() {
        let mut config = cyclic_config();
        config.general.shuffle = true;
        let app = test_app(config).await;

        let before: AllocationResponse = app
            .json(Method::GET, "/api/allocations/general/2026/10", None)
            .await;
        let stored = app
            .env
            .connection
            .allocation_file_path(Track::General, MonthKey::new(2026, 10).unwrap());
        app.state.reward_service.flush().await.unwrap();
        assert!(stored.exists());

        let _: AdminActionResponse = app
            .json(Method::POST, "/api/admin/general/2026/10/reset", None)
            .await;
        assert!(!stored.exists());

        let after: AllocationResponse = app
            .json(Method::GET, "/api/allocations/general/2026/10", None)
            .await;
        assert_eq!(after.slots.len(), before.slots.len());
    }
}
