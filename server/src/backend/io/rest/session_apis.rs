//! # REST API for Player Sessions
//!
//! The game server reports joins and leaves here. Both are forwarded to the
//! scheduler loop as events and answered before the scheduler has run them.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use log::{error, info};
use shared::{JoinSessionRequest, LeaveSessionRequest, SessionResponse};

use crate::backend::domain::scheduler::SchedulerEvent;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/join", post(join_session))
        .route("/leave", post(leave_session))
}

pub async fn join_session(
    State(state): State<AppState>,
    Json(request): Json<JoinSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/sessions/join - request: {:?}", request);

    if request.player_id.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "player_id cannot be empty").into_response();
    }

    let message = format!("Player {} joined", request.player_name);
    let event = SchedulerEvent::PlayerJoined {
        player_id: request.player_id,
        player_name: request.player_name,
    };
    forward(&state, event, message).await
}

pub async fn leave_session(
    State(state): State<AppState>,
    Json(request): Json<LeaveSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/sessions/leave - request: {:?}", request);

    let message = format!("Player {} left", request.player_id);
    let event = SchedulerEvent::PlayerLeft {
        player_id: request.player_id,
    };
    forward(&state, event, message).await
}

async fn forward(state: &AppState, event: SchedulerEvent, success_message: String) -> axum::response::Response {
    match state.scheduler_tx.send(event).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(SessionResponse { success_message })).into_response(),
        Err(e) => {
            error!("Scheduler is not running, dropped {:?}", e.0);
            (StatusCode::SERVICE_UNAVAILABLE, "Reward scheduler is not running").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::domain::scheduler::SchedulerEvent;
    use crate::backend::io::rest::test_support::{cyclic_config, test_app, TestApp};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_join_and_leave_are_forwarded() {
        let mut app = test_app(cyclic_config()).await;

        let (status, _) = app
            .request(
                Method::POST,
                "/api/sessions/join",
                Some(json!({ "player_id": "p1", "player_name": "Alex" })),
            )
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, _) = app
            .request(Method::POST, "/api/sessions/leave", Some(json!({ "player_id": "p1" })))
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        assert_eq!(
            app.events.recv().await,
            Some(SchedulerEvent::PlayerJoined {
                player_id: "p1".to_string(),
                player_name: "Alex".to_string()
            })
        );
        assert_eq!(
            app.events.recv().await,
            Some(SchedulerEvent::PlayerLeft {
                player_id: "p1".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_join_without_player_id_is_rejected() {
        let app = test_app(cyclic_config()).await;
        let (status, _) = app
            .request(
                Method::POST,
                "/api/sessions/join",
                Some(json!({ "player_id": " ", "player_name": "Alex" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_join_fails_when_scheduler_stopped() {
        let TestApp {
            env: _env,
            events,
            router,
            ..
        } = test_app(cyclic_config()).await;
        drop(events);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/sessions/join")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "player_id": "p1", "player_name": "Alex" }).to_string(),
            ))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
