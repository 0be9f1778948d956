//! Router wired to temporary storage and a fixed clock, for handler tests.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

use crate::backend::domain::calendar::FixedClock;
use crate::backend::domain::models::RewardsConfig;
use crate::backend::domain::notifier::LogNotifier;
use crate::backend::domain::reward_service::RewardService;
use crate::backend::domain::scheduler::SchedulerEvent;
use crate::backend::storage::yaml::test_utils::TestEnvironment;
use crate::backend::{create_router, AppState, Backend};

pub struct TestApp {
    pub env: TestEnvironment,
    pub clock: Arc<FixedClock>,
    pub state: AppState,
    pub events: mpsc::Receiver<SchedulerEvent>,
    pub router: Router,
}

/// App fixed on 2026-10-05
pub async fn test_app(config: RewardsConfig) -> TestApp {
    let env = TestEnvironment::new().await.unwrap();
    let clock = Arc::new(FixedClock::from_ymd(2026, 10, 5));
    let service = Arc::new(RewardService::with_rng(
        Arc::new(config),
        clock.clone(),
        env.storage(),
        StdRng::seed_from_u64(5),
    ));
    let backend = Backend::new(service, Arc::new(LogNotifier));
    let router = create_router(backend.app_state.clone());

    TestApp {
        env,
        clock,
        state: backend.app_state,
        events: backend.events,
        router,
    }
}

/// General track cycles bread and emerald in October, no fill items
pub fn cyclic_config() -> RewardsConfig {
    let mut config = RewardsConfig::default();
    config.general.use_fill_items = false;
    config.general.months.insert(
        10,
        vec!["minecraft:bread:8".to_string(), "minecraft:emerald".to_string()],
    );
    config
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    /// Issue a request that must succeed and decode its JSON body
    pub async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> T {
        let (status, bytes) = self.request(method, uri, body).await;
        assert!(
            status.is_success(),
            "{} returned {}: {}",
            uri,
            status,
            String::from_utf8_lossy(&bytes)
        );
        serde_json::from_slice(&bytes).unwrap()
    }
}
