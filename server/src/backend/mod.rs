//! # Backend Module
//!
//! Everything behind the HTTP port of the daily rewards server.
//!
//! ## Architecture
//!
//! ```text
//! Game server plugin / admin tools
//!     ↓
//! IO Layer (REST API, mappers)
//!     ↓
//! Domain Layer (reward service, scheduler, ledger, allocations)
//!     ↓
//! Storage Layer (YAML documents)
//! ```
//!
//! `initialize_backend` builds the single `RewardService` of the process and
//! the scheduler that consumes session and tick events. Handlers reach both
//! through `AppState`.

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::Router;
use log::info;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

use crate::backend::domain::models::RewardsConfig;
use crate::backend::domain::{
    Clock, LogNotifier, RewardNotifier, RewardScheduler, RewardService, SchedulerEvent, SystemClock,
};
use crate::backend::storage::{RewardStorage, YamlConnection, YamlRewardRepository};

/// Scheduler events buffered before senders start waiting
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shared state handed to every REST handler
#[derive(Clone)]
pub struct AppState {
    pub reward_service: Arc<RewardService>,
    pub scheduler_tx: mpsc::Sender<SchedulerEvent>,
}

/// The wired backend: handler state plus the scheduler and its event receiver
pub struct Backend {
    pub app_state: AppState,
    pub scheduler: RewardScheduler,
    pub events: mpsc::Receiver<SchedulerEvent>,
}

impl Backend {
    pub fn new(reward_service: Arc<RewardService>, notifier: Arc<dyn RewardNotifier>) -> Self {
        let (scheduler_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let scheduler = RewardScheduler::new(Arc::clone(&reward_service), notifier);
        Self {
            app_state: AppState {
                reward_service,
                scheduler_tx,
            },
            scheduler,
            events,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: RewardsConfig) -> Result<Backend> {
    info!("Setting up storage in {}", config.data_directory.display());
    let connection = YamlConnection::new(&config.data_directory)?;
    let storage: Arc<dyn RewardStorage> = Arc::new(YamlRewardRepository::new(connection));

    info!("Setting up domain model");
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let reward_service = Arc::new(RewardService::new(Arc::new(config), clock, storage));

    let month = reward_service.current_month();
    reward_service
        .warm_up(month)
        .await
        .with_context(|| format!("Failed to load stored rewards for {}", month))?;

    info!("Setting up application state");
    Ok(Backend::new(reward_service, Arc::new(LogNotifier)))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", io::api_router())
        .layer(cors)
        .with_state(app_state)
}
