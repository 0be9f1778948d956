use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use log::{error, info};

use daily_rewards_server::backend::domain::scheduler::{spawn_ticker, SchedulerEvent};
use daily_rewards_server::backend::storage::ConfigRepository;
use daily_rewards_server::backend::{create_router, initialize_backend};

const CONFIG_ENV_VAR: &str = "DAILY_REWARDS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "daily_rewards.yaml";

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ConfigRepository::new(config_path()).load_or_create()?;
    let addr: SocketAddr = config
        .listen_address
        .parse()
        .with_context(|| format!("Invalid listen_address '{}'", config.listen_address))?;
    let check_interval = config.check_interval();

    let backend = initialize_backend(config).await?;
    let scheduler_tx = backend.app_state.scheduler_tx.clone();
    let scheduler = tokio::spawn(backend.scheduler.run(backend.events));
    let ticker = spawn_ticker(scheduler_tx.clone(), check_interval);

    let app = create_router(backend.app_state);

    info!("🚀 Starting daily rewards server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested");
        })
        .await?;

    ticker.abort();
    if scheduler_tx.send(SchedulerEvent::Shutdown).await.is_err() {
        error!("Reward scheduler already stopped");
    }
    scheduler.await?;

    info!("Daily rewards server stopped");
    Ok(())
}
