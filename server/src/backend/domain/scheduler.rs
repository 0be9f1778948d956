//! Reward scheduler.
//!
//! A single task consumes `SchedulerEvent`s from an mpsc channel, so ticks
//! never overlap. For every online player and track it runs a small state
//! machine:
//!
//! ```text
//! Idle ──online time reached──▶ Due ──slot granted──▶ Granted
//!   ▲                                                    │
//!   └───────────────────── date changes ─────────────────┘
//! ```
//!
//! `Ineligible` is entered on the special track when the allow-list denies the
//! player and is only left when the month changes.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::backend::domain::models::{LedgerKey, MonthKey, Track};
use crate::backend::domain::notifier::RewardNotifier;
use crate::backend::domain::reward_service::RewardService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    PlayerJoined { player_id: String, player_name: String },
    PlayerLeft { player_id: String },
    Tick { elapsed: Duration },
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardState {
    Idle,
    Due,
    Granted,
    Ineligible,
}

#[derive(Debug, Clone)]
struct PlayerSession {
    player_name: String,
    /// Online time counted towards the current date
    online: Duration,
    date: String,
    states: HashMap<Track, RewardState>,
}

impl PlayerSession {
    fn new(player_name: String, today: String) -> Self {
        Self {
            player_name,
            online: Duration::ZERO,
            date: today,
            states: Track::ALL.iter().map(|track| (*track, RewardState::Idle)).collect(),
        }
    }

    fn state(&self, track: Track) -> RewardState {
        self.states.get(&track).copied().unwrap_or(RewardState::Idle)
    }

    /// A new date starts a new day of online time
    fn roll_date(&mut self, today: &str) {
        if self.date == today {
            return;
        }
        self.date = today.to_string();
        self.online = Duration::ZERO;
        for state in self.states.values_mut() {
            if *state == RewardState::Granted {
                *state = RewardState::Idle;
            }
        }
    }

    fn reset_for_new_month(&mut self) {
        for state in self.states.values_mut() {
            if matches!(*state, RewardState::Ineligible | RewardState::Granted) {
                *state = RewardState::Idle;
            }
        }
    }
}

pub struct RewardScheduler {
    service: Arc<RewardService>,
    notifier: Arc<dyn RewardNotifier>,
    reward_time_per_day: Duration,
    sessions: HashMap<String, PlayerSession>,
    current_month: Option<MonthKey>,
}

impl RewardScheduler {
    pub fn new(service: Arc<RewardService>, notifier: Arc<dyn RewardNotifier>) -> Self {
        let reward_time_per_day = service.config().reward_time_per_day();
        Self {
            service,
            notifier,
            reward_time_per_day,
            sessions: HashMap::new(),
            current_month: None,
        }
    }

    /// Consume events until `Shutdown` or until every sender is dropped
    pub async fn run(mut self, mut receiver: mpsc::Receiver<SchedulerEvent>) {
        info!("⏰ Reward scheduler started");
        while let Some(event) = receiver.recv().await {
            if !self.handle_event(event).await {
                break;
            }
        }
        self.flush().await;
        info!("Reward scheduler stopped");
    }

    /// Apply one event. Returns false once the scheduler should stop.
    pub async fn handle_event(&mut self, event: SchedulerEvent) -> bool {
        match event {
            SchedulerEvent::PlayerJoined {
                player_id,
                player_name,
            } => self.on_join(player_id, player_name).await,
            SchedulerEvent::PlayerLeft { player_id } => {
                if self.sessions.remove(&player_id).is_some() {
                    debug!("Player {} left", player_id);
                }
            }
            SchedulerEvent::Tick { elapsed } => self.on_tick(elapsed).await,
            SchedulerEvent::Shutdown => {
                info!("Reward scheduler shutting down");
                return false;
            }
        }
        self.flush().await;
        true
    }

    pub fn player_state(&self, player_id: &str, track: Track) -> Option<RewardState> {
        self.sessions
            .get(player_id)
            .map(|session| session.state(track))
    }

    pub fn tracked_players(&self) -> Vec<String> {
        let mut players: Vec<String> = self.sessions.keys().cloned().collect();
        players.sort();
        players
    }

    async fn on_join(&mut self, player_id: String, player_name: String) {
        let month = self.service.current_month();
        self.enter_month(month).await;

        let today = self.service.clock().today();
        match self.sessions.get_mut(&player_id) {
            Some(session) => session.player_name = player_name,
            None => {
                info!("👋 Player {} ({}) joined", player_name, player_id);
                self.sessions
                    .insert(player_id.clone(), PlayerSession::new(player_name, today));
            }
        }

        for track in Track::ALL {
            let key = LedgerKey::new(track, month, player_id.as_str());
            if self.service.ledger().has_unclaimed_rewards(&key) {
                self.notifier.on_unclaimed_rewards(&player_id, track);
            }
        }
    }

    async fn on_tick(&mut self, elapsed: Duration) {
        let month = self.service.current_month();
        self.enter_month(month).await;
        let today = self.service.clock().today();

        let service = Arc::clone(&self.service);
        let notifier = Arc::clone(&self.notifier);
        let threshold = self.reward_time_per_day;

        for (player_id, session) in self.sessions.iter_mut() {
            session.roll_date(&today);
            session.online = session.online.saturating_add(elapsed);

            for track in Track::ALL {
                let current = session.state(track);
                let next = evaluate(
                    &service,
                    notifier.as_ref(),
                    player_id,
                    session,
                    track,
                    current,
                    month,
                    &today,
                    threshold,
                )
                .await;
                if next != current {
                    debug!(
                        "Player {} {} reward state {:?} -> {:?}",
                        player_id, track, current, next
                    );
                    session.states.insert(track, next);
                }
            }
        }
    }

    /// Load a month the first time it is seen and release month-bound states
    async fn enter_month(&mut self, month: MonthKey) {
        if self.current_month == Some(month) {
            return;
        }

        if let Err(e) = self.service.warm_up(month).await {
            error!("Failed to load stored rewards for {}: {:#}", month, e);
            return;
        }
        if self.current_month.is_some() {
            info!("📅 Month changed to {}", month);
            for session in self.sessions.values_mut() {
                session.reset_for_new_month();
            }
        }
        self.current_month = Some(month);
    }

    async fn flush(&self) {
        if let Err(e) = self.service.flush().await {
            error!("Failed to persist rewards: {:#}", e);
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn evaluate(
    service: &RewardService,
    notifier: &dyn RewardNotifier,
    player_id: &str,
    session: &PlayerSession,
    track: Track,
    state: RewardState,
    month: MonthKey,
    today: &str,
    threshold: Duration,
) -> RewardState {
    if state == RewardState::Ineligible || state == RewardState::Granted {
        return state;
    }

    if track == Track::Special && !service.gate().is_eligible(month, &session.player_name) {
        info!(
            "Player {} is not on the special reward list for {}",
            session.player_name, month
        );
        return RewardState::Ineligible;
    }

    let key = LedgerKey::new(track, month, player_id);
    if service.ledger().has_rewarded_today(&key, today) {
        return RewardState::Granted;
    }
    if state == RewardState::Idle && session.online < threshold {
        return RewardState::Idle;
    }

    match service.grant_next_reward(track, month, player_id, today).await {
        Ok(Some((day, item))) => {
            notifier.on_granted(player_id, track, day, &item);
            RewardState::Granted
        }
        Ok(None) => RewardState::Due,
        Err(e) => {
            warn!(
                "Could not grant {} reward to {}: {:#}",
                track, player_id, e
            );
            RewardState::Due
        }
    }
}

/// Send a `Tick` carrying the real elapsed time every `interval`
pub fn spawn_ticker(sender: mpsc::Sender<SchedulerEvent>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            ticker.tick().await;
            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;

            if sender.send(SchedulerEvent::Tick { elapsed }).await.is_err() {
                debug!("Scheduler channel closed, stopping ticker");
                break;
            }
        }
    })
}
