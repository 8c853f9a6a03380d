use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use tokio::{
    sync::{mpsc, oneshot, watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, Interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::models::{Difficulty, Point, Viewport};

use super::{
    hit_test::TapOutcome,
    session::{FinishedSession, GameSession, SessionSnapshot},
    simulator::MOTION_TICK,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

enum ControllerCommand {
    Start(Difficulty),
    Tap {
        point: Point,
        reply: oneshot::Sender<TapOutcome>,
    },
    FinishNow,
    Abandon,
    Resize(Viewport),
}

/// Maps the tokio clock onto wall-clock timestamps so paused-time tests stay exact.
struct SessionClock {
    origin: Instant,
    origin_utc: DateTime<Utc>,
}

impl SessionClock {
    fn start() -> Self {
        Self {
            origin: Instant::now(),
            origin_utc: Utc::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin_utc + elapsed
    }
}

/// Handle to the task that owns the running [`GameSession`].
///
/// All session mutation happens on that one task; ticks, spawns and taps are
/// serialized through a single `select!` loop.
#[derive(Clone)]
pub struct SessionController {
    commands: mpsc::UnboundedSender<ControllerCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    cancel_token: CancellationToken,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionController {
    /// Spawns the driver task. Completed sessions arrive on the returned receiver.
    pub fn spawn(viewport: Viewport) -> (Self, mpsc::UnboundedReceiver<FinishedSession>) {
        Self::with_session(GameSession::new(viewport))
    }

    pub fn with_session(
        session: GameSession<StdRng>,
    ) -> (Self, mpsc::UnboundedReceiver<FinishedSession>) {
        let debug_mode = std::env::var("SYNAPSEFLOW_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let heartbeat_every = if debug_mode { 1 } else { 10 };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        let cancel_token = CancellationToken::new();

        let handle = tokio::spawn(drive_session(
            session,
            command_rx,
            snapshot_tx,
            finished_tx,
            cancel_token.clone(),
            heartbeat_every,
        ));

        let controller = Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            cancel_token,
            worker: Arc::new(Mutex::new(Some(handle))),
        };
        (controller, finished_rx)
    }

    /// Starts a new session; a session already running is discarded first.
    pub fn start(&self, difficulty: Difficulty) -> Result<()> {
        self.send(ControllerCommand::Start(difficulty))
    }

    pub async fn tap(&self, point: Point) -> Result<TapOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ControllerCommand::Tap {
            point,
            reply: reply_tx,
        })?;
        reply_rx
            .await
            .map_err(|_| anyhow!("session driver dropped the tap reply"))
    }

    pub fn finish_now(&self) -> Result<()> {
        self.send(ControllerCommand::FinishNow)
    }

    /// Stops ticking and throws the session away; nothing is reported.
    pub fn abandon(&self) -> Result<()> {
        self.send(ControllerCommand::Abandon)
    }

    pub fn resize(&self, viewport: Viewport) -> Result<()> {
        self.send(ControllerCommand::Resize(viewport))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Cancels the driver and waits for it to exit.
    pub async fn shutdown(&self) -> Result<()> {
        self.cancel_token.cancel();
        if let Some(handle) = self.worker.lock().await.take() {
            handle
                .await
                .context("session driver task failed to join")
        } else {
            Ok(())
        }
    }

    fn send(&self, command: ControllerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("session driver is no longer running"))
    }
}

fn spawn_interval_for(difficulty: Difficulty) -> Interval {
    let mut interval = time::interval(difficulty.config().spawn_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn drive_session(
    mut session: GameSession<StdRng>,
    mut commands: mpsc::UnboundedReceiver<ControllerCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    finished: mpsc::UnboundedSender<FinishedSession>,
    cancel_token: CancellationToken,
    heartbeat_every: u32,
) {
    let clock = SessionClock::start();
    let mut motion = time::interval(MOTION_TICK);
    motion.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut spawner = spawn_interval_for(Difficulty::default());
    let mut ticks: u32 = 0;

    let deliver = |result: FinishedSession| {
        if finished.send(result).is_err() {
            log_warn!("finished session dropped: no receiver attached");
        }
    };

    loop {
        let running = session.is_running();

        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("session driver shutting down");
                break;
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    log_info!("session controller dropped; stopping driver");
                    break;
                };
                match command {
                    ControllerCommand::Start(difficulty) => {
                        session.start(difficulty, clock.now());
                        motion.reset();
                        // First tick of a fresh interval fires immediately: spawn right away.
                        spawner = spawn_interval_for(difficulty);
                        ticks = 0;
                    }
                    ControllerCommand::Tap { point, reply } => {
                        let outcome = session.tap(point, clock.now());
                        let _ = reply.send(outcome);
                    }
                    ControllerCommand::FinishNow => {
                        if let Some(result) = session.finish_now(clock.now()) {
                            deliver(result);
                        }
                    }
                    ControllerCommand::Abandon => session.abandon(),
                    ControllerCommand::Resize(viewport) => session.set_viewport(viewport),
                }
                snapshots.send_replace(session.snapshot());
            }
            _ = motion.tick(), if running => {
                if let Some(result) = session.tick(clock.now()) {
                    deliver(result);
                }

                ticks = ticks.wrapping_add(1);
                if ticks % heartbeat_every == 0 {
                    log_debug!(
                        "session heartbeat: {} ms left, score {}, {} neurons",
                        session.state().remaining_ms(),
                        session.score(),
                        session.neurons().len()
                    );
                }
                snapshots.send_replace(session.snapshot());
            }
            _ = spawner.tick(), if running => {
                session.spawn(clock.now());
                snapshots.send_replace(session.snapshot());
            }
        }
    }
}
