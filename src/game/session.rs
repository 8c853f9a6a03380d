use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    metrics::SessionMetrics,
    models::{Difficulty, Neuron, Point, Viewport},
};

use super::{
    hit_test::{resolve_tap, TapOutcome},
    simulator::Simulator,
    state::{SessionState, SessionStatus},
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Messages accepted by [`GameSession::handle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionInput {
    Start(Difficulty),
    /// Fast motion/time tick.
    Tick,
    /// Spawn-period tick.
    Spawn,
    Tap(Point),
    FinishNow,
    Abandon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutput {
    None,
    Tap(TapOutcome),
    Finished(FinishedSession),
}

/// Frozen result of a session that ran to completion.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinishedSession {
    pub session_id: Uuid,
    pub difficulty: Difficulty,
    pub metrics: SessionMetrics,
    pub score: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// What a renderer needs to draw one frame.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub remaining_ms: u64,
    pub score: u32,
    pub neurons: Vec<Neuron>,
    pub correct_taps: u32,
    pub incorrect_taps: u32,
}

/// Single-owner session state machine: Idle -> Running -> Finished.
///
/// Nothing here reads a clock; every input carries its own timestamp so the
/// machine can be driven by real timers or by a synthetic sequence.
pub struct GameSession<R = StdRng> {
    state: SessionState,
    simulator: Simulator<R>,
    metrics: SessionMetrics,
    score: u32,
}

impl GameSession<StdRng> {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_rng(StdRng::from_entropy(), viewport)
    }

    pub fn seeded(seed: u64, viewport: Viewport) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), viewport)
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_rng(rng: R, viewport: Viewport) -> Self {
        Self {
            state: SessionState::new(),
            simulator: Simulator::new(rng, viewport),
            metrics: SessionMetrics::new(),
            score: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn neurons(&self) -> &[Neuron] {
        self.simulator.neurons()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.simulator.set_viewport(viewport);
    }

    pub fn handle(&mut self, input: SessionInput, at: DateTime<Utc>) -> SessionOutput {
        match input {
            SessionInput::Start(difficulty) => {
                self.start(difficulty, at);
                SessionOutput::None
            }
            SessionInput::Tick => self
                .tick(at)
                .map_or(SessionOutput::None, SessionOutput::Finished),
            SessionInput::Spawn => {
                self.spawn(at);
                SessionOutput::None
            }
            SessionInput::Tap(point) => SessionOutput::Tap(self.tap(point, at)),
            SessionInput::FinishNow => self
                .finish_now(at)
                .map_or(SessionOutput::None, SessionOutput::Finished),
            SessionInput::Abandon => {
                self.abandon();
                SessionOutput::None
            }
        }
    }

    /// Starts a fresh session, discarding whatever ran before.
    pub fn start(&mut self, difficulty: Difficulty, at: DateTime<Utc>) {
        if self.is_running() {
            log_warn!(
                "Starting a new session while {:?} is still running; discarding it",
                self.state.session_id
            );
        }

        self.simulator.clear();
        self.metrics = SessionMetrics::new();
        self.score = 0;
        self.state.begin_session(difficulty, at);

        log_info!(
            "Session {:?} started on {} for {} ms",
            self.state.session_id,
            difficulty.as_str(),
            self.state.duration_ms
        );
    }

    /// Advances the clock, culls expired neurons and moves the rest.
    pub fn tick(&mut self, at: DateTime<Utc>) -> Option<FinishedSession> {
        if !self.is_running() {
            return None;
        }

        self.state.sync_elapsed(at);
        if self.state.remaining_ms() == 0 {
            return Some(self.finish(at));
        }

        self.simulator.purge_expired(at);
        self.simulator.advance(at);
        None
    }

    pub fn spawn(&mut self, at: DateTime<Utc>) -> Option<&Neuron> {
        if !self.is_running() {
            return None;
        }
        let config = self.state.difficulty.config();
        Some(self.simulator.spawn(&config, at, &mut self.metrics))
    }

    pub fn tap(&mut self, point: Point, at: DateTime<Utc>) -> TapOutcome {
        if !self.is_running() {
            return TapOutcome::Ignored;
        }
        resolve_tap(&mut self.simulator, &mut self.metrics, &mut self.score, point, at)
    }

    pub fn finish_now(&mut self, at: DateTime<Utc>) -> Option<FinishedSession> {
        if !self.is_running() {
            return None;
        }
        Some(self.finish(at))
    }

    /// Stops without producing a result. Metrics are dropped.
    pub fn abandon(&mut self) {
        if self.state.status == SessionStatus::Idle {
            return;
        }
        log_info!("Session {:?} abandoned", self.state.session_id);
        self.state.cancel();
        self.simulator.clear();
        self.metrics = SessionMetrics::new();
        self.score = 0;
    }

    /// The frozen result, available once the session has finished.
    pub fn finished_session(&self) -> Option<FinishedSession> {
        if self.state.status != SessionStatus::Finished {
            return None;
        }
        Some(FinishedSession {
            session_id: self.state.session_id?,
            difficulty: self.state.difficulty,
            metrics: self.metrics.clone(),
            score: self.score,
            started_at: self.state.started_at?,
            finished_at: self.state.finished_at?,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            remaining_ms: self.state.remaining_ms(),
            score: self.score,
            neurons: self.simulator.neurons().to_vec(),
            correct_taps: self.metrics.correct_taps,
            incorrect_taps: self.metrics.incorrect_taps,
        }
    }

    fn finish(&mut self, at: DateTime<Utc>) -> FinishedSession {
        self.state.finish(at);
        self.simulator.clear();

        log_info!(
            "Session {:?} finished: score {}, {} correct / {} signals, {} errors",
            self.state.session_id,
            self.score,
            self.metrics.correct_taps,
            self.metrics.total_signals,
            self.metrics.error_count
        );

        FinishedSession {
            session_id: self.state.session_id.unwrap_or_else(Uuid::nil),
            difficulty: self.state.difficulty,
            metrics: self.metrics.clone(),
            score: self.score,
            started_at: self.state.started_at.unwrap_or(at),
            finished_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).single().expect("valid instant")
    }

    fn ms(offset: i64) -> DateTime<Utc> {
        t0() + Duration::milliseconds(offset)
    }

    fn running(difficulty: Difficulty) -> GameSession {
        let mut session = GameSession::seeded(99, Viewport::new(400.0, 800.0));
        session.handle(SessionInput::Start(difficulty), t0());
        session
    }

    /// Spawns until a neuron of the wanted kind is on screen and returns its centre.
    fn spawn_until(session: &mut GameSession, signal: bool, at: DateTime<Utc>) -> Point {
        loop {
            let neuron = session.spawn(at).cloned().expect("session is running");
            if neuron.is_signal() == signal {
                return neuron.position;
            }
        }
    }

    #[test]
    fn starts_idle() {
        let session = GameSession::seeded(1, Viewport::default());
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.finished_session().is_none());
    }

    #[test]
    fn inputs_before_start_are_no_ops() {
        let mut session = GameSession::seeded(1, Viewport::default());
        assert_eq!(session.handle(SessionInput::Spawn, t0()), SessionOutput::None);
        assert_eq!(
            session.handle(SessionInput::Tap(Point::new(100.0, 100.0)), t0()),
            SessionOutput::Tap(TapOutcome::Ignored)
        );
        assert_eq!(session.handle(SessionInput::Tick, t0()), SessionOutput::None);
        assert_eq!(session.metrics(), &SessionMetrics::default());
    }

    #[test]
    fn ticking_past_duration_finishes() {
        let mut session = running(Difficulty::Hard);
        session.handle(SessionInput::Spawn, t0());

        let mut finished = None;
        let mut offset = 0;
        while finished.is_none() {
            offset += 100;
            let output = session.handle(SessionInput::Tick, ms(offset));
            if let SessionOutput::Finished(result) = output {
                finished = Some(result);
            }
        }

        assert_eq!(offset, 45_000);
        let finished = finished.expect("finished");
        assert_eq!(finished.difficulty, Difficulty::Hard);
        assert_eq!(finished.metrics.spawn_timestamps.len(), 1);
        assert_eq!(session.status(), SessionStatus::Finished);
        assert!(session.neurons().is_empty());
    }

    #[test]
    fn finished_session_is_frozen() {
        let mut session = running(Difficulty::Medium);
        let centre = spawn_until(&mut session, true, ms(0));
        let result = session.finish_now(ms(1_000)).expect("was running");

        assert_eq!(session.tap(centre, ms(1_100)), TapOutcome::Ignored);
        assert!(session.spawn(ms(1_200)).is_none());
        assert!(session.tick(ms(1_300)).is_none());
        assert!(session.finish_now(ms(1_400)).is_none());
        assert_eq!(session.finished_session(), Some(result));
    }

    #[test]
    fn correct_tap_records_reaction_and_score() {
        let mut session = running(Difficulty::Easy);
        let centre = spawn_until(&mut session, true, ms(0));

        let outcome = session.handle(SessionInput::Tap(centre), ms(420));
        assert_eq!(
            outcome,
            SessionOutput::Tap(TapOutcome::Signal {
                neuron_id: session.metrics().spawn_timestamps.len() as u64,
                reaction_secs: Some(0.42),
                score: 10,
            })
        );
        assert_eq!(session.metrics().reaction_times, vec![0.42]);
    }

    #[test]
    fn noise_tap_penalises() {
        let mut session = running(Difficulty::Hard);
        let signal = spawn_until(&mut session, true, ms(0));
        session.tap(signal, ms(500));
        let noise = spawn_until(&mut session, false, ms(600));
        session.tap(noise, ms(900));

        assert_eq!(session.score(), 5);
        assert_eq!(session.metrics().incorrect_taps, 1);
        assert_eq!(session.metrics().error_count, 1);
    }

    #[test]
    fn restart_resets_everything() {
        let mut session = running(Difficulty::Hard);
        let centre = spawn_until(&mut session, true, ms(0));
        session.tap(centre, ms(300));
        session.spawn(ms(400));

        session.start(Difficulty::Easy, ms(500));
        assert_eq!(session.score(), 0);
        assert!(session.neurons().is_empty());
        assert_eq!(session.metrics(), &SessionMetrics::default());
        assert_eq!(session.state().difficulty, Difficulty::Easy);
        assert_eq!(session.state().remaining_ms(), 90_000);
    }

    #[test]
    fn abandon_discards_without_result() {
        let mut session = running(Difficulty::Medium);
        session.spawn(ms(0));
        session.handle(SessionInput::Abandon, ms(100));

        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.finished_session().is_none());
        assert!(session.neurons().is_empty());
        assert_eq!(session.metrics().total_signals + session.metrics().total_noise, 0);
    }

    #[test]
    fn snapshot_tracks_remaining_time() {
        let mut session = running(Difficulty::Medium);
        session.spawn(ms(0));
        session.tick(ms(15_000));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.remaining_ms, 45_000);
        assert_eq!(snapshot.state.status, SessionStatus::Running);
    }
}
