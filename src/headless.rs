//! Headless composition root: one session played by a synthetic tapper.

use std::{collections::HashMap, path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::time::Instant;

use crate::{
    app::{AppState, SessionOutcome},
    db::Database,
    game::{SessionController, SessionStatus, TapOutcome},
    models::{Difficulty, NeuronKind, Viewport},
    settings::{SettingsStore, UserSettings},
};

const DEFAULT_DATA_DIR: &str = "./synapseflow-data";
const MIN_REACTION: Duration = Duration::from_millis(250);
const MAX_REACTION: Duration = Duration::from_millis(700);
const SIGNAL_SKIP_CHANCE: f64 = 0.1;
const NOISE_TAP_CHANCE: f64 = 0.15;

pub fn data_dir() -> PathBuf {
    std::env::var_os("SYNAPSEFLOW_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub async fn run(difficulty_arg: Option<String>) -> Result<()> {
    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let settings = SettingsStore::new(data_dir.join("settings.json"))?;
    let database = Database::new(data_dir.join("synapseflow.sqlite3"))?;
    let mut app = AppState::load(database, settings).await?;

    let difficulty = match difficulty_arg {
        Some(raw) => Difficulty::parse(&raw)
            .ok_or_else(|| anyhow!("unknown difficulty '{raw}' (expected easy, medium or hard)"))?,
        None => app.data().settings.difficulty,
    };
    if difficulty != app.data().settings.difficulty {
        let settings = UserSettings {
            difficulty,
            ..app.data().settings.clone()
        };
        app.update_settings(settings)?;
    }

    let (controller, mut finished_rx) = SessionController::spawn(Viewport::default());
    controller.start(difficulty)?;
    info!(
        "Playing a {} session ({}s)",
        difficulty.display_name(),
        difficulty.config().game_duration.as_secs()
    );

    let tapper = tokio::spawn(synthetic_tapper(controller.clone()));
    let finished = finished_rx.recv().await;
    tapper.abort();
    controller.shutdown().await?;

    let finished = finished.ok_or_else(|| anyhow!("session driver stopped before finishing"))?;
    let outcome = app.complete_session(&finished, Local::now()).await;
    print_outcome(&outcome);
    for tip in app.recommendations() {
        println!("Tip: {tip}");
    }

    Ok(())
}

/// Taps each signal after a human-ish delay, misses a few and sometimes
/// taps noise.
async fn synthetic_tapper(controller: SessionController) {
    let mut rng = StdRng::from_entropy();
    let mut snapshots = controller.subscribe();
    let mut due: HashMap<u64, Option<Instant>> = HashMap::new();

    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if snapshot.state.status == SessionStatus::Finished {
            break;
        }

        let now = Instant::now();
        for neuron in &snapshot.neurons {
            let deadline = *due.entry(neuron.id).or_insert_with(|| {
                let wants_tap = match neuron.kind {
                    NeuronKind::Signal => !rng.gen_bool(SIGNAL_SKIP_CHANCE),
                    NeuronKind::Noise => rng.gen_bool(NOISE_TAP_CHANCE),
                };
                wants_tap.then(|| now + rng.gen_range(MIN_REACTION..=MAX_REACTION))
            });

            let Some(deadline) = deadline else {
                continue;
            };
            if now < deadline {
                continue;
            }

            due.insert(neuron.id, None);
            match controller.tap(neuron.position).await {
                Ok(TapOutcome::Miss) | Ok(TapOutcome::Ignored) => {}
                Ok(outcome) => info!("Tap: {outcome:?}"),
                Err(err) => {
                    warn!("Synthetic tapper stopping: {err:#}");
                    return;
                }
            }
        }
    }
}

fn print_outcome(outcome: &SessionOutcome) {
    let result = &outcome.result;
    let profile = &result.profile;
    println!(
        "Score {} | accuracy {:.0}% | avg reaction {:.3}s",
        result.score,
        result.metrics.accuracy_percentage(),
        result.metrics.average_reaction_time()
    );
    println!(
        "Profile: speed {:.2}, accuracy {:.2}, fatigue {:.2}, attention {:.2}",
        profile.speed, profile.accuracy, profile.fatigue, profile.attention_pattern
    );

    let plan = &outcome.plan;
    println!(
        "{} plan: {} nodes, {} focus blocks, conductivity {:.1}%",
        plan.template.display_name(),
        plan.nodes.len(),
        plan.task_count(),
        plan.conductivity
    );
    for node in &plan.nodes {
        println!(
            "  {}  {:>3} min  {}",
            node.start_time.format("%H:%M"),
            node.duration_secs / 60,
            node.title
        );
    }

    for achievement in &outcome.unlocked {
        println!(
            "Achievement unlocked: {} ({})",
            achievement.kind.title(),
            achievement.kind.description()
        );
    }
}
