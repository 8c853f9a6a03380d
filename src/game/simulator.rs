use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

use crate::{
    metrics::SessionMetrics,
    models::{DifficultyConfig, Neuron, NeuronKind, Point, Viewport},
};

/// Period of the motion/time tick, independent of the spawn period.
pub const MOTION_TICK: Duration = Duration::from_millis(100);
pub const NEURON_LIFETIME_SECS: f64 = 8.0;
const FADE_START_RATIO: f64 = 0.7;

const SPAWN_MARGIN_X: f64 = 60.0;
const SPAWN_MIN_Y: f64 = 80.0;
const SPAWN_MAX_Y: f64 = 150.0;
pub const MIN_NEURON_SIZE: f64 = 40.0;
pub const MAX_NEURON_SIZE: f64 = 80.0;
const MAX_DRIFT_X: f64 = 0.8;
const SPEED_SPREAD: f64 = 3.0;
/// Neurons are culled once they sink this far below the viewport.
const CULL_MARGIN: f64 = 100.0;

/// Owns the live neurons and the randomness used to create them.
pub struct Simulator<R> {
    rng: R,
    viewport: Viewport,
    neurons: Vec<Neuron>,
    next_id: u64,
}

impl<R: Rng> Simulator<R> {
    pub fn new(rng: R, viewport: Viewport) -> Self {
        Self {
            rng,
            viewport,
            neurons: Vec::new(),
            next_id: 1,
        }
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn clear(&mut self) {
        self.neurons.clear();
    }

    /// Creates one neuron and reports it to `metrics` exactly once.
    pub fn spawn(
        &mut self,
        config: &DifficultyConfig,
        at: DateTime<Utc>,
        metrics: &mut SessionMetrics,
    ) -> &Neuron {
        let min_x = SPAWN_MARGIN_X;
        let max_x = self.viewport.width - SPAWN_MARGIN_X;
        let x = if max_x > min_x {
            self.rng.gen_range(min_x..=max_x)
        } else {
            self.viewport.width / 2.0
        };
        let y = self.rng.gen_range(SPAWN_MIN_Y..=SPAWN_MAX_Y);
        let size = self.rng.gen_range(MIN_NEURON_SIZE..=MAX_NEURON_SIZE);

        let kind = if self.rng.gen::<f64>() < config.signal_ratio {
            NeuronKind::Signal
        } else {
            NeuronKind::Noise
        };

        let velocity = Point::new(
            self.rng.gen_range(-MAX_DRIFT_X..=MAX_DRIFT_X),
            self.rng
                .gen_range(config.neuron_speed..=config.neuron_speed + SPEED_SPREAD),
        );

        let id = self.next_id;
        self.next_id += 1;

        metrics.record_spawn(kind, at);
        self.neurons.push(Neuron {
            id,
            kind,
            position: Point::new(x, y),
            size,
            opacity: 1.0,
            spawned_at: at,
            velocity,
        });

        &self.neurons[self.neurons.len() - 1]
    }

    /// Drops neurons that left the viewport or have fully faded.
    pub fn purge_expired(&mut self, at: DateTime<Utc>) -> usize {
        let floor = self.viewport.height + CULL_MARGIN;
        let before = self.neurons.len();
        self.neurons
            .retain(|neuron| {
                neuron.position.y <= floor && neuron.age_secs(at) < NEURON_LIFETIME_SECS
            });
        before - self.neurons.len()
    }

    /// Moves every neuron by its velocity and applies the end-of-life fade.
    pub fn advance(&mut self, at: DateTime<Utc>) {
        for neuron in &mut self.neurons {
            neuron.position.x += neuron.velocity.x;
            neuron.position.y += neuron.velocity.y;
            neuron.opacity = opacity_for_age(neuron.age_secs(at));
        }
    }

    /// Index of the nearest neuron whose hit circle contains `point`.
    pub fn nearest_hit(&self, point: Point) -> Option<usize> {
        self.neurons
            .iter()
            .enumerate()
            .filter(|(_, neuron)| neuron.contains(point))
            .min_by(|(_, a), (_, b)| {
                a.position
                    .distance_to(point)
                    .total_cmp(&b.position.distance_to(point))
            })
            .map(|(index, _)| index)
    }

    pub fn remove(&mut self, index: usize) -> Neuron {
        self.neurons.remove(index)
    }
}

/// Fully opaque until 70% of the lifetime, then linear down to 0 at 100%.
pub fn opacity_for_age(age_secs: f64) -> f64 {
    let fade_start = NEURON_LIFETIME_SECS * FADE_START_RATIO;
    if age_secs <= fade_start {
        return 1.0;
    }
    let fade_ratio = (age_secs - fade_start) / (NEURON_LIFETIME_SECS - fade_start);
    (1.0 - fade_ratio).clamp(0.0, 1.0)
}
