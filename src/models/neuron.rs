use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Size of the hosting view, in the same units as neuron positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 844.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NeuronKind {
    /// Should be tapped.
    Signal,
    /// Should be avoided.
    Noise,
}

/// A moving stimulus on screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Neuron {
    pub id: u64,
    pub kind: NeuronKind,
    pub position: Point,
    pub size: f64,
    pub opacity: f64,
    pub spawned_at: DateTime<Utc>,
    /// Displacement applied on every motion tick.
    pub velocity: Point,
}

impl Neuron {
    pub fn is_signal(&self) -> bool {
        self.kind == NeuronKind::Signal
    }

    /// Circular hit area of diameter `size`.
    pub fn contains(&self, point: Point) -> bool {
        self.position.distance_to(point) < self.size / 2.0
    }

    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        (now - self.spawned_at).num_milliseconds() as f64 / 1000.0
    }
}
