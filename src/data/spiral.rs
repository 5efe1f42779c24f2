//! Two-class damped spiral trajectories.
//!
//! Each trajectory follows (cos(φ + t), sin(φ + t)) / (1 + 0.5 t) over
//! t ∈ [0, 4π] from a uniformly random start phase φ. Half of the batch is
//! mirrored horizontally, turning the anticlockwise spiral into a clockwise
//! one; the mirrored half carries label 1. Gaussian noise is added to the
//! spatial coordinates and a single random permutation shuffles the class
//! order while keeping trajectories aligned with their labels.

use std::f32::consts::PI;

use ndarray::{Array1, Array3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;

/// Generator configuration. `seed: None` draws fresh data every call.
#[derive(Debug, Clone, Serialize)]
pub struct SpiralConfig {
    pub num_trajectories: usize,
    pub num_timepoints: usize,
    /// Prepend the timepoint value as a leading channel (3-channel
    /// variant); otherwise only the two spatial channels are emitted.
    pub include_time: bool,
    pub noise_std: f32,
    pub seed: Option<u64>,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            num_trajectories: 64,
            num_timepoints: 5000,
            include_time: true,
            noise_std: 0.01,
            seed: None,
        }
    }
}

/// A labeled trajectory batch: trajectories (N, T, C), labels (N).
pub struct SpiralDataset {
    pub trajectories: Array3<f32>,
    pub labels: Array1<f32>,
}

impl SpiralDataset {
    pub fn len(&self) -> usize {
        self.trajectories.dim().0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_timepoints(&self) -> usize {
        self.trajectories.dim().1
    }

    pub fn num_channels(&self) -> usize {
        self.trajectories.dim().2
    }
}

/// Position on the canonical (anticlockwise) spiral.
fn spiral_point(phase: f32, t: f32) -> (f32, f32) {
    let damping = 1.0 + 0.5 * t;
    ((phase + t).cos() / damping, (phase + t).sin() / damping)
}

pub fn generate(config: &SpiralConfig) -> SpiralDataset {
    assert!(config.num_trajectories >= 1, "need at least one trajectory");
    assert!(config.num_timepoints >= 2, "need at least two timepoints");
    assert!(config.noise_std >= 0.0, "noise deviation must be non-negative");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let noise = if config.noise_std > 0.0 {
        Normal::new(0.0, config.noise_std).ok()
    } else {
        None
    };

    let n = config.num_trajectories;
    let timepoints = config.num_timepoints;
    let channels = if config.include_time { 3 } else { 2 };
    let time_step = 4.0 * PI / (timepoints - 1) as f32;
    let half = n / 2;

    let mut trajectories = Array3::zeros((n, timepoints, channels));
    let mut labels = Array1::zeros(n);
    for i in 0..n {
        let phase = rng.gen::<f32>() * 2.0 * PI;
        let mirrored = i >= half;
        labels[i] = if mirrored { 1.0 } else { 0.0 };
        for j in 0..timepoints {
            let t = j as f32 * time_step;
            let (mut x, mut y) = spiral_point(phase, t);
            if mirrored {
                x = -x;
            }
            if let Some(normal) = &noise {
                x += normal.sample(&mut rng);
                y += normal.sample(&mut rng);
            }
            if config.include_time {
                trajectories[[i, j, 0]] = t;
                trajectories[[i, j, 1]] = x;
                trajectories[[i, j, 2]] = y;
            } else {
                trajectories[[i, j, 0]] = x;
                trajectories[[i, j, 1]] = y;
            }
        }
    }

    // one shuffle applied identically to trajectories and labels
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);
    let mut shuffled = Array3::zeros(trajectories.raw_dim());
    let mut shuffled_labels = Array1::zeros(n);
    for (row, &source) in order.iter().enumerate() {
        shuffled
            .index_axis_mut(Axis(0), row)
            .assign(&trajectories.index_axis(Axis(0), source));
        shuffled_labels[row] = labels[source];
    }

    SpiralDataset {
        trajectories: shuffled,
        labels: shuffled_labels,
    }
}
