//! # Logsig CDE Core
//!
//! A Neural Controlled Differential Equation classifier for synthetic
//! spiral time series. Long trajectories are compressed into short
//! sequences of windowed log-signature features, interpolated into a
//! continuous driving path, and integrated through a learned vector field;
//! the final hidden state is read out as a binary logit. The signature
//! transform, the interpolants, the integrator, and the backward pass are
//! all implemented here; there is no external autodiff.
//!
//! ## Quick Start
//!
//! ```rust
//! use logsig_cde_core::{run_depth_sweep, ExperimentConfig};
//!
//! let mut config = ExperimentConfig::default();
//! config.num_trajectories = 8;
//! config.num_timepoints = 40;
//! config.window_length = 10;
//! config.num_epochs = 1;
//! config.depths = vec![1, 2];
//! config.seed = Some(42);
//!
//! let results = run_depth_sweep(&config);
//! assert_eq!(results.len(), 2);
//! assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.accuracy)));
//! ```
//!
//! ## Core Modules
//!
//! - [`config`] - Experiment configuration via TOML
//! - [`data`] - Two-class spiral trajectory generation
//! - [`signature`] - Log-signature windowing (tensor algebra + Lyndon basis)
//! - [`interpolate`] - Linear and natural-cubic driving paths
//! - [`neural`] - Layers, loss, Adam, and the Neural CDE with exact BPTT
//! - [`experiment`] - Train/evaluate loop and the depth sweep
//! - [`logging`] - JSON line-delimited event logging

pub mod config;
pub mod data;
pub mod experiment;
pub mod interpolate;
pub mod logging;
pub mod neural;
pub mod signature;

pub use config::{ConfigError, ExperimentConfig};
pub use data::spiral::{generate, SpiralConfig, SpiralDataset};
pub use experiment::{
    print_summary, run_depth_sweep, train_and_evaluate, ExperimentResult, TrainingConfig,
};
pub use interpolate::{Interpolant, InterpolationScheme};
pub use neural::{AdamOptimizer, NeuralCde};
pub use signature::{logsig_windows, logsignature_channels, LogSignature};
