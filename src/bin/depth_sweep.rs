//! Depth sweep over log-signature truncation depths.
//!
//! Generates one train and one test set of noisy spirals, then trains a
//! fresh Neural CDE per configured depth on windowed log-signature
//! features, reporting test accuracy and time per epoch for each depth.
//! An optional argument names a TOML configuration file.

use anyhow::Result;

use logsig_cde_core::{print_summary, run_depth_sweep, ExperimentConfig};

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ExperimentConfig::load_from_file(&path)?,
        None => ExperimentConfig::default(),
    };

    println!("Configuration:");
    println!(
        "  Dataset: {} trajectories x {} timepoints",
        config.num_trajectories, config.num_timepoints
    );
    println!(
        "  Windows: length {} at depths {:?}",
        config.window_length, config.depths
    );
    println!(
        "  Model: {} hidden channels, field width {}, {} interpolation",
        config.hidden_channels, config.hidden_width, config.interpolation
    );
    println!(
        "  Training: {} epochs, batch size {}, learning rate {}",
        config.num_epochs, config.batch_size, config.learning_rate
    );
    println!();

    let results = run_depth_sweep(&config);
    print_summary(&results, config.num_epochs);
    Ok(())
}
