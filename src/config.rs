//! Experiment configuration management via TOML files.
//!
//! Every knob the experiments vary is an explicit configuration value;
//! widths and counts are threaded into the generator and the model builder
//! rather than shared through module state. Missing keys fall back to the
//! reference constants; an unrecognized interpolation scheme is rejected
//! here, before any data is generated.

use std::fs;
use std::path::Path;

use serde::Serialize;
use toml::Value;

use crate::interpolate::InterpolationScheme;

/// Full configuration of a depth-sweep experiment.
///
/// # Examples
///
/// ```
/// use logsig_cde_core::ExperimentConfig;
///
/// let config = ExperimentConfig::from_str("[experiment]\nnum_epochs = 2").unwrap();
/// assert_eq!(config.num_epochs, 2);
/// assert_eq!(config.depths, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentConfig {
    /// Trajectories per generated dataset
    pub num_trajectories: usize,
    /// Timepoints per trajectory
    pub num_timepoints: usize,
    /// Training epochs per depth
    pub num_epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Adam learning rate
    pub learning_rate: f32,
    /// Timepoints compressed into one log-signature window
    pub window_length: usize,
    /// Log-signature depths to sweep
    pub depths: Vec<usize>,
    /// Hidden state dimensionality of the CDE
    pub hidden_channels: usize,
    /// Width of the vector field's feed-forward layer
    pub hidden_width: usize,
    /// Standard deviation of the generator noise
    pub noise_std: f32,
    /// Emit the timepoint as a leading channel
    pub include_time: bool,
    /// Interpolation strategy for the compressed sequences
    pub interpolation: InterpolationScheme,
    /// Generator and model-initialization seed; absent draws from entropy
    pub seed: Option<u64>,
}

impl ExperimentConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let value: Value =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let table = value
            .get("experiment")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();
        let defaults = Self::default();

        let read_count = |key: &str, fallback: usize| -> Result<usize, ConfigError> {
            match table.get(key) {
                Some(value) => value
                    .as_integer()
                    .filter(|&v| v > 0)
                    .map(|v| v as usize)
                    .ok_or_else(|| {
                        ConfigError::Parse(format!("{key} must be a positive integer"))
                    }),
                None => Ok(fallback),
            }
        };
        let read_float = |key: &str, fallback: f32| -> Result<f32, ConfigError> {
            match table.get(key) {
                Some(value) => value
                    .as_float()
                    .map(|v| v as f32)
                    .ok_or_else(|| ConfigError::Parse(format!("{key} must be a float"))),
                None => Ok(fallback),
            }
        };

        let num_trajectories = read_count("num_trajectories", defaults.num_trajectories)?;
        let num_timepoints = read_count("num_timepoints", defaults.num_timepoints)?;
        let num_epochs = read_count("num_epochs", defaults.num_epochs)?;
        let batch_size = read_count("batch_size", defaults.batch_size)?;
        let window_length = read_count("window_length", defaults.window_length)?;
        let hidden_channels = read_count("hidden_channels", defaults.hidden_channels)?;
        let hidden_width = read_count("hidden_width", defaults.hidden_width)?;
        let learning_rate = read_float("learning_rate", defaults.learning_rate)?;
        let noise_std = read_float("noise_std", defaults.noise_std)?;
        if noise_std < 0.0 {
            return Err(ConfigError::Parse("noise_std must be non-negative".into()));
        }

        let depths = match table.get("depths") {
            Some(value) => value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .map(|item| {
                            item.as_integer()
                                .filter(|&v| v > 0)
                                .map(|v| v as usize)
                                .ok_or_else(|| {
                                    ConfigError::Parse(
                                        "depths must be positive integers".into(),
                                    )
                                })
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?
                .filter(|depths: &Vec<usize>| !depths.is_empty())
                .ok_or_else(|| {
                    ConfigError::Parse("depths must be a non-empty integer array".into())
                })?,
            None => defaults.depths,
        };

        let include_time = match table.get("include_time") {
            Some(value) => value
                .as_bool()
                .ok_or_else(|| ConfigError::Parse("include_time must be a boolean".into()))?,
            None => defaults.include_time,
        };

        let interpolation = match table.get("interpolation") {
            Some(value) => value
                .as_str()
                .ok_or_else(|| ConfigError::Parse("interpolation must be a string".into()))?
                .parse::<InterpolationScheme>()
                .map_err(|err| ConfigError::Parse(err.to_string()))?,
            None => defaults.interpolation,
        };

        let seed = match table.get("seed") {
            Some(value) => Some(
                value
                    .as_integer()
                    .filter(|&v| v >= 0)
                    .map(|v| v as u64)
                    .ok_or_else(|| {
                        ConfigError::Parse("seed must be a non-negative integer".into())
                    })?,
            ),
            None => defaults.seed,
        };

        Ok(Self {
            num_trajectories,
            num_timepoints,
            num_epochs,
            batch_size,
            learning_rate,
            window_length,
            depths,
            hidden_channels,
            hidden_width,
            noise_std,
            include_time,
            interpolation,
            seed,
        })
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            num_trajectories: 64,
            num_timepoints: 5000,
            num_epochs: 10,
            batch_size: 32,
            learning_rate: 0.1,
            window_length: 50,
            depths: vec![1, 2, 3],
            hidden_channels: 8,
            hidden_width: 64,
            noise_std: 0.01,
            include_time: true,
            interpolation: InterpolationScheme::Linear,
            seed: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_section_missing() {
        let config = ExperimentConfig::from_str("").unwrap();
        assert_eq!(config.num_trajectories, 64);
        assert_eq!(config.num_timepoints, 5000);
        assert_eq!(config.window_length, 50);
        assert_eq!(config.depths, vec![1, 2, 3]);
        assert_eq!(config.interpolation, InterpolationScheme::Linear);
        assert!(config.seed.is_none());
    }

    #[test]
    fn parses_custom_values() {
        let toml = "[experiment]\nnum_trajectories = 16\ndepths = [2, 4]\n\
                    interpolation = \"cubic\"\nseed = 12\nlearning_rate = 0.01";
        let config = ExperimentConfig::from_str(toml).unwrap();
        assert_eq!(config.num_trajectories, 16);
        assert_eq!(config.depths, vec![2, 4]);
        assert_eq!(config.interpolation, InterpolationScheme::Cubic);
        assert_eq!(config.seed, Some(12));
        assert!((config.learning_rate - 0.01).abs() < 1e-6);
    }

    #[test]
    fn rejects_unknown_interpolation_before_running() {
        let toml = "[experiment]\ninterpolation = \"hermite\"";
        let err = ExperimentConfig::from_str(toml).unwrap_err();
        assert!(err.to_string().contains("hermite"));
    }

    #[test]
    fn rejects_non_positive_counts() {
        let err = ExperimentConfig::from_str("[experiment]\nbatch_size = 0").unwrap_err();
        assert!(err.to_string().contains("batch_size"));
        let err = ExperimentConfig::from_str("[experiment]\ndepths = []").unwrap_err();
        assert!(err.to_string().contains("depths"));
    }
}
