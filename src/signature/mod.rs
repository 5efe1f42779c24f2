//! Log-signature windowing for trajectory compression.
//!
//! Long trajectories are partitioned into short windows and each window is
//! summarized by its log-signature: the truncated tensor logarithm of the
//! window's path signature, compressed to its Lyndon-word coefficients.
//! Depth controls how much path shape each window retains; the window
//! count depends only on the trajectory length and the window length.

pub mod lyndon;
pub mod tensor_algebra;

use ndarray::{Array3, ArrayView2};
use rayon::prelude::*;

pub use lyndon::{logsignature_channels, lyndon_words};
pub use tensor_algebra::TensorSeries;

/// Log-signature transform for paths with a fixed channel count and depth.
pub struct LogSignature {
    channels: usize,
    depth: usize,
    words: Vec<Vec<usize>>,
}

impl LogSignature {
    pub fn new(channels: usize, depth: usize) -> Self {
        assert!(channels >= 1, "paths must have at least one channel");
        assert!(depth >= 1, "truncation depth must be positive");
        // degree-major feature layout: the length-1 words (the window
        // increments) come first, then the higher-order coefficients
        let mut words = lyndon_words(channels, depth);
        words.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        Self {
            channels,
            depth,
            words,
        }
    }

    /// Width of the compressed feature vector.
    pub fn dimension(&self) -> usize {
        self.words.len()
    }

    /// Compressed log-signature of one path segment, rows = timepoints.
    ///
    /// A segment with fewer than two points has the zero log-signature.
    pub fn compute(&self, path: ArrayView2<f32>) -> Vec<f32> {
        assert_eq!(
            path.ncols(),
            self.channels,
            "path channel count must match the transform"
        );

        let mut signature: Option<TensorSeries> = None;
        let mut increment = vec![0.0f32; self.channels];
        for row in 1..path.nrows() {
            for (c, slot) in increment.iter_mut().enumerate() {
                *slot = path[[row, c]] - path[[row - 1, c]];
            }
            let segment = TensorSeries::segment_exp(&increment, self.depth);
            signature = Some(match signature {
                Some(acc) => acc.chen_mul(&segment),
                None => segment,
            });
        }

        match signature {
            Some(series) => {
                let log = series.log();
                self.words
                    .iter()
                    .map(|word| log.level(word.len())[lyndon::tensor_index(word, self.channels)])
                    .collect()
            }
            None => vec![0.0; self.dimension()],
        }
    }
}

/// Number of windows produced for a trajectory of `num_timepoints` samples.
///
/// Windows share their boundary samples, so `window_length` timepoint
/// intervals are consumed per window: ceil((T - 1) / W). A window length
/// equal to the trajectory length collapses to a single window; a window
/// length of one yields one window per interval.
pub fn window_count(num_timepoints: usize, window_length: usize) -> usize {
    assert!(num_timepoints >= 2, "trajectories need at least two timepoints");
    assert!(window_length >= 1, "window length must be positive");
    (num_timepoints - 2) / window_length + 1
}

/// Compresses a trajectory batch of shape (N, T, C) into a feature batch of
/// shape (N, window_count(T, W), logsignature_channels(C, depth)).
pub fn logsig_windows(
    trajectories: &Array3<f32>,
    depth: usize,
    window_length: usize,
) -> Array3<f32> {
    let (num_trajectories, num_timepoints, channels) = trajectories.dim();
    let transform = LogSignature::new(channels, depth);
    let windows = window_count(num_timepoints, window_length);
    let width = transform.dimension();

    let flat: Vec<f32> = (0..num_trajectories)
        .into_par_iter()
        .flat_map_iter(|trajectory| {
            let mut features = Vec::with_capacity(windows * width);
            for window in 0..windows {
                let start = window * window_length;
                let end = (start + window_length).min(num_timepoints - 1);
                let segment = trajectories.slice(ndarray::s![trajectory, start..=end, ..]);
                features.extend(transform.compute(segment));
            }
            features
        })
        .collect();

    Array3::from_shape_vec((num_trajectories, windows, width), flat)
        .expect("window extraction emits exactly windows * width values per trajectory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array3};

    fn line_path(slope: &[f32], points: usize) -> Array3<f32> {
        let channels = slope.len();
        let mut path = Array3::zeros((1, points, channels));
        for p in 0..points {
            for (c, &s) in slope.iter().enumerate() {
                path[[0, p, c]] = s * p as f32;
            }
        }
        path
    }

    #[test]
    fn straight_line_has_no_higher_order_terms() {
        let transform = LogSignature::new(2, 3);
        let path = line_path(&[0.25, -0.5], 7);
        let features = transform.compute(path.index_axis(ndarray::Axis(0), 0));
        // degree 1 coefficients recover the total increment
        assert_relative_eq!(features[0], 1.5, epsilon = 1e-5);
        assert_relative_eq!(features[1], -3.0, epsilon = 1e-5);
        for &value in &features[2..] {
            assert_relative_eq!(value, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn corner_path_levy_area() {
        let transform = LogSignature::new(2, 2);
        let path = array![[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]];
        let features = transform.compute(path.index_axis(ndarray::Axis(0), 0));
        assert_eq!(features.len(), 3);
        assert_relative_eq!(features[0], 1.0);
        assert_relative_eq!(features[1], 1.0);
        // Lyndon word (0, 1): the Lévy area of the corner
        assert_relative_eq!(features[2], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn window_count_depends_only_on_length_and_window() {
        assert_eq!(window_count(5000, 50), 100);
        assert_eq!(window_count(101, 10), 10);
        assert_eq!(window_count(100, 100), 1);
        assert_eq!(window_count(100, 1), 99);
    }

    #[test]
    fn depth_changes_width_but_not_window_count() {
        let batch = line_path(&[1.0, 2.0, 0.5], 41);
        for (depth, width) in [(1, 3), (2, 6), (3, 14)] {
            let features = logsig_windows(&batch, depth, 10);
            assert_eq!(features.dim(), (1, 4, width));
        }
    }

    #[test]
    fn single_window_when_window_spans_trajectory() {
        let batch = line_path(&[1.0, 0.0], 25);
        let features = logsig_windows(&batch, 2, 25);
        assert_eq!(features.dim(), (1, 1, 3));
        assert_relative_eq!(features[[0, 0, 0]], 24.0, epsilon = 1e-4);
    }

    #[test]
    fn windows_concatenate_the_full_trajectory() {
        // degree-1 features are window increments; they must sum to the
        // total displacement because windows share endpoints.
        let mut batch = Array3::zeros((1, 11, 2));
        for p in 0..11 {
            batch[[0, p, 0]] = (p as f32 * 0.7).sin();
            batch[[0, p, 1]] = (p as f32 * 0.3).cos();
        }
        let features = logsig_windows(&batch, 2, 4);
        let total_x: f32 = (0..features.dim().1).map(|w| features[[0, w, 0]]).sum();
        assert_relative_eq!(
            total_x,
            batch[[0, 10, 0]] - batch[[0, 0, 0]],
            epsilon = 1e-5
        );
    }
}
