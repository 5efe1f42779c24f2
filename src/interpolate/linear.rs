//! Piecewise-linear interpolation over uniform knots.

use ndarray::{s, Array2, Array3};

use super::locate;

/// Piecewise-linear paths through a (N, L, C) sequence batch.
pub struct LinearInterpolation {
    values: Array3<f32>,
}

impl LinearInterpolation {
    pub fn fit(series: &Array3<f32>) -> Self {
        assert!(series.dim().1 >= 1, "sequences must contain a knot");
        Self {
            values: series.clone(),
        }
    }

    pub fn num_series(&self) -> usize {
        self.values.dim().0
    }

    pub fn num_knots(&self) -> usize {
        self.values.dim().1
    }

    pub fn num_channels(&self) -> usize {
        self.values.dim().2
    }

    pub fn evaluate(&self, t: f32) -> Array2<f32> {
        let (index, offset) = locate(t, self.num_knots());
        if self.num_knots() < 2 {
            return self.values.index_axis(ndarray::Axis(1), 0).to_owned();
        }
        let left = self.values.slice(s![.., index, ..]);
        let right = self.values.slice(s![.., index + 1, ..]);
        (1.0 - offset) * &left + offset * &right
    }

    pub fn derivative(&self, t: f32) -> Array2<f32> {
        if self.num_knots() < 2 {
            return Array2::zeros((self.num_series(), self.num_channels()));
        }
        let (index, _) = locate(t, self.num_knots());
        let left = self.values.slice(s![.., index, ..]);
        let right = self.values.slice(s![.., index + 1, ..]);
        &right - &left
    }

    pub fn slice_series(&self, start: usize, end: usize) -> Self {
        Self {
            values: self.values.slice(s![start..end, .., ..]).to_owned(),
        }
    }
}
