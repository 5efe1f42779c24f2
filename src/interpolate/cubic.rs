//! Natural cubic spline interpolation over uniform knots.
//!
//! Each (series, channel) column is fitted independently with the natural
//! boundary condition (zero second derivative at both ends). With unit
//! knot spacing the interior second derivatives m satisfy the tridiagonal
//! system m_{i-1} + 4 m_i + m_{i+1} = 6 (y_{i-1} - 2 y_i + y_{i+1}),
//! solved with the Thomas algorithm.

use ndarray::{s, Array2, Array3};

use super::locate;

/// Natural cubic spline paths through a (N, L, C) sequence batch.
pub struct NaturalCubicSpline {
    values: Array3<f32>,
    curvature: Array3<f32>,
}

impl NaturalCubicSpline {
    pub fn fit(series: &Array3<f32>) -> Self {
        let (num_series, num_knots, channels) = series.dim();
        assert!(num_knots >= 1, "sequences must contain a knot");

        let mut curvature = Array3::zeros((num_series, num_knots, channels));
        if num_knots >= 3 {
            let interior = num_knots - 2;
            let mut upper = vec![0.0f32; interior];
            let mut rhs = vec![0.0f32; interior];
            for n in 0..num_series {
                for c in 0..channels {
                    for i in 0..interior {
                        rhs[i] = 6.0
                            * (series[[n, i, c]] - 2.0 * series[[n, i + 1, c]]
                                + series[[n, i + 2, c]]);
                    }
                    // forward elimination
                    upper[0] = 0.25;
                    rhs[0] *= 0.25;
                    for i in 1..interior {
                        let denom = 4.0 - upper[i - 1];
                        upper[i] = 1.0 / denom;
                        rhs[i] = (rhs[i] - rhs[i - 1]) / denom;
                    }
                    // back substitution into the interior knots
                    curvature[[n, interior, c]] = rhs[interior - 1];
                    for i in (1..interior).rev() {
                        curvature[[n, i, c]] =
                            rhs[i - 1] - upper[i - 1] * curvature[[n, i + 1, c]];
                    }
                }
            }
        }

        Self {
            values: series.clone(),
            curvature,
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
        if self.num_knots() < 2 {
            return self.values.index_axis(ndarray::Axis(1), 0).to_owned();
        }
        let (index, u) = locate(t, self.num_knots());
        let v = 1.0 - u;
        let left = self.values.slice(s![.., index, ..]);
        let right = self.values.slice(s![.., index + 1, ..]);
        let m_left = self.curvature.slice(s![.., index, ..]);
        let m_right = self.curvature.slice(s![.., index + 1, ..]);

        (v * v * v / 6.0) * &m_left
            + (u * u * u / 6.0) * &m_right
            + v * (&left - &(m_left.to_owned() / 6.0))
            + u * (&right - &(m_right.to_owned() / 6.0))
    }

    pub fn derivative(&self, t: f32) -> Array2<f32> {
        if self.num_knots() < 2 {
            return Array2::zeros((self.num_series(), self.num_channels()));
        }
        let (index, u) = locate(t, self.num_knots());
        let v = 1.0 - u;
        let left = self.values.slice(s![.., index, ..]);
        let right = self.values.slice(s![.., index + 1, ..]);
        let m_left = self.curvature.slice(s![.., index, ..]);
        let m_right = self.curvature.slice(s![.., index + 1, ..]);

        (-v * v / 2.0) * &m_left + (u * u / 2.0) * &m_right + (&right - &left)
            + (m_left.to_owned() - m_right.to_owned()) / 6.0
    }

    pub fn slice_series(&self, start: usize, end: usize) -> Self {
        Self {
            values: self.values.slice(s![start..end, .., ..]).to_owned(),
            curvature: self.curvature.slice(s![start..end, .., ..]).to_owned(),
        }
    }
}
