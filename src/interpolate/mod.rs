//! Continuous-time interpolants over discrete feature sequences.
//!
//! A fitted [`Interpolant`] turns a batch of sampled sequences into a
//! continuous path with a uniform evaluation surface: position and
//! derivative at any time inside the knot interval. The strategy is chosen
//! once, when the interpolant is fitted, via [`InterpolationScheme`].

pub mod cubic;
pub mod linear;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Array3};
use serde::Serialize;

pub use cubic::NaturalCubicSpline;
pub use linear::LinearInterpolation;

/// Interpolation strategy for turning discrete samples into a driving path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationScheme {
    Linear,
    Cubic,
}

impl fmt::Display for InterpolationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationScheme::Linear => write!(f, "linear"),
            InterpolationScheme::Cubic => write!(f, "cubic"),
        }
    }
}

impl FromStr for InterpolationScheme {
    type Err = UnknownSchemeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "linear" => Ok(InterpolationScheme::Linear),
            "cubic" => Ok(InterpolationScheme::Cubic),
            other => Err(UnknownSchemeError(other.to_string())),
        }
    }
}

/// Rejected interpolation scheme name, raised before any data is touched.
#[derive(Debug, Clone)]
pub struct UnknownSchemeError(String);

impl fmt::Display for UnknownSchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown interpolation scheme {:?}: only \"linear\" and \"cubic\" are implemented",
            self.0
        )
    }
}

impl std::error::Error for UnknownSchemeError {}

/// A batch of continuous paths fitted to a (N, L, C) sequence batch over
/// the uniform knots 0, 1, …, L − 1.
pub enum Interpolant {
    Linear(LinearInterpolation),
    Cubic(NaturalCubicSpline),
}

impl Interpolant {
    pub fn fit(scheme: InterpolationScheme, series: &Array3<f32>) -> Self {
        match scheme {
            InterpolationScheme::Linear => {
                Interpolant::Linear(LinearInterpolation::fit(series))
            }
            InterpolationScheme::Cubic => Interpolant::Cubic(NaturalCubicSpline::fit(series)),
        }
    }

    /// Path positions at time `t`, shape (N, C).
    pub fn evaluate(&self, t: f32) -> Array2<f32> {
        match self {
            Interpolant::Linear(interp) => interp.evaluate(t),
            Interpolant::Cubic(spline) => spline.evaluate(t),
        }
    }

    /// Path derivatives at time `t`, shape (N, C).
    pub fn derivative(&self, t: f32) -> Array2<f32> {
        match self {
            Interpolant::Linear(interp) => interp.derivative(t),
            Interpolant::Cubic(spline) => spline.derivative(t),
        }
    }

    /// Closed time interval covered by the paths.
    pub fn interval(&self) -> (f32, f32) {
        (0.0, (self.num_knots() - 1) as f32)
    }

    pub fn num_series(&self) -> usize {
        match self {
            Interpolant::Linear(interp) => interp.num_series(),
            Interpolant::Cubic(spline) => spline.num_series(),
        }
    }

    pub fn num_knots(&self) -> usize {
        match self {
            Interpolant::Linear(interp) => interp.num_knots(),
            Interpolant::Cubic(spline) => spline.num_knots(),
        }
    }

    pub fn num_channels(&self) -> usize {
        match self {
            Interpolant::Linear(interp) => interp.num_channels(),
            Interpolant::Cubic(spline) => spline.num_channels(),
        }
    }

    /// Restriction to the contiguous series range `start..end`, used to
    /// carve mini-batches out of a fitted training set.
    pub fn slice_series(&self, start: usize, end: usize) -> Self {
        match self {
            Interpolant::Linear(interp) => Interpolant::Linear(interp.slice_series(start, end)),
            Interpolant::Cubic(spline) => Interpolant::Cubic(spline.slice_series(start, end)),
        }
    }
}

/// Shared knot lookup: clamps `t` into the knot interval and returns the
/// interval index together with the offset inside it.
pub(crate) fn locate(t: f32, num_knots: usize) -> (usize, f32) {
    if num_knots < 2 {
        return (0, 0.0);
    }
    let clamped = t.clamp(0.0, (num_knots - 1) as f32);
    let index = (clamped.floor() as usize).min(num_knots - 2);
    (index, clamped - index as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn scheme_names_round_trip() {
        assert_eq!(
            "linear".parse::<InterpolationScheme>().unwrap(),
            InterpolationScheme::Linear
        );
        assert_eq!(
            "cubic".parse::<InterpolationScheme>().unwrap(),
            InterpolationScheme::Cubic
        );
    }

    #[test]
    fn unknown_scheme_is_rejected_with_a_descriptive_error() {
        let err = "quadratic".parse::<InterpolationScheme>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("quadratic"));
        assert!(message.contains("linear"));
        assert!(message.contains("cubic"));
    }

    #[test]
    fn locate_clamps_to_the_knot_interval() {
        assert_eq!(locate(-1.0, 5), (0, 0.0));
        assert_eq!(locate(2.5, 5), (2, 0.5));
        assert_eq!(locate(4.0, 5), (3, 1.0));
        assert_eq!(locate(9.0, 5), (3, 1.0));
    }

    #[test]
    fn slicing_restricts_the_series_dimension() {
        let series = Array3::from_shape_fn((6, 4, 2), |(n, l, c)| {
            n as f32 + l as f32 * 0.1 + c as f32 * 0.01
        });
        for scheme in [InterpolationScheme::Linear, InterpolationScheme::Cubic] {
            let path = Interpolant::fit(scheme, &series);
            let slice = path.slice_series(2, 5);
            assert_eq!(slice.num_series(), 3);
            assert_eq!(slice.num_knots(), 4);
            let full = path.evaluate(1.5);
            let sliced = slice.evaluate(1.5);
            for row in 0..3 {
                for c in 0..2 {
                    assert_eq!(sliced[[row, c]], full[[row + 2, c]]);
                }
            }
        }
    }
}
