//! Fully-connected layer with explicit forward and backward passes.

use ndarray::{Array1, Array2, Axis};
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::Rng;

/// Affine map `x W^T + b` with weight shape (out, in).
pub struct Linear {
    name: String,
    pub weight: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Linear {
    /// Initializes weight and bias from U(−1/√in, 1/√in).
    pub fn new(name: impl Into<String>, in_features: usize, out_features: usize, rng: &mut StdRng) -> Self {
        assert!(in_features >= 1 && out_features >= 1);
        let bound = 1.0 / (in_features as f32).sqrt();
        let dist = Uniform::new(-bound, bound);
        let weight = Array2::from_shape_fn((out_features, in_features), |_| rng.sample(dist));
        let bias = Array1::from_shape_fn(out_features, |_| rng.sample(dist));
        Self {
            name: name.into(),
            weight,
            bias,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    pub fn forward(&self, input: &Array2<f32>) -> Array2<f32> {
        assert_eq!(
            input.ncols(),
            self.in_features(),
            "input width must match layer input features"
        );
        input.dot(&self.weight.t()) + &self.bias
    }

    /// Gradients for one forward pass: (grad_input, grad_weight, grad_bias).
    pub fn backward(
        &self,
        input: &Array2<f32>,
        grad_output: &Array2<f32>,
    ) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        assert_eq!(input.nrows(), grad_output.nrows(), "batch sizes must match");
        let grad_weight = grad_output.t().dot(input);
        let grad_bias = grad_output.sum_axis(Axis(0));
        let grad_input = grad_output.dot(&self.weight);
        (grad_input, grad_weight, grad_bias)
    }
}
