//! Binary classification loss and metrics.

use ndarray::Array1;

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Mean binary cross-entropy on raw logits, with its gradient.
///
/// Uses the overflow-safe form max(l, 0) − l·y + ln(1 + exp(−|l|)); the
/// gradient of the mean is (σ(l) − y) / N. NaN or infinite logits flow
/// through unchanged.
pub fn bce_with_logits(logits: &Array1<f32>, targets: &Array1<f32>) -> (f32, Array1<f32>) {
    assert_eq!(logits.len(), targets.len(), "logit/target lengths must match");
    let n = logits.len() as f32;
    let mut total = 0.0f32;
    let mut grad = Array1::zeros(logits.len());
    for (i, (&logit, &target)) in logits.iter().zip(targets.iter()).enumerate() {
        total += logit.max(0.0) - logit * target + (-logit.abs()).exp().ln_1p();
        grad[i] = (sigmoid(logit) - target) / n;
    }
    (total / n, grad)
}

/// Fraction of sigmoid(logit) > 0.5 predictions matching the labels.
pub fn binary_accuracy(logits: &Array1<f32>, targets: &Array1<f32>) -> f32 {
    assert_eq!(logits.len(), targets.len(), "logit/target lengths must match");
    let correct = logits
        .iter()
        .zip(targets.iter())
        .filter(|(&logit, &target)| (sigmoid(logit) > 0.5) == (target > 0.5))
        .count();
    correct as f32 / logits.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn matches_the_naive_formula_at_moderate_logits() {
        let logits = array![0.5f32, -1.2, 2.0];
        let targets = array![1.0f32, 0.0, 1.0];
        let (loss, _) = bce_with_logits(&logits, &targets);
        let naive: f32 = logits
            .iter()
            .zip(targets.iter())
            .map(|(&l, &y)| {
                let p = sigmoid(l);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum::<f32>()
            / 3.0;
        assert_relative_eq!(loss, naive, epsilon = 1e-5);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let targets = array![1.0f32, 0.0];
        let logits = array![0.7f32, -0.3];
        let (_, grad) = bce_with_logits(&logits, &targets);
        let eps = 1e-3f32;
        for i in 0..2 {
            let mut plus = logits.clone();
            plus[i] += eps;
            let mut minus = logits.clone();
            minus[i] -= eps;
            let numeric =
                (bce_with_logits(&plus, &targets).0 - bce_with_logits(&minus, &targets).0)
                    / (2.0 * eps);
            assert_relative_eq!(grad[i], numeric, epsilon = 1e-3);
        }
    }

    #[test]
    fn loss_is_stable_for_large_logits() {
        let (loss, _) = bce_with_logits(&array![80.0f32], &array![1.0f32]);
        assert!(loss.is_finite());
        assert!(loss < 1e-6);
        let (loss, _) = bce_with_logits(&array![-80.0f32], &array![1.0f32]);
        assert!(loss.is_finite());
        assert!(loss > 10.0);
    }

    #[test]
    fn accuracy_is_a_fraction_in_unit_interval() {
        let logits = array![3.0f32, -2.0, 0.4, -0.1];
        let targets = array![1.0f32, 0.0, 0.0, 1.0];
        let accuracy = binary_accuracy(&logits, &targets);
        assert_relative_eq!(accuracy, 0.5);
        assert!((0.0..=1.0).contains(&accuracy));
    }
}
