//! Truncated tensor-series arithmetic for path signatures.
//!
//! A signature truncated at depth `m` lives in the graded algebra
//! R ⊕ R^c ⊕ R^{c²} ⊕ … ⊕ R^{c^m}. Only the levels of degree 1..=m are
//! stored; the degree-0 scalar is implicit (1 for group-like elements such
//! as signatures, 0 for their logarithms) and is supplied by each
//! operation.

/// Graded coefficients of a truncated tensor series.
///
/// `levels[k - 1]` holds the degree-k coefficients as a row-major vector of
/// length `channels^k`.
#[derive(Clone, Debug, PartialEq)]
pub struct TensorSeries {
    channels: usize,
    depth: usize,
    levels: Vec<Vec<f32>>,
}

impl TensorSeries {
    /// Series with every stored coefficient zero.
    pub fn zero(channels: usize, depth: usize) -> Self {
        assert!(channels >= 1 && depth >= 1);
        let levels = (1..=depth).map(|k| vec![0.0; channels.pow(k as u32)]).collect();
        Self {
            channels,
            depth,
            levels,
        }
    }

    /// Signature of a single straight segment with increment `v`:
    /// exp(v) has degree-k level v^{⊗k} / k!.
    pub fn segment_exp(increment: &[f32], depth: usize) -> Self {
        let channels = increment.len();
        let mut series = Self::zero(channels, depth);
        series.levels[0].copy_from_slice(increment);
        for k in 2..=depth {
            let (lower, upper) = series.levels.split_at_mut(k - 1);
            let previous = &lower[k - 2];
            let level = &mut upper[0];
            for (i, &a) in previous.iter().enumerate() {
                for (j, &v) in increment.iter().enumerate() {
                    level[i * channels + j] = a * v / k as f32;
                }
            }
        }
        series
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Degree-k coefficients, 1-based.
    pub fn level(&self, k: usize) -> &[f32] {
        &self.levels[k - 1]
    }

    /// Chen product of two signatures (both with implicit unit scalar):
    /// out^(k) = a^(k) + b^(k) + Σ_{i+j=k} a^(i) ⊗ b^(j).
    pub fn chen_mul(&self, rhs: &Self) -> Self {
        assert_eq!(self.channels, rhs.channels, "channel counts must match");
        assert_eq!(self.depth, rhs.depth, "truncation depths must match");
        let mut out = Self::zero(self.channels, self.depth);
        for k in 1..=self.depth {
            let level = &mut out.levels[k - 1];
            for (idx, value) in level.iter_mut().enumerate() {
                *value = self.levels[k - 1][idx] + rhs.levels[k - 1][idx];
            }
            for i in 1..k {
                concat_accumulate(
                    &self.levels[i - 1],
                    &rhs.levels[k - i - 1],
                    self.channels.pow((k - i) as u32),
                    level,
                );
            }
        }
        out
    }

    /// Truncated logarithm of a group-like series (implicit scalar 1):
    /// log(1 + X) = Σ_{j>=1} (-1)^{j+1} X^j / j, with X the stored levels.
    pub fn log(&self) -> Self {
        let mut result = self.clone();
        let mut power = self.clone();
        for j in 2..=self.depth {
            power = power.concat_mul(self);
            let sign = if j % 2 == 0 { -1.0f32 } else { 1.0 };
            let coefficient = sign / j as f32;
            for k in 1..=self.depth {
                for (out, &term) in result.levels[k - 1]
                    .iter_mut()
                    .zip(power.levels[k - 1].iter())
                {
                    *out += coefficient * term;
                }
            }
        }
        result
    }

    /// Non-unital product: out^(k) = Σ_{i+j=k, i,j>=1} a^(i) ⊗ b^(j).
    fn concat_mul(&self, rhs: &Self) -> Self {
        let mut out = Self::zero(self.channels, self.depth);
        for k in 2..=self.depth {
            for i in 1..k {
                concat_accumulate(
                    &self.levels[i - 1],
                    &rhs.levels[k - i - 1],
                    self.channels.pow((k - i) as u32),
                    &mut out.levels[k - 1],
                );
            }
        }
        out
    }
}

/// out[ia * rhs_len + ib] += a[ia] * b[ib] for the row-major word
/// concatenation (u, w) -> u * c^{|w|} + w.
fn concat_accumulate(a: &[f32], b: &[f32], rhs_len: usize, out: &mut [f32]) {
    debug_assert_eq!(b.len(), rhs_len);
    for (ia, &va) in a.iter().enumerate() {
        let base = ia * rhs_len;
        for (ib, &vb) in b.iter().enumerate() {
            out[base + ib] += va * vb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_exp_levels_are_scaled_powers() {
        let v = [1.0f32, -2.0];
        let exp = TensorSeries::segment_exp(&v, 3);
        assert_eq!(exp.level(1), &v[..]);
        // degree 2: v ⊗ v / 2
        assert_relative_eq!(exp.level(2)[0], 0.5);
        assert_relative_eq!(exp.level(2)[1], -1.0);
        assert_relative_eq!(exp.level(2)[3], 2.0);
        // degree 3: v ⊗ v ⊗ v / 6, word (1,1,0) -> index 6
        assert_relative_eq!(exp.level(3)[6], (-2.0) * (-2.0) * 1.0 / 6.0);
    }

    #[test]
    fn chen_product_matches_hand_expansion() {
        let a = TensorSeries::segment_exp(&[1.0, 0.0], 2);
        let b = TensorSeries::segment_exp(&[0.0, 1.0], 2);
        let product = a.chen_mul(&b);
        assert_eq!(product.level(1), &[1.0, 1.0]);
        // level 2 words (00, 01, 10, 11): ½v₁⊗v₁ + v₁⊗v₂ + ½v₂⊗v₂
        assert_relative_eq!(product.level(2)[0], 0.5);
        assert_relative_eq!(product.level(2)[1], 1.0);
        assert_relative_eq!(product.level(2)[2], 0.0);
        assert_relative_eq!(product.level(2)[3], 0.5);
    }

    #[test]
    fn log_inverts_exp_for_a_single_segment() {
        let v = [0.3f32, -0.7, 1.1];
        let log = TensorSeries::segment_exp(&v, 3).log();
        assert_eq!(log.level(1), &v[..]);
        for k in 2..=3 {
            for &value in log.level(k) {
                assert_relative_eq!(value, 0.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn corner_path_log_has_half_levy_area() {
        // (0,0) -> (1,0) -> (1,1): log level 2 at word (0,1) is the Lévy
        // area 1/2, and (1,0) its negation.
        let a = TensorSeries::segment_exp(&[1.0, 0.0], 2);
        let b = TensorSeries::segment_exp(&[0.0, 1.0], 2);
        let log = a.chen_mul(&b).log();
        assert_relative_eq!(log.level(2)[1], 0.5, epsilon = 1e-6);
        assert_relative_eq!(log.level(2)[2], -0.5, epsilon = 1e-6);
    }
}
