//! Neural Controlled Differential Equation classifier.
//!
//! The hidden state follows dz = f(z) dX, where X is a fitted interpolant
//! over the input sequence and f is a learned vector field mapping the
//! hidden state to a hidden×input matrix. Integration is explicit Euler on
//! the interpolant's knot grid; every step is recorded on a tape so the
//! backward pass can replay the recurrence exactly in reverse.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;

use crate::interpolate::Interpolant;
use crate::neural::linear::Linear;
use crate::neural::loss::{bce_with_logits, binary_accuracy};
use crate::neural::optimizer::AdamOptimizer;

/// Learned vector field: hidden → ReLU(width) → tanh(hidden·input),
/// reshaped to the hidden×input Jacobian shape.
pub struct CdeFunc {
    hidden: Linear,
    output: Linear,
    input_channels: usize,
    hidden_channels: usize,
}

impl CdeFunc {
    pub fn new(
        input_channels: usize,
        hidden_channels: usize,
        hidden_width: usize,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            hidden: Linear::new("field::hidden", hidden_channels, hidden_width, rng),
            output: Linear::new(
                "field::output",
                hidden_width,
                hidden_channels * input_channels,
                rng,
            ),
            input_channels,
            hidden_channels,
        }
    }

    /// Evaluates the field, returning (pre-activation, activation, field)
    /// where field is the flat (batch, hidden·input) tanh output.
    fn evaluate(&self, state: &Array2<f32>) -> (Array2<f32>, Array2<f32>, Array2<f32>) {
        let pre_activation = self.hidden.forward(state);
        let activation = pre_activation.mapv(|v| v.max(0.0));
        let field = self.output.forward(&activation).mapv(f32::tanh);
        (pre_activation, activation, field)
    }
}

/// One recorded Euler step.
struct StepRecord {
    state: Array2<f32>,
    pre_activation: Array2<f32>,
    activation: Array2<f32>,
    field: Array2<f32>,
    control: Array2<f32>,
}

/// Intermediate values of one forward pass, consumed by `backward`.
pub struct ForwardTape {
    initial_input: Array2<f32>,
    steps: Vec<StepRecord>,
    final_state: Array2<f32>,
    pub logits: Array1<f32>,
}

/// Parameter gradients of one forward/backward pass.
pub struct Gradients {
    pub initial_weight: Array2<f32>,
    pub initial_bias: Array1<f32>,
    pub field_hidden_weight: Array2<f32>,
    pub field_hidden_bias: Array1<f32>,
    pub field_output_weight: Array2<f32>,
    pub field_output_bias: Array1<f32>,
    pub readout_weight: Array2<f32>,
    pub readout_bias: Array1<f32>,
}

/// Neural CDE binary classifier: input projection, learned vector field,
/// scalar readout of the final hidden state.
pub struct NeuralCde {
    initial: Linear,
    func: CdeFunc,
    readout: Linear,
}

impl NeuralCde {
    pub fn new(
        input_channels: usize,
        hidden_channels: usize,
        hidden_width: usize,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            initial: Linear::new("initial", input_channels, hidden_channels, rng),
            func: CdeFunc::new(input_channels, hidden_channels, hidden_width, rng),
            readout: Linear::new("readout", hidden_channels, 1, rng),
        }
    }

    pub fn input_channels(&self) -> usize {
        self.func.input_channels
    }

    pub fn hidden_channels(&self) -> usize {
        self.func.hidden_channels
    }

    /// Integrates the batch forward and records the tape.
    pub fn forward(&self, path: &Interpolant) -> ForwardTape {
        assert_eq!(
            path.num_channels(),
            self.func.input_channels,
            "interpolant channels must match the model input width"
        );
        let (start, _) = path.interval();
        let initial_input = path.evaluate(start);
        let batch = initial_input.nrows();
        let hidden = self.func.hidden_channels;
        let channels = self.func.input_channels;

        let mut state = self.initial.forward(&initial_input);
        let steps = path.num_knots().saturating_sub(1);
        let mut records = Vec::with_capacity(steps);
        for step in 0..steps {
            // sample the derivative inside the interval; knots are unit-spaced
            let control = path.derivative(start + step as f32 + 0.5);
            let (pre_activation, activation, field) = self.func.evaluate(&state);

            let mut delta = Array2::zeros((batch, hidden));
            for b in 0..batch {
                for h in 0..hidden {
                    let mut sum = 0.0f32;
                    for c in 0..channels {
                        sum += field[[b, h * channels + c]] * control[[b, c]];
                    }
                    delta[[b, h]] = sum;
                }
            }
            let next = &state + &delta;
            records.push(StepRecord {
                state,
                pre_activation,
                activation,
                field,
                control,
            });
            state = next;
        }

        let logits = self.readout.forward(&state).column(0).to_owned();
        ForwardTape {
            initial_input,
            steps: records,
            final_state: state,
            logits,
        }
    }

    /// Logits without keeping the tape.
    pub fn predict(&self, path: &Interpolant) -> Array1<f32> {
        self.forward(path).logits
    }

    /// Exact reverse sweep through the recorded integration.
    pub fn backward(&self, tape: &ForwardTape, grad_logits: &Array1<f32>) -> Gradients {
        let batch = tape.final_state.nrows();
        let hidden = self.func.hidden_channels;
        let channels = self.func.input_channels;

        let grad_output = grad_logits.clone().insert_axis(Axis(1));
        let (mut grad_state, readout_weight, readout_bias) =
            self.readout.backward(&tape.final_state, &grad_output);

        let mut field_hidden_weight = Array2::zeros(self.func.hidden.weight.dim());
        let mut field_hidden_bias = Array1::zeros(self.func.hidden.bias.len());
        let mut field_output_weight = Array2::zeros(self.func.output.weight.dim());
        let mut field_output_bias = Array1::zeros(self.func.output.bias.len());

        for record in tape.steps.iter().rev() {
            let mut grad_field = Array2::zeros((batch, hidden * channels));
            for b in 0..batch {
                for h in 0..hidden {
                    let upstream = grad_state[[b, h]];
                    for c in 0..channels {
                        grad_field[[b, h * channels + c]] = upstream * record.control[[b, c]];
                    }
                }
            }

            let grad_output_pre = &grad_field * &record.field.mapv(|g| 1.0 - g * g);
            let (grad_activation, output_weight, output_bias) = self
                .func
                .output
                .backward(&record.activation, &grad_output_pre);
            field_output_weight += &output_weight;
            field_output_bias += &output_bias;

            let relu_mask = record
                .pre_activation
                .mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
            let grad_hidden_pre = &grad_activation * &relu_mask;
            let (grad_from_field, hidden_weight, hidden_bias) =
                self.func.hidden.backward(&record.state, &grad_hidden_pre);
            field_hidden_weight += &hidden_weight;
            field_hidden_bias += &hidden_bias;

            // identity path of the Euler update plus the field path
            grad_state = grad_state + grad_from_field;
        }

        let (_, initial_weight, initial_bias) =
            self.initial.backward(&tape.initial_input, &grad_state);

        Gradients {
            initial_weight,
            initial_bias,
            field_hidden_weight,
            field_hidden_bias,
            field_output_weight,
            field_output_bias,
            readout_weight,
            readout_bias,
        }
    }

    fn apply_gradients(&mut self, gradients: &Gradients, optimizer: &mut AdamOptimizer) {
        optimizer.step(
            "initial::weight",
            &mut self.initial.weight,
            &gradients.initial_weight,
        );
        optimizer.step("initial::bias", &mut self.initial.bias, &gradients.initial_bias);
        optimizer.step(
            "field::hidden::weight",
            &mut self.func.hidden.weight,
            &gradients.field_hidden_weight,
        );
        optimizer.step(
            "field::hidden::bias",
            &mut self.func.hidden.bias,
            &gradients.field_hidden_bias,
        );
        optimizer.step(
            "field::output::weight",
            &mut self.func.output.weight,
            &gradients.field_output_weight,
        );
        optimizer.step(
            "field::output::bias",
            &mut self.func.output.bias,
            &gradients.field_output_bias,
        );
        optimizer.step(
            "readout::weight",
            &mut self.readout.weight,
            &gradients.readout_weight,
        );
        optimizer.step("readout::bias", &mut self.readout.bias, &gradients.readout_bias);
    }

    /// One optimization step on a mini-batch; returns the batch loss.
    /// Gradients are recomputed from scratch every call.
    pub fn train_step(
        &mut self,
        path: &Interpolant,
        targets: &Array1<f32>,
        optimizer: &mut AdamOptimizer,
    ) -> f32 {
        let tape = self.forward(path);
        let (loss, grad_logits) = bce_with_logits(&tape.logits, targets);
        let gradients = self.backward(&tape, &grad_logits);
        self.apply_gradients(&gradients, optimizer);
        loss
    }

    /// Full-batch loss and accuracy without updating parameters.
    pub fn evaluate(&self, path: &Interpolant, targets: &Array1<f32>) -> (f32, f32) {
        let logits = self.predict(path);
        let (loss, _) = bce_with_logits(&logits, targets);
        (loss, binary_accuracy(&logits, targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::InterpolationScheme;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array3};
    use rand::{Rng, SeedableRng};

    fn toy_problem(seed: u64) -> (Interpolant, Array1<f32>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let series = Array3::from_shape_fn((4, 5, 2), |_| rng.gen::<f32>() - 0.5);
        let targets = Array1::from_vec(vec![0.0, 1.0, 1.0, 0.0]);
        (
            Interpolant::fit(InterpolationScheme::Linear, &series),
            targets,
        )
    }

    fn loss_of(model: &NeuralCde, path: &Interpolant, targets: &Array1<f32>) -> f32 {
        bce_with_logits(&model.forward(path).logits, targets).0
    }

    #[test]
    fn forward_produces_one_logit_per_series() {
        let (path, _) = toy_problem(1);
        let mut rng = StdRng::seed_from_u64(2);
        let model = NeuralCde::new(2, 3, 8, &mut rng);
        let tape = model.forward(&path);
        assert_eq!(tape.logits.len(), 4);
        assert_eq!(tape.steps.len(), 4);
        assert!(tape.logits.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn single_knot_paths_skip_integration() {
        let series = Array3::from_shape_fn((3, 1, 2), |(n, _, c)| n as f32 + c as f32);
        let path = Interpolant::fit(InterpolationScheme::Linear, &series);
        let mut rng = StdRng::seed_from_u64(5);
        let model = NeuralCde::new(2, 3, 8, &mut rng);
        let tape = model.forward(&path);
        assert_eq!(tape.steps.len(), 0);
        assert_eq!(tape.logits.len(), 3);
    }

    #[test]
    fn backward_matches_finite_differences() {
        let (path, targets) = toy_problem(3);
        let mut rng = StdRng::seed_from_u64(4);
        let mut model = NeuralCde::new(2, 3, 6, &mut rng);
        let tape = model.forward(&path);
        let (_, grad_logits) = bce_with_logits(&tape.logits, &targets);
        let gradients = model.backward(&tape, &grad_logits);

        let eps = 5e-3f32;
        let mut check = |analytic: f32, bump: &mut dyn FnMut(&mut NeuralCde, f32)| {
            bump(&mut model, eps);
            let plus = loss_of(&model, &path, &targets);
            bump(&mut model, -2.0 * eps);
            let minus = loss_of(&model, &path, &targets);
            bump(&mut model, eps);
            let numeric = (plus - minus) / (2.0 * eps);
            assert_relative_eq!(analytic, numeric, epsilon = 1e-2, max_relative = 0.1);
        };

        check(gradients.initial_weight[[1, 0]], &mut |m, d| {
            m.initial.weight[[1, 0]] += d
        });
        check(gradients.field_hidden_weight[[2, 1]], &mut |m, d| {
            m.func.hidden.weight[[2, 1]] += d
        });
        check(gradients.field_hidden_bias[0], &mut |m, d| {
            m.func.hidden.bias[0] += d
        });
        check(gradients.field_output_weight[[3, 2]], &mut |m, d| {
            m.func.output.weight[[3, 2]] += d
        });
        check(gradients.readout_weight[[0, 1]], &mut |m, d| {
            m.readout.weight[[0, 1]] += d
        });
        check(gradients.readout_bias[0], &mut |m, d| {
            m.readout.bias[0] += d
        });
    }

    #[test]
    fn train_step_updates_the_parameters() {
        let (path, targets) = toy_problem(6);
        let mut rng = StdRng::seed_from_u64(7);
        let mut model = NeuralCde::new(2, 3, 6, &mut rng);
        let mut optimizer = AdamOptimizer::new(0.01);
        let loss1 = model.train_step(&path, &targets, &mut optimizer);
        let loss2 = model.train_step(&path, &targets, &mut optimizer);
        assert!(loss1.is_finite() && loss2.is_finite());
        assert_ne!(loss1, loss2);
    }

    #[test]
    fn evaluate_reports_accuracy_in_unit_interval() {
        let (path, targets) = toy_problem(8);
        let mut rng = StdRng::seed_from_u64(9);
        let model = NeuralCde::new(2, 3, 6, &mut rng);
        let (loss, accuracy) = model.evaluate(&path, &targets);
        assert!(loss.is_finite());
        assert!((0.0..=1.0).contains(&accuracy));
    }
}
