//! Least-mean-squares adaptive filter for single-microphone noise cancellation.
//!
//! The error signal uses a feedback form rather than the textbook
//! desired-minus-output difference:
//!
//! ```text
//! y[n] = w^T x[n]              (filter output)
//! e[n] = x[n] + y[n-1]         (previous output summed onto the current input)
//! w[k] -= μ * e[n] * x[n-k]    (weight update for tap k)
//! ```
//!
//! `e[n]` is also the emitted sample. Large step sizes can make the weights
//! grow without bound; nothing here guards against that.

/// Working state for one run of the filter over one channel.
pub struct LmsFilter {
    /// Filter taps.
    weights: Vec<f32>,
    /// Most recent inputs. Newest sample is at index 0.
    delay_line: Vec<f32>,
    /// Output `y` of the previous step, fed back into the next error.
    prev_output: f32,
    step_size: f32,
}

impl LmsFilter {
    pub fn new(step_size: f32, filter_length: usize) -> Self {
        Self {
            weights: vec![0.0; filter_length],
            delay_line: vec![0.0; filter_length],
            prev_output: 0.0,
            step_size,
        }
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Advances the filter by one input sample and returns the error sample.
    pub fn process_sample(&mut self, input: f32) -> f32 {
        if !self.delay_line.is_empty() {
            self.delay_line.rotate_right(1);
            self.delay_line[0] = input;
        }

        let output: f32 = self
            .weights
            .iter()
            .zip(&self.delay_line)
            .map(|(w, x)| w * x)
            .sum();

        let error = input + self.prev_output;
        self.prev_output = output;

        let scale = self.step_size * error;
        for (w, x) in self.weights.iter_mut().zip(&self.delay_line) {
            *w -= scale * x;
        }

        error
    }

    pub fn reset(&mut self) {
        self.weights.fill(0.0);
        self.delay_line.fill(0.0);
        self.prev_output = 0.0;
    }
}

/// Runs a freshly initialised [`LmsFilter`] over `input`, returning one error
/// sample per input sample.
pub fn run_lms(input: &[f32], step_size: f32, filter_length: usize) -> Vec<f32> {
    let mut filter = LmsFilter::new(step_size, filter_length);
    input.iter().map(|&x| filter.process_sample(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_input_gives_zero_output() {
        let output = run_lms(&[0.0; 512], 0.5, 64);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_step_size_passes_input_through() {
        let input: Vec<f32> = (0..200).map(|i| ((i as f32) * 0.1).sin() * 0.4).collect();
        assert_eq!(run_lms(&input, 0.0, 16), input);
    }

    #[test]
    fn hand_computed_two_tap_sequence() {
        // n=0: delay=[1,0]   y=0      e=1      w=[-0.1, 0]
        // n=1: delay=[0.5,1] y=-0.05  e=0.5    w=[-0.125, -0.05]
        // n=2: delay=[0,0.5] y=-0.025 e=-0.05  w=[-0.125, -0.0475]
        let output = run_lms(&[1.0, 0.5, 0.0], 0.1, 2);
        let expected = [1.0, 0.5, -0.05];
        for (got, want) in output.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }

        let mut filter = LmsFilter::new(0.1, 2);
        for x in [1.0, 0.5, 0.0] {
            filter.process_sample(x);
        }
        assert!((filter.weights()[0] + 0.125).abs() < 1e-6);
        assert!((filter.weights()[1] + 0.0475).abs() < 1e-6);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let input: Vec<f32> = (0..1000).map(|i| ((i * 7919) % 200) as f32 / 200.0 - 0.5).collect();
        assert_eq!(run_lms(&input, 0.01, 32), run_lms(&input, 0.01, 32));
    }

    #[test]
    fn reset_restores_initial_state() {
        let input = [0.3, -0.2, 0.7, 0.1];
        let mut filter = LmsFilter::new(0.05, 3);
        let first: Vec<f32> = input.iter().map(|&x| filter.process_sample(x)).collect();
        filter.reset();
        let second: Vec<f32> = input.iter().map(|&x| filter.process_sample(x)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_length_filter_echoes_input() {
        assert_eq!(run_lms(&[0.2, -0.4], 0.01, 0), vec![0.2, -0.4]);
        assert!(run_lms(&[], 0.01, 8).is_empty());
    }
}
