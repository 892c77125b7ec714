use serde::{Deserialize, Serialize};

/// Number of leading samples examined by the autocorrelation and flatness
/// estimates.
pub const ANALYSIS_FRAME_SIZE: usize = 1024;

const FLATNESS_FLOOR: f64 = 0.2;
const FLATNESS_SPAN: f64 = 0.5;
const FLATNESS_EPSILON: f64 = 1e-10;

/// Coarse time-domain statistics of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    /// Mean squared amplitude.
    pub energy: f64,
    /// Sign changes per sample, in `[0, 1]`.
    pub zero_crossings: f64,
    /// `zero_crossings * 10000`. A stand-in, not a spectral computation.
    pub spectral_centroid: f64,
    /// In `[0.2, 0.7]`.
    pub spectral_flatness: f64,
    /// Unnormalized autocorrelation magnitude over the analysis frame.
    pub periodicity: f64,
}

pub struct FeatureExtractor {
    frame_size: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            frame_size: ANALYSIS_FRAME_SIZE,
        }
    }

    pub fn extract(&self, signal: &[f32]) -> FeatureVector {
        if signal.is_empty() {
            return FeatureVector {
                spectral_flatness: FLATNESS_FLOOR,
                ..FeatureVector::default()
            };
        }

        let zero_crossings = self.zero_crossing_rate(signal);

        FeatureVector {
            energy: self.energy(signal),
            zero_crossings,
            spectral_centroid: zero_crossings * 10000.0,
            spectral_flatness: self.spectral_flatness(signal),
            periodicity: self.periodicity(signal),
        }
    }

    fn energy(&self, signal: &[f32]) -> f64 {
        let sum: f64 = signal.iter().map(|&s| (s as f64) * (s as f64)).sum();
        sum / signal.len() as f64
    }

    // Zero counts as non-negative.
    fn zero_crossing_rate(&self, signal: &[f32]) -> f64 {
        let crossings = signal
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();
        crossings as f64 / signal.len() as f64
    }

    /// Geometric over arithmetic mean of sample magnitudes in the analysis
    /// frame, mapped onto `[0.2, 0.7]`.
    fn spectral_flatness(&self, signal: &[f32]) -> f64 {
        let frame = &signal[..signal.len().min(self.frame_size)];
        let n = frame.len() as f64;

        let (log_sum, sum) = frame.iter().fold((0.0, 0.0), |(log_sum, sum), &s| {
            let magnitude = (s as f64).abs() + FLATNESS_EPSILON;
            (log_sum + magnitude.ln(), sum + magnitude)
        });

        let geometric_mean = (log_sum / n).exp();
        let arithmetic_mean = sum / n;
        let ratio = (geometric_mean / arithmetic_mean).clamp(0.0, 1.0);

        FLATNESS_FLOOR + FLATNESS_SPAN * ratio
    }

    /// Sum over lags `1..frame_size` of `|sum_i x[i] * x[i + lag]|`, divided by
    /// the frame size. Pairs reaching past the end of the signal are skipped.
    fn periodicity(&self, signal: &[f32]) -> f64 {
        let mut total = 0.0;

        for lag in 1..self.frame_size {
            if lag >= signal.len() {
                break;
            }
            let end = self.frame_size.min(signal.len() - lag);
            let correlation: f64 = signal[..end]
                .iter()
                .zip(&signal[lag..lag + end])
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum();
            total += correlation.abs();
        }

        total / self.frame_size as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_signal_yields_zeroed_features() {
        let features = FeatureExtractor::new().extract(&[]);
        assert_eq!(features.energy, 0.0);
        assert_eq!(features.zero_crossings, 0.0);
        assert_eq!(features.periodicity, 0.0);
        assert_eq!(features.spectral_flatness, FLATNESS_FLOOR);
    }

    #[test]
    fn energy_and_zero_crossings() {
        let signal = [0.5, -0.5, 0.5, -0.5];
        let features = FeatureExtractor::new().extract(&signal);

        assert!((features.energy - 0.25).abs() < 1e-12);
        // 3 crossings over 4 samples
        assert!((features.zero_crossings - 0.75).abs() < 1e-12);
        assert!((features.spectral_centroid - 7500.0).abs() < 1e-9);
    }

    #[test]
    fn zero_is_treated_as_non_negative() {
        let features = FeatureExtractor::new().extract(&[0.0, 0.3, 0.0, -0.2]);
        // only the 0.0 -> -0.2 step changes sign
        assert!((features.zero_crossings - 0.25).abs() < 1e-12);
    }

    #[test]
    fn periodicity_matches_direct_sum_for_short_signal() {
        let signal = [1.0, 2.0, 3.0, 4.0];
        // lags 1..3: |2+6+12| + |3+8| + |4| = 35
        let features = FeatureExtractor::new().extract(&signal);
        assert!((features.periodicity - 35.0 / 1024.0).abs() < 1e-12);
    }

    #[test]
    fn periodicity_only_examines_analysis_frame() {
        let mut long = vec![0.0f32; 4096];
        for (i, s) in long.iter_mut().enumerate().take(2048) {
            *s = if i % 2 == 0 { 0.3 } else { -0.3 };
        }
        let mut tail_changed = long.clone();
        for s in tail_changed.iter_mut().skip(2048) {
            *s = 0.9;
        }

        let extractor = FeatureExtractor::new();
        assert_eq!(
            extractor.extract(&long).periodicity,
            extractor.extract(&tail_changed).periodicity
        );
    }

    #[test]
    fn flatness_is_deterministic_and_bounded() {
        let extractor = FeatureExtractor::new();
        let constant = vec![0.4f32; 2000];
        let spiky: Vec<f32> = (0..2000).map(|i| if i % 100 == 0 { 0.9 } else { 1e-4 }).collect();

        let flat = extractor.extract(&constant).spectral_flatness;
        let peaked = extractor.extract(&spiky).spectral_flatness;

        assert!((flat - 0.7).abs() < 1e-9);
        assert!(peaked >= 0.2 && peaked < flat);
        assert_eq!(peaked, extractor.extract(&spiky).spectral_flatness);
    }
}
