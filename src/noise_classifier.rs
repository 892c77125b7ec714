use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::audio_buffer::AudioBuffer;
use crate::feature_extractor::{FeatureExtractor, FeatureVector};
use crate::NoiseArchetype;

const BASE_SCORE_MIN: f64 = 0.1;
const BASE_SCORE_JITTER: f64 = 0.2;

/// Per-archetype scores in `[0, 1]`, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ConfidenceMap(BTreeMap<NoiseArchetype, f64>);

impl ConfidenceMap {
    pub fn get(&self, archetype: NoiseArchetype) -> Option<f64> {
        self.0.get(&archetype).copied()
    }

    /// Scores in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (NoiseArchetype, f64)> + '_ {
        self.0.iter().map(|(&archetype, &score)| (archetype, score))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest-scoring archetype. On a tie the earliest archetype wins.
    pub fn best(&self) -> Option<NoiseArchetype> {
        let mut best: Option<(NoiseArchetype, f64)> = None;
        for (archetype, score) in self.iter() {
            match best {
                Some((_, max)) if score <= max => {}
                _ => best = Some((archetype, score)),
            }
        }
        best.map(|(archetype, _)| archetype)
    }

    fn insert(&mut self, archetype: NoiseArchetype, score: f64) {
        self.0.insert(archetype, score);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: NoiseArchetype,
    pub scores: ConfidenceMap,
    pub features: FeatureVector,
}

impl Classification {
    pub fn confidence(&self) -> f64 {
        self.scores.get(self.label).unwrap_or(0.0)
    }
}

/// Heuristic classifier scoring a signal against the six noise archetypes.
///
/// Each archetype starts from a jittered base score drawn from the injected
/// random source, so classifiers built with the same seed agree exactly.
pub struct NoiseClassifier<R = StdRng> {
    feature_extractor: FeatureExtractor,
    rng: R,
}

impl NoiseClassifier<StdRng> {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for NoiseClassifier<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> NoiseClassifier<R> {
    pub fn from_rng(rng: R) -> Self {
        Self {
            feature_extractor: FeatureExtractor::new(),
            rng,
        }
    }

    pub fn classify(&mut self, signal: &[f32]) -> Classification {
        let features = self.feature_extractor.extract(signal);
        debug!("Extracted features: {:?}", features);

        let mut scores = ConfidenceMap::default();
        for archetype in NoiseArchetype::ALL {
            let base = BASE_SCORE_MIN + self.rng.gen::<f64>() * BASE_SCORE_JITTER;
            scores.insert(archetype, score(archetype, &features, base));
        }

        // ALL is non-empty, so the fallback is never taken.
        let label = scores.best().unwrap_or(NoiseArchetype::Lawnmower);
        debug!("Classified as {} with scores {:?}", label, scores);

        Classification {
            label,
            scores,
            features,
        }
    }

    /// Classifies the first channel of `buffer`.
    pub fn classify_buffer(&mut self, buffer: &AudioBuffer) -> Classification {
        match buffer.channel(0) {
            Some(channel) => match channel.as_slice() {
                Some(samples) => self.classify(samples),
                None => self.classify(&channel.to_vec()),
            },
            None => self.classify(&[]),
        }
    }
}

/// Whether `features` satisfy the threshold rule of `archetype`.
pub fn matches(archetype: NoiseArchetype, features: &FeatureVector) -> bool {
    let FeatureVector {
        energy,
        zero_crossings,
        periodicity,
        ..
    } = *features;

    match archetype {
        NoiseArchetype::Lawnmower => energy > 0.1 && periodicity > 0.5,
        NoiseArchetype::Traffic => energy > 0.05 && energy < 0.2 && periodicity < 0.3,
        NoiseArchetype::Construction => energy > 0.15 && zero_crossings > 0.3,
        NoiseArchetype::FanHvac => energy < 0.1 && zero_crossings < 0.2 && periodicity > 0.6,
        NoiseArchetype::Crowd => periodicity < 0.2,
        NoiseArchetype::Wind => energy < 0.15 && zero_crossings < 0.15,
    }
}

pub fn bonus(archetype: NoiseArchetype) -> f64 {
    match archetype {
        NoiseArchetype::Lawnmower => 0.5,
        NoiseArchetype::Traffic => 0.4,
        NoiseArchetype::Construction => 0.3,
        NoiseArchetype::FanHvac => 0.6,
        NoiseArchetype::Crowd => 0.3,
        NoiseArchetype::Wind => 0.4,
    }
}

/// Final score for `archetype` given its base score: the bonus is added when
/// the rule matches, then the result is capped at 1 and rounded to 2 decimals.
pub fn score(archetype: NoiseArchetype, features: &FeatureVector, base: f64) -> f64 {
    let raw = if matches(archetype, features) {
        base + bonus(archetype)
    } else {
        base
    };
    round2(raw.clamp(0.0, 1.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(energy: f64, zero_crossings: f64, periodicity: f64) -> FeatureVector {
        FeatureVector {
            energy,
            zero_crossings,
            spectral_centroid: zero_crossings * 10000.0,
            spectral_flatness: 0.5,
            periodicity,
        }
    }

    #[test]
    fn threshold_rules() {
        assert!(matches(NoiseArchetype::Lawnmower, &features(0.2, 0.1, 0.8)));
        assert!(matches(NoiseArchetype::Traffic, &features(0.1, 0.1, 0.1)));
        assert!(!matches(NoiseArchetype::Traffic, &features(0.2, 0.1, 0.1)));
        assert!(matches(NoiseArchetype::Construction, &features(0.3, 0.4, 0.1)));
        assert!(matches(NoiseArchetype::FanHvac, &features(0.05, 0.1, 0.7)));
        assert!(matches(NoiseArchetype::Crowd, &features(0.5, 0.5, 0.1)));
        assert!(matches(NoiseArchetype::Wind, &features(0.1, 0.1, 0.9)));
        assert!(!matches(NoiseArchetype::Wind, &features(0.15, 0.1, 0.9)));
    }

    #[test]
    fn score_is_capped_and_rounded() {
        let fan = features(0.05, 0.1, 0.7);
        assert_eq!(score(NoiseArchetype::FanHvac, &fan, 0.2345), 0.83);
        assert_eq!(score(NoiseArchetype::FanHvac, &fan, 0.5), 1.0);
        assert_eq!(score(NoiseArchetype::Construction, &fan, 0.1449), 0.14);
    }

    #[test]
    fn first_maximum_wins_ties() {
        let mut scores = ConfidenceMap::default();
        scores.insert(NoiseArchetype::Lawnmower, 0.2);
        scores.insert(NoiseArchetype::Traffic, 0.7);
        scores.insert(NoiseArchetype::Crowd, 0.7);
        scores.insert(NoiseArchetype::Wind, 0.1);
        assert_eq!(scores.best(), Some(NoiseArchetype::Traffic));
        assert_eq!(ConfidenceMap::default().best(), None);
    }

    #[test]
    fn same_seed_gives_same_classification() {
        let signal: Vec<f32> = (0..3000).map(|i| ((i as f32) * 0.05).sin() * 0.3).collect();
        let a = NoiseClassifier::with_seed(11).classify(&signal);
        let b = NoiseClassifier::with_seed(11).classify(&signal);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_signal_still_gets_a_label() {
        let result = NoiseClassifier::with_seed(3).classify(&[]);
        assert_eq!(result.scores.len(), NoiseArchetype::ALL.len());
        assert_eq!(Some(result.label), result.scores.best());
        for (_, value) in result.scores.iter() {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn scores_serialize_with_display_labels() {
        let result = NoiseClassifier::with_seed(5).classify(&[0.1, -0.1, 0.2]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["scores"]["Fan/HVAC"].is_number());
        assert!(json["features"]["zeroCrossings"].is_number());
    }
}
