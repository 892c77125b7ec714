pub mod adaptive_filter;
pub mod audio_buffer;
pub mod audio_processor;
pub mod buffer_processor;
pub mod error;
pub mod feature_extractor;
pub mod noise_classifier;
pub mod post_processor;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use adaptive_filter::{run_lms, LmsFilter};
pub use audio_buffer::AudioBuffer;
pub use buffer_processor::{process_in_background, BufferProcessor, FilterParams};
pub use error::{AncError, ErrorKind};
pub use feature_extractor::{FeatureExtractor, FeatureVector};
pub use noise_classifier::{Classification, ConfidenceMap, NoiseClassifier};
pub use post_processor::smooth_and_normalize;

/// The fixed set of noise categories the classifier scores against.
///
/// Variant order is the enumeration order used for scoring and tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoiseArchetype {
    Lawnmower = 0,
    Traffic = 1,
    Construction = 2,
    #[serde(rename = "Fan/HVAC")]
    FanHvac = 3,
    Crowd = 4,
    Wind = 5,
}

impl NoiseArchetype {
    pub const ALL: [NoiseArchetype; 6] = [
        NoiseArchetype::Lawnmower,
        NoiseArchetype::Traffic,
        NoiseArchetype::Construction,
        NoiseArchetype::FanHvac,
        NoiseArchetype::Crowd,
        NoiseArchetype::Wind,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NoiseArchetype::Lawnmower => "Lawnmower",
            NoiseArchetype::Traffic => "Traffic",
            NoiseArchetype::Construction => "Construction",
            NoiseArchetype::FanHvac => "Fan/HVAC",
            NoiseArchetype::Crowd => "Crowd",
            NoiseArchetype::Wind => "Wind",
        }
    }

    /// Filter configuration used when processing audio dominated by this noise.
    pub fn filter_params(&self) -> FilterParams {
        FilterParams::for_label(self.label())
    }
}

impl fmt::Display for NoiseArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NoiseArchetype {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|archetype| archetype.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown noise type: {}", s))
    }
}

pub type Result<T> = anyhow::Result<T>;
