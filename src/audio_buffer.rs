use ndarray::{Array2, ArrayView1, Axis};

use crate::error::AncError;

/// Multi-channel audio held as a `(channels, frames)` matrix.
///
/// Construction validates the shape: at least one channel, a non-zero sample
/// rate and equal, non-empty channel lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Array2<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AncError> {
        if channels.is_empty() {
            return Err(AncError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(AncError::InvalidSampleRate(sample_rate));
        }

        let frames = channels[0].len();
        for (channel, data) in channels.iter().enumerate().skip(1) {
            if data.len() != frames {
                return Err(AncError::ChannelLengthMismatch {
                    channel,
                    expected: frames,
                    actual: data.len(),
                });
            }
        }
        if frames == 0 {
            return Err(AncError::EmptyChannels);
        }

        let channel_count = channels.len();
        let flat: Vec<f32> = channels.into_iter().flatten().collect();
        let samples = Array2::from_shape_vec((channel_count, frames), flat)
            .map_err(|_| AncError::EmptyChannels)?;

        Ok(Self { samples, sample_rate })
    }

    pub fn from_mono(signal: Vec<f32>, sample_rate: u32) -> Result<Self, AncError> {
        Self::from_channels(vec![signal], sample_rate)
    }

    /// Splits interleaved frames (`L R L R ...`) into channels.
    pub fn from_interleaved(
        interleaved: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, AncError> {
        if channel_count == 0 {
            return Err(AncError::NoChannels);
        }
        let mut channels = vec![Vec::with_capacity(interleaved.len() / channel_count); channel_count];
        for frame in interleaved.chunks(channel_count) {
            for (channel, &sample) in frame.iter().enumerate() {
                channels[channel].push(sample);
            }
        }
        Self::from_channels(channels, sample_rate)
    }

    pub(crate) fn from_array(samples: Array2<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn channel_count(&self) -> usize {
        self.samples.nrows()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.samples.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f32 {
        self.len() as f32 / self.sample_rate as f32
    }

    pub fn channel(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        (index < self.channel_count()).then(|| self.samples.row(index))
    }

    pub fn channels(&self) -> impl Iterator<Item = ArrayView1<'_, f32>> {
        self.samples.axis_iter(Axis(0))
    }

    pub fn to_interleaved(&self) -> Vec<f32> {
        self.samples.t().iter().copied().collect()
    }
}
