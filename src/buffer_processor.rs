use log::{debug, info, warn};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::adaptive_filter::run_lms;
use crate::audio_buffer::AudioBuffer;
use crate::error::AncError;
use crate::post_processor::smooth_and_normalize;

/// Adaptive filter configuration: LMS step size and number of taps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub step_size: f32,
    pub filter_length: usize,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            step_size: 0.01,
            filter_length: 128,
        }
    }
}

impl FilterParams {
    pub fn new(step_size: f32, filter_length: usize) -> Self {
        Self {
            step_size,
            filter_length,
        }
    }

    /// Looks up parameters for a noise label, ignoring case. Unknown labels
    /// get [`FilterParams::default`].
    pub fn for_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "lawnmower" => Self::new(0.01, 32),
            "traffic" => Self::new(0.005, 128),
            "construction" => Self::new(0.008, 64),
            "fan/hvac" => Self::new(0.003, 256),
            _ => Self::default(),
        }
    }
}

/// Runs the adaptive filter and post-processing over every channel of a buffer.
///
/// Each channel gets its own filter state; channels never influence each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferProcessor;

impl BufferProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, buffer: &AudioBuffer, label: &str) -> AudioBuffer {
        self.process_with_params(buffer, resolve_params(label))
    }

    pub fn process_with_params(&self, buffer: &AudioBuffer, params: FilterParams) -> AudioBuffer {
        let mut output = ChannelWriter::new(buffer, params);
        for channel in buffer.channels() {
            output.push(process_channel(channel, params));
        }
        output.finish()
    }

    /// Like [`BufferProcessor::process`], but checks `cancel` before each
    /// channel and stops with [`AncError::Cancelled`] once it is set.
    pub fn process_cancellable(
        &self,
        buffer: &AudioBuffer,
        label: &str,
        cancel: &AtomicBool,
    ) -> Result<AudioBuffer, AncError> {
        let params = resolve_params(label);
        let mut output = ChannelWriter::new(buffer, params);

        for channel in buffer.channels() {
            if cancel.load(Ordering::Relaxed) {
                info!(
                    "Processing cancelled after {} of {} channels",
                    output.completed, output.total
                );
                return Err(AncError::Cancelled {
                    completed: output.completed,
                    total: output.total,
                });
            }
            output.push(process_channel(channel, params));
        }

        Ok(output.finish())
    }
}

/// Freshly allocated output matrix, filled one processed channel at a time.
struct ChannelWriter {
    samples: Array2<f32>,
    sample_rate: u32,
    completed: usize,
    total: usize,
    started: Instant,
}

impl ChannelWriter {
    fn new(buffer: &AudioBuffer, params: FilterParams) -> Self {
        let total = buffer.channel_count();
        info!(
            "Processing {} channel(s) of {} samples at {} Hz (mu={}, taps={})",
            total,
            buffer.len(),
            buffer.sample_rate(),
            params.step_size,
            params.filter_length
        );

        Self {
            samples: Array2::zeros((total, buffer.len())),
            sample_rate: buffer.sample_rate(),
            completed: 0,
            total,
            started: Instant::now(),
        }
    }

    fn push(&mut self, processed: Vec<f32>) {
        self.samples
            .row_mut(self.completed)
            .assign(&ArrayView1::from(&processed[..]));
        self.completed += 1;
        debug!("Channel {} of {} done", self.completed, self.total);
    }

    fn finish(self) -> AudioBuffer {
        info!("Processing finished in {:?}", self.started.elapsed());
        AudioBuffer::from_array(self.samples, self.sample_rate)
    }
}

fn process_channel(channel: ArrayView1<'_, f32>, params: FilterParams) -> Vec<f32> {
    let input: Cow<'_, [f32]> = match channel.as_slice() {
        Some(samples) => Cow::Borrowed(samples),
        None => Cow::Owned(channel.to_vec()),
    };
    let filtered = run_lms(&input, params.step_size, params.filter_length);
    smooth_and_normalize(&filtered)
}

/// [`FilterParams::for_label`], warning when the label is not one the table
/// knows about.
fn resolve_params(label: &str) -> FilterParams {
    let params = FilterParams::for_label(label);
    if params == FilterParams::default() && !is_default_label(label) {
        warn!("Unknown noise type '{}', using default filter parameters", label);
    }
    params
}

fn is_default_label(label: &str) -> bool {
    matches!(label.to_ascii_lowercase().as_str(), "" | "crowd" | "wind")
}

/// Runs [`BufferProcessor::process`] on tokio's blocking pool so async callers
/// stay responsive during long buffers.
pub async fn process_in_background(buffer: AudioBuffer, label: String) -> crate::Result<AudioBuffer> {
    let output =
        tokio::task::spawn_blocking(move || BufferProcessor::new().process(&buffer, &label)).await?;
    Ok(output)
}
