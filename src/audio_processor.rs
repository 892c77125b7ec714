use anyhow::Context;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;
use std::path::Path;

use crate::audio_buffer::AudioBuffer;
use crate::Result;

/// Decodes a WAV file into a de-interleaved buffer, keeping every channel and
/// the file's sample rate. Integer samples are scaled into `[-1, 1)`.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let mut reader =
        WavReader::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let spec = reader.spec();

    let interleaved = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to read float samples: {}", e))?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|sample| sample as f32 / full_scale))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| anyhow::anyhow!("Failed to read int samples: {}", e))?
        }
    };

    let buffer =
        AudioBuffer::from_interleaved(&interleaved, spec.channels as usize, spec.sample_rate)
            .with_context(|| format!("Invalid audio in {}", path.display()))?;

    info!(
        "Loaded {} ({} channel(s), {} samples, {:.2} seconds)",
        path.display(),
        buffer.channel_count(),
        buffer.len(),
        buffer.duration_secs()
    );

    Ok(buffer)
}

/// Writes `buffer` as 32-bit float WAV.
pub fn save_wav<P: AsRef<Path>>(path: P, buffer: &AudioBuffer) -> Result<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: u16::try_from(buffer.channel_count())
            .context("Too many channels for a WAV file")?,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for sample in buffer.to_interleaved() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!("Wrote {}", path.display());
    Ok(())
}
