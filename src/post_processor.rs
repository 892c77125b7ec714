use log::warn;

/// Radius of the centered box filter (7 taps).
pub const SMOOTHING_RADIUS: usize = 3;
/// Peak amplitude the output is scaled down to when exceeded.
pub const PEAK_LIMIT: f32 = 0.9;

/// Smooths a filtered signal with a 7-tap moving average and scales it so the
/// peak magnitude does not exceed [`PEAK_LIMIT`].
///
/// The first and last three samples are not averaged. Averages read from the
/// unsmoothed input. Non-finite samples left by a diverged filter are zeroed
/// before the peak is measured.
pub fn smooth_and_normalize(signal: &[f32]) -> Vec<f32> {
    let mut output = moving_average(signal);
    normalize_peak(&mut output);
    output
}

fn moving_average(signal: &[f32]) -> Vec<f32> {
    let mut output = signal.to_vec();
    let taps = (2 * SMOOTHING_RADIUS + 1) as f32;

    for (offset, window) in signal.windows(2 * SMOOTHING_RADIUS + 1).enumerate() {
        output[offset + SMOOTHING_RADIUS] = window.iter().sum::<f32>() / taps;
    }

    output
}

fn normalize_peak(signal: &mut [f32]) {
    let mut non_finite = 0;
    for sample in signal.iter_mut().filter(|s| !s.is_finite()) {
        *sample = 0.0;
        non_finite += 1;
    }
    if non_finite > 0 {
        warn!(
            "Filter diverged: zeroed {} non-finite of {} samples",
            non_finite,
            signal.len()
        );
    }

    let peak = signal.iter().fold(0.0f32, |max, &s| max.max(s.abs()));

    if peak > PEAK_LIMIT {
        let scale = PEAK_LIMIT / peak;
        for sample in signal.iter_mut() {
            *sample *= scale;
        }
    }
}
