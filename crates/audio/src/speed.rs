//! Speed change by sample-rate relabeling.
//!
//! The buffer is treated as if it had been recorded at `rate * speed_factor`
//! and then resampled back to `rate`. Duration shrinks by `1 / speed_factor`
//! and pitch rises by `speed_factor`; this is not a pitch-preserving stretch.

use tracing::debug;

use crate::buffer::AudioBuffer;
use crate::error::AudioError;

pub fn rescale(audio: &AudioBuffer, speed_factor: f64) -> Result<AudioBuffer, AudioError> {
    if !speed_factor.is_finite() || speed_factor <= 0.0 {
        return Err(AudioError::InvalidSpeedFactor(speed_factor));
    }
    audio.validate()?;

    let channels = audio.channels as usize;
    let frames = audio.frames();
    if frames == 0 || speed_factor == 1.0 {
        return Ok(audio.clone());
    }

    let out_frames = output_frames(frames, channels, speed_factor)
        .ok_or(AudioError::InvalidSpeedFactor(speed_factor))?;
    let mut samples = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        let pos = i as f64 * speed_factor;
        let idx0 = (pos.floor() as usize).min(frames - 1);
        let idx1 = (idx0 + 1).min(frames - 1);
        let frac = (pos - idx0 as f64).clamp(0.0, 1.0) as f32;
        let frame0 = &audio.samples[idx0 * channels..(idx0 + 1) * channels];
        let frame1 = &audio.samples[idx1 * channels..(idx1 + 1) * channels];
        for (a, b) in frame0.iter().zip(frame1) {
            samples.push(a + (b - a) * frac);
        }
    }

    debug!(
        speed_factor,
        input_frames = frames,
        output_frames = out_frames,
        sample_rate = audio.sample_rate,
        "rescaled audio"
    );
    Ok(AudioBuffer {
        sample_rate: audio.sample_rate,
        channels: audio.channels,
        samples,
    })
}

/// Output frame count, or `None` when the interleaved result would not fit in a `Vec<f32>`.
fn output_frames(frames: usize, channels: usize, speed_factor: f64) -> Option<usize> {
    let out_frames = (frames as f64 / speed_factor).round();
    let max_samples = isize::MAX as usize / std::mem::size_of::<f32>();
    if !out_frames.is_finite() || out_frames >= max_samples as f64 {
        return None;
    }
    let out_frames = out_frames as usize;
    out_frames
        .checked_mul(channels)
        .filter(|&len| len <= max_samples)
        .map(|_| out_frames)
}
