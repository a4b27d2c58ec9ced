//! Click-track rendering for auditioning beat positions.

use retempo_domain::BeatSequence;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::AudioBuffer;
use crate::dsp::{fade_in, fade_out, ms_to_samples, normalize_peak};
use crate::error::AudioError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClickSettings {
    pub frequency_hz: f32,
    /// Length of each click impulse.
    pub click_ms: f32,
    /// Fade applied to both ends of every click.
    pub click_fade_ms: f32,
    /// Fade applied to both ends of the rendered track.
    pub edge_fade_ms: f32,
    /// Distance of the normalized peak below full scale.
    pub headroom_db: f32,
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self {
            frequency_hz: 1_000.0,
            click_ms: 5.0,
            click_fade_ms: 1.0,
            edge_fade_ms: 10.0,
            headroom_db: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClickTrackSpec {
    pub beat_times: BeatSequence,
    pub duration: f64,
    pub sample_rate: u32,
}

impl ClickTrackSpec {
    pub fn new(beat_times: BeatSequence, duration: f64, sample_rate: u32) -> Self {
        Self {
            beat_times,
            duration,
            sample_rate,
        }
    }

    fn validate(&self) -> Result<(), AudioError> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(AudioError::InvalidClickSpec(format!(
                "duration must be finite and positive, got {}",
                self.duration
            )));
        }
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidClickSpec(
                "sample rate must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClickSynthesizer {
    settings: ClickSettings,
}

impl ClickSynthesizer {
    pub fn new(settings: ClickSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ClickSettings {
        &self.settings
    }

    /// Renders a fixed-length mono track with one click per beat.
    ///
    /// Beats after `spec.duration` are dropped.
    pub fn synthesize(&self, spec: &ClickTrackSpec) -> Result<AudioBuffer, AudioError> {
        spec.validate()?;
        let sample_rate = spec.sample_rate;
        let total = (spec.duration * sample_rate as f64).round() as usize;
        let mut samples = vec![0.0f32; total];
        let click = self.render_click(sample_rate);

        let mut placed = 0usize;
        let mut dropped = 0usize;
        for &time in spec.beat_times.times() {
            if time > spec.duration {
                dropped += 1;
                continue;
            }
            let offset = (time * sample_rate as f64).round() as usize;
            if offset >= total {
                dropped += 1;
                continue;
            }
            for (dst, src) in samples[offset..].iter_mut().zip(&click) {
                *dst += *src;
            }
            placed += 1;
        }

        let edge = ms_to_samples(self.settings.edge_fade_ms, sample_rate);
        fade_in(&mut samples, edge);
        fade_out(&mut samples, edge);
        let peak = normalize_peak(&mut samples, self.settings.headroom_db);

        debug!(
            placed,
            dropped,
            frames = total,
            raw_peak = peak.magnitude(),
            "synthesized click track"
        );
        Ok(AudioBuffer {
            sample_rate,
            channels: 1,
            samples,
        })
    }

    fn render_click(&self, sample_rate: u32) -> Vec<f32> {
        let len = ms_to_samples(self.settings.click_ms, sample_rate);
        let step = std::f32::consts::TAU * self.settings.frequency_hz / sample_rate as f32;
        let mut click: Vec<f32> = (0..len).map(|i| (step * i as f32).sin()).collect();
        let fade = ms_to_samples(self.settings.click_fade_ms, sample_rate);
        fade_in(&mut click, fade);
        fade_out(&mut click, fade);
        click
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::db_to_gain;
    use approx::assert_abs_diff_eq;

    fn beats(times: &[f64]) -> BeatSequence {
        BeatSequence::new(times.to_vec()).unwrap()
    }

    fn nonzero_range(samples: &[f32]) -> Option<(usize, usize)> {
        let first = samples.iter().position(|s| *s != 0.0)?;
        let last = samples.iter().rposition(|s| *s != 0.0)?;
        Some((first, last))
    }

    #[test]
    fn empty_beats_render_silence_of_exact_length() {
        let spec = ClickTrackSpec::new(BeatSequence::empty(), 2.5, 44_100);
        let track = ClickSynthesizer::default().synthesize(&spec).unwrap();
        assert_eq!(track.channels, 1);
        assert_eq!(track.frames(), 110_250);
        assert_abs_diff_eq!(track.duration_secs(), 2.5);
        assert!(track.peak().magnitude() <= db_to_gain(-1.0));
        assert!(track.samples.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn clicks_land_on_beats_and_peak_at_headroom() {
        let spec = ClickTrackSpec::new(beats(&[0.5, 1.0]), 2.0, 44_100);
        let track = ClickSynthesizer::default().synthesize(&spec).unwrap();
        assert_abs_diff_eq!(track.peak().magnitude(), db_to_gain(-1.0), epsilon = 1e-5);

        let (first, last) = nonzero_range(&track.samples).unwrap();
        // The click fade starts at zero gain, so sound begins one sample late.
        assert_eq!(first, 22_051);
        assert!(last < 44_100 + 221);
        assert!(track.samples[22_050 + 221..44_100].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn drops_beats_past_duration() {
        let spec = ClickTrackSpec::new(beats(&[0.25, 1.5, 3.0]), 1.0, 8_000);
        let track = ClickSynthesizer::default().synthesize(&spec).unwrap();
        assert_eq!(track.frames(), 8_000);
        let (_, last) = nonzero_range(&track.samples).unwrap();
        assert!(last < 2_000 + 40);
    }

    #[test]
    fn click_at_the_tail_is_truncated_and_final_beat_dropped() {
        let synth = ClickSynthesizer::default();
        let track = synth
            .synthesize(&ClickTrackSpec::new(beats(&[0.998, 1.0]), 1.0, 44_100))
            .unwrap();
        assert_eq!(track.frames(), 44_100);
        assert_abs_diff_eq!(track.peak().magnitude(), db_to_gain(-1.0), epsilon = 1e-5);

        // 0.998 s lands on sample 44_012; only 88 of the 221 click samples fit.
        let (first, last) = nonzero_range(&track.samples).unwrap();
        assert_eq!(first, 44_013);
        assert!(last < 44_100);

        // A beat exactly at the end has no room and contributes nothing.
        let without_final = synth
            .synthesize(&ClickTrackSpec::new(beats(&[0.998]), 1.0, 44_100))
            .unwrap();
        assert_eq!(track, without_final);
    }

    #[test]
    fn length_is_independent_of_beat_count() {
        let synth = ClickSynthesizer::default();
        let sparse = synth
            .synthesize(&ClickTrackSpec::new(beats(&[0.1]), 1.0, 16_000))
            .unwrap();
        let dense = synth
            .synthesize(&ClickTrackSpec::new(
                BeatSequence::new((0..40).map(|i| i as f64 * 0.05).collect()).unwrap(),
                1.0,
                16_000,
            ))
            .unwrap();
        assert_eq!(sparse.frames(), dense.frames());
        assert!(dense.peak().magnitude() <= db_to_gain(-1.0) + 1e-6);
    }

    #[test]
    fn global_fade_silences_edges() {
        let spec = ClickTrackSpec::new(beats(&[0.0]), 0.5, 44_100);
        let track = ClickSynthesizer::default().synthesize(&spec).unwrap();
        assert_eq!(track.samples[0], 0.0);
        assert_eq!(*track.samples.last().unwrap(), 0.0);
    }

    #[test]
    fn custom_settings_change_click_pitch() {
        let settings = ClickSettings {
            frequency_hz: 500.0,
            click_ms: 20.0,
            ..ClickSettings::default()
        };
        let synth = ClickSynthesizer::new(settings);
        assert_eq!(synth.settings().frequency_hz, 500.0);
        let click = synth.render_click(48_000);
        assert_eq!(click.len(), 960);
        let crossings = click
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();
        assert!((18..=21).contains(&crossings), "{crossings} crossings");
    }

    #[test]
    fn rejects_invalid_specs() {
        let synth = ClickSynthesizer::default();
        for (duration, rate) in [(0.0, 44_100), (-1.0, 44_100), (f64::NAN, 44_100), (1.0, 0)] {
            let spec = ClickTrackSpec::new(BeatSequence::empty(), duration, rate);
            assert!(matches!(
                synth.synthesize(&spec),
                Err(AudioError::InvalidClickSpec(_))
            ));
        }
    }
}
