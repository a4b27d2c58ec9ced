use serde::{Deserialize, Serialize};
use tracing::info;

use crate::beats::{remap, BeatSequence};
use crate::tempo::{resolve, TempoEstimate, TempoHypothesis};
use crate::DomainError;

/// Beats rescaled to a target tempo plus the matching playback-rate multiplier.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdjustmentResult {
    pub adjusted_beats: BeatSequence,
    pub speed_factor: f64,
    pub hypothesis: TempoHypothesis,
    pub effective_tempo: f64,
}

/// Resolves the tempo hypothesis and remaps `beats` to `target_bpm`.
pub fn adjust(
    estimate: TempoEstimate,
    beats: &BeatSequence,
    target_bpm: f64,
) -> Result<AdjustmentResult, DomainError> {
    let resolution = resolve(estimate.bpm(), target_bpm)?;
    let adjusted_beats = remap(
        beats,
        resolution.hypothesis,
        resolution.effective_tempo,
        resolution.target_bpm,
    )?;
    info!(
        original_bpm = estimate.bpm(),
        target_bpm,
        hypothesis = resolution.hypothesis.as_str(),
        speed_factor = resolution.speed_factor,
        beats = adjusted_beats.len(),
        "adjusted beats to target tempo"
    );
    Ok(AdjustmentResult {
        adjusted_beats,
        speed_factor: resolution.speed_factor,
        hypothesis: resolution.hypothesis,
        effective_tempo: resolution.effective_tempo,
    })
}

/// Summary of an adjustment, shaped for API and UI consumers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdjustmentReport {
    pub original_tempo: f64,
    pub target_tempo: f64,
    pub hypothesis: TempoHypothesis,
    pub effective_tempo: f64,
    pub speed_factor: f64,
    pub beat_count: usize,
    pub beat_times: Vec<f64>,
    pub beat_intervals: Vec<f64>,
    /// Last adjusted beat in seconds, or zero without beats.
    pub duration: f64,
    pub implied_bpm: Option<f64>,
}

impl AdjustmentReport {
    pub fn new(estimate: TempoEstimate, target_tempo: f64, result: &AdjustmentResult) -> Self {
        let beats = &result.adjusted_beats;
        Self {
            original_tempo: estimate.bpm(),
            target_tempo,
            hypothesis: result.hypothesis,
            effective_tempo: result.effective_tempo,
            speed_factor: result.speed_factor,
            beat_count: beats.len(),
            beat_times: beats.times().to_vec(),
            beat_intervals: beats.intervals(),
            duration: beats.last().unwrap_or(0.0),
            implied_bpm: beats.implied_bpm(),
        }
    }
}
