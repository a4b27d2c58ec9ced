use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tempo::{ensure_positive_tempo, TempoHypothesis};
use crate::DomainError;

/// Beat onsets in seconds, non-negative and non-decreasing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BeatSequence {
    times: Vec<f64>,
}

impl BeatSequence {
    pub fn new(times: Vec<f64>) -> Result<Self, DomainError> {
        if let Some(bad) = times.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(DomainError::validation(format!(
                "beat times must be finite and non-negative, got {bad}"
            )));
        }
        if let Some(pair) = times.windows(2).find(|pair| pair[1] < pair[0]) {
            return Err(DomainError::validation(format!(
                "beat times must be non-decreasing, got {} after {}",
                pair[1], pair[0]
            )));
        }
        Ok(Self { times })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.times
    }

    /// Spacing between consecutive beats.
    pub fn intervals(&self) -> Vec<f64> {
        self.times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn mean_interval(&self) -> Option<f64> {
        let intervals = self.intervals();
        if intervals.is_empty() {
            return None;
        }
        Some(intervals.iter().sum::<f64>() / intervals.len() as f64)
    }

    /// Tempo implied by the mean beat spacing.
    pub fn implied_bpm(&self) -> Option<f64> {
        self.mean_interval()
            .filter(|interval| *interval > 0.0)
            .map(|interval| 60.0 / interval)
    }

    fn scaled(times: impl Iterator<Item = f64>, beat_time_scale: f64) -> Self {
        Self {
            times: times.map(|t| t * beat_time_scale).collect(),
        }
    }
}

impl TryFrom<Vec<f64>> for BeatSequence {
    type Error = DomainError;

    fn try_from(times: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(times)
    }
}

impl From<BeatSequence> for Vec<f64> {
    fn from(beats: BeatSequence) -> Self {
        beats.times
    }
}

/// Applies a resolved hypothesis to `beats`.
///
/// Every emitted timestamp is multiplied by `effective_original_tempo /
/// target_tempo`. An empty sequence is returned unchanged before any tempo is
/// inspected.
pub fn remap(
    beats: &BeatSequence,
    hypothesis: TempoHypothesis,
    effective_original_tempo: f64,
    target_tempo: f64,
) -> Result<BeatSequence, DomainError> {
    if beats.is_empty() {
        return Ok(BeatSequence::empty());
    }
    let effective = ensure_positive_tempo("effective tempo", effective_original_tempo)?;
    let target = ensure_positive_tempo("target tempo", target_tempo)?;
    let beat_time_scale = effective / target;

    let times = beats.times();
    let remapped = match hypothesis {
        TempoHypothesis::Same => BeatSequence::scaled(times.iter().copied(), beat_time_scale),
        TempoHypothesis::Half => {
            BeatSequence::scaled(times.iter().step_by(2).copied(), beat_time_scale)
        }
        TempoHypothesis::Double => {
            let mut interpolated = Vec::with_capacity(times.len() * 2 - 1);
            for pair in times.windows(2) {
                interpolated.push(pair[0]);
                interpolated.push((pair[0] + pair[1]) / 2.0);
            }
            interpolated.extend(times.last());
            BeatSequence::scaled(interpolated.into_iter(), beat_time_scale)
        }
    };

    debug!(
        hypothesis = hypothesis.as_str(),
        input_beats = beats.len(),
        output_beats = remapped.len(),
        beat_time_scale,
        "remapped beats"
    );
    Ok(remapped)
}
