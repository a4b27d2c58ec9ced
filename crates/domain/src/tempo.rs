use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::DomainError;

/// Tempo reported by the external beat tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempoEstimate {
    bpm: f64,
}

impl TempoEstimate {
    pub fn new(bpm: f64) -> Result<Self, DomainError> {
        Ok(Self {
            bpm: ensure_positive_tempo("estimated tempo", bpm)?,
        })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }
}

pub(crate) fn ensure_positive_tempo(context: &'static str, bpm: f64) -> Result<f64, DomainError> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(bpm)
    } else {
        Err(DomainError::invalid_tempo(context, bpm))
    }
}

/// Relationship between the tracker's estimate and the tempo the listener hears.
///
/// Trackers commonly lock onto an octave of the true pulse, so the target is
/// matched against the estimate itself, half of it, and double it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TempoHypothesis {
    Same,
    /// Estimate is double the true pulse; every other beat is dropped.
    Half,
    /// Estimate is half the true pulse; a beat is inserted between each pair.
    Double,
}

impl TempoHypothesis {
    /// Candidates in tie-break order.
    pub const ALL: [TempoHypothesis; 3] = [
        TempoHypothesis::Same,
        TempoHypothesis::Half,
        TempoHypothesis::Double,
    ];

    pub fn effective_tempo(self, estimated_bpm: f64) -> f64 {
        match self {
            TempoHypothesis::Same => estimated_bpm,
            TempoHypothesis::Half => estimated_bpm / 2.0,
            TempoHypothesis::Double => estimated_bpm * 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TempoHypothesis::Same => "same",
            TempoHypothesis::Half => "half",
            TempoHypothesis::Double => "double",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub hypothesis: TempoHypothesis,
    /// Tempo of the original material under the chosen hypothesis.
    pub effective_tempo: f64,
    pub target_bpm: f64,
    /// Playback-rate multiplier for the paired audio: `target / effective`.
    pub speed_factor: f64,
}

impl Resolution {
    /// Multiplier for beat timestamps: `effective / target`.
    ///
    /// Numerically the reciprocal of `speed_factor`, but it scales times, not
    /// playback rate, and must not be substituted for it.
    pub fn beat_time_scale(&self) -> f64 {
        self.effective_tempo / self.target_bpm
    }
}

/// Picks the hypothesis whose effective tempo is closest to `target_bpm`.
///
/// Ties go to the earlier entry of [`TempoHypothesis::ALL`].
pub fn resolve(estimated_bpm: f64, target_bpm: f64) -> Result<Resolution, DomainError> {
    let estimated = ensure_positive_tempo("estimated tempo", estimated_bpm)?;
    let target = ensure_positive_tempo("target tempo", target_bpm)?;

    let mut hypothesis = TempoHypothesis::Same;
    let mut best_diff = f64::INFINITY;
    for candidate in TempoHypothesis::ALL {
        let diff = (target - candidate.effective_tempo(estimated)).abs();
        if diff < best_diff {
            hypothesis = candidate;
            best_diff = diff;
        }
    }

    let effective_tempo = hypothesis.effective_tempo(estimated);
    let speed_factor = target / effective_tempo;
    debug!(
        estimated_bpm = estimated,
        target_bpm = target,
        hypothesis = hypothesis.as_str(),
        effective_tempo,
        speed_factor,
        "resolved tempo hypothesis"
    );
    Ok(Resolution {
        hypothesis,
        effective_tempo,
        target_bpm: target,
        speed_factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tempo_estimate_validation() {
        assert!(TempoEstimate::new(0.0).is_err());
        assert!(TempoEstimate::new(-90.0).is_err());
        assert!(TempoEstimate::new(f64::NAN).is_err());
        assert!(TempoEstimate::new(f64::INFINITY).is_err());
        let estimate = TempoEstimate::new(120.0).unwrap();
        assert_relative_eq!(estimate.seconds_per_beat(), 0.5);
    }

    #[test]
    fn resolves_half_for_octave_error() {
        let resolution = resolve(140.0, 68.0).unwrap();
        assert_eq!(resolution.hypothesis, TempoHypothesis::Half);
        assert_relative_eq!(resolution.effective_tempo, 70.0);
        assert_relative_eq!(resolution.speed_factor, 68.0 / 70.0);
        assert_relative_eq!(resolution.beat_time_scale(), 70.0 / 68.0);
    }

    #[test]
    fn resolves_double_and_same() {
        let double = resolve(70.0, 150.0).unwrap();
        assert_eq!(double.hypothesis, TempoHypothesis::Double);
        assert_relative_eq!(double.effective_tempo, 140.0);

        let same = resolve(120.0, 126.0).unwrap();
        assert_eq!(same.hypothesis, TempoHypothesis::Same);
        assert_relative_eq!(same.speed_factor, 1.05);
    }

    #[test]
    fn ties_prefer_same() {
        // |75 - 100| == |75 - 50|
        assert_eq!(resolve(100.0, 75.0).unwrap().hypothesis, TempoHypothesis::Same);
        // |150 - 100| == |150 - 200|
        assert_eq!(resolve(100.0, 150.0).unwrap().hypothesis, TempoHypothesis::Same);
    }

    #[test]
    fn selected_candidate_is_closest() {
        for estimated in [55.0, 90.0, 128.0, 174.0, 210.0] {
            for target in [40.0, 60.0, 85.0, 120.0, 175.0, 240.0] {
                let resolution = resolve(estimated, target).unwrap();
                let chosen = (target - resolution.effective_tempo).abs();
                for candidate in TempoHypothesis::ALL {
                    let diff = (target - candidate.effective_tempo(estimated)).abs();
                    assert!(chosen <= diff, "{estimated} -> {target}: {candidate:?} closer");
                }
            }
        }
    }

    #[test]
    fn rejects_non_positive_tempos() {
        assert!(matches!(
            resolve(0.0, 120.0),
            Err(DomainError::InvalidTempo { context: "estimated tempo", .. })
        ));
        assert!(matches!(
            resolve(120.0, -1.0),
            Err(DomainError::InvalidTempo { context: "target tempo", .. })
        ));
    }
}
