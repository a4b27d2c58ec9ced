use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use retempo_audio::AudioBuffer;
use retempo_domain::{BeatSequence, TempoEstimate};

/// Tempo and beat onsets reported by a beat tracker.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedBeats {
    pub estimate: TempoEstimate,
    pub beats: BeatSequence,
}

impl TrackedBeats {
    pub fn new(bpm: f64, beats: Vec<f64>) -> Result<Self> {
        Ok(Self {
            estimate: TempoEstimate::new(bpm)?,
            beats: BeatSequence::new(beats)?,
        })
    }
}

/// Seam for the external beat-tracking estimator.
pub trait BeatTracker: Send + Sync {
    fn track(&self, audio: &AudioBuffer) -> Result<TrackedBeats>;
}

#[derive(Debug, Deserialize)]
struct BeatFileRecord {
    bpm: f64,
    beats: Vec<f64>,
}

/// Reads tracker output saved as `{"bpm": 128.0, "beats": [0.12, 0.59, ...]}`.
#[derive(Debug, Clone)]
pub struct BeatFileTracker {
    path: PathBuf,
}

impl BeatFileTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(path: &Path) -> Result<TrackedBeats> {
        let file = File::open(path).with_context(|| format!("open beat file {:?}", path))?;
        let record: BeatFileRecord = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse beat file {:?}", path))?;
        info!(bpm = record.bpm, beats = record.beats.len(), "loaded beats");
        TrackedBeats::new(record.bpm, record.beats)
            .with_context(|| format!("invalid beat file {:?}", path))
    }
}

impl BeatTracker for BeatFileTracker {
    fn track(&self, audio: &AudioBuffer) -> Result<TrackedBeats> {
        let tracked = Self::load(&self.path)?;
        if let Some(last) = tracked.beats.last() {
            if last > audio.duration_secs() {
                debug!(
                    last_beat = last,
                    audio_secs = audio.duration_secs(),
                    "beat file extends past the end of the audio"
                );
            }
        }
        Ok(tracked)
    }
}

/// Tracker that returns beats supplied up front.
#[derive(Debug, Clone)]
pub struct FixedBeats(pub TrackedBeats);

impl BeatTracker for FixedBeats {
    fn track(&self, _audio: &AudioBuffer) -> Result<TrackedBeats> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_beat_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beats.json");
        std::fs::write(&path, r#"{"bpm": 140.0, "beats": [0.0, 0.43, 0.86]}"#).unwrap();
        let tracker = BeatFileTracker::new(&path);
        let tracked = tracker.track(&AudioBuffer::silent(0, 44_100, 1)).unwrap();
        assert_eq!(tracked.estimate.bpm(), 140.0);
        assert_eq!(tracked.beats.len(), 3);
    }

    #[test]
    fn rejects_invalid_beat_files() {
        let dir = tempfile::tempdir().unwrap();
        let zero_bpm = dir.path().join("zero.json");
        std::fs::write(&zero_bpm, r#"{"bpm": 0.0, "beats": []}"#).unwrap();
        assert!(BeatFileTracker::load(&zero_bpm).is_err());

        let unordered = dir.path().join("unordered.json");
        std::fs::write(&unordered, r#"{"bpm": 90.0, "beats": [1.0, 0.5]}"#).unwrap();
        assert!(BeatFileTracker::load(&unordered).is_err());

        assert!(BeatFileTracker::load(Path::new("missing.json")).is_err());
    }

    #[test]
    fn fixed_beats_are_returned_as_is() {
        let tracked = TrackedBeats::new(100.0, vec![0.0, 0.6]).unwrap();
        let tracker = FixedBeats(tracked.clone());
        assert_eq!(tracker.track(&AudioBuffer::silent(10, 8_000, 1)).unwrap(), tracked);
    }
}
