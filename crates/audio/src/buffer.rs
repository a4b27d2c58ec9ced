use serde::{Deserialize, Serialize};

use crate::dsp::{peak_level, PeakLevel};
use crate::error::AudioError;

/// Decoded PCM audio. Samples are interleaved by frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        let buffer = Self {
            sample_rate,
            channels,
            samples,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    pub fn silent(frames: usize, sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            samples: vec![0.0; frames * channels as usize],
        }
    }

    /// Checks that the buffer describes playable PCM.
    pub fn validate(&self) -> Result<(), AudioError> {
        if self.sample_rate == 0 {
            return Err(AudioError::decode("sample rate must be non-zero"));
        }
        if self.channels == 0 {
            return Err(AudioError::decode("channel count must be non-zero"));
        }
        if self.samples.len() % self.channels as usize != 0 {
            return Err(AudioError::decode(format!(
                "{} samples do not divide into {} channels",
                self.samples.len(),
                self.channels
            )));
        }
        Ok(())
    }

    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn peak(&self) -> PeakLevel {
        peak_level(&self.samples)
    }

    /// Returns a copy laid out with `channels` channels.
    ///
    /// Mono sources are duplicated across channels and any source can be
    /// averaged down to mono.
    pub fn with_channels(&self, channels: u16) -> Result<AudioBuffer, AudioError> {
        self.validate()?;
        if channels == self.channels {
            return Ok(self.clone());
        }
        let samples = match (self.channels, channels) {
            (_, 0) => {
                return Err(AudioError::UnsupportedChannels {
                    from: self.channels,
                    to: channels,
                })
            }
            (1, to) => self
                .samples
                .iter()
                .flat_map(|&sample| std::iter::repeat(sample).take(to as usize))
                .collect(),
            (from, 1) => self
                .samples
                .chunks_exact(from as usize)
                .map(|frame| frame.iter().sum::<f32>() / from as f32)
                .collect(),
            (from, to) => return Err(AudioError::UnsupportedChannels { from, to }),
        };
        Ok(AudioBuffer {
            sample_rate: self.sample_rate,
            channels,
            samples,
        })
    }
}
