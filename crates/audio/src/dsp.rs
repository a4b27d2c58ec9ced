#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakLevel {
    pub max: f32,
    pub min: f32,
}

impl PeakLevel {
    pub fn silence() -> Self {
        Self { max: 0.0, min: 0.0 }
    }

    /// Largest absolute sample value.
    pub fn magnitude(&self) -> f32 {
        self.max.abs().max(self.min.abs())
    }
}

pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

pub fn ms_to_samples(ms: f32, sample_rate: u32) -> usize {
    (ms as f64 * sample_rate as f64 / 1000.0).round().max(0.0) as usize
}

pub fn peak_level(buffer: &[f32]) -> PeakLevel {
    let mut peak = PeakLevel::silence();
    for sample in buffer.iter() {
        peak.max = peak.max.max(*sample);
        peak.min = peak.min.min(*sample);
    }
    peak
}

/// Scales the buffer so its peak sits `headroom_db` below full scale.
///
/// Returns the peak measured before scaling. Silent buffers are left alone.
pub fn normalize_peak(buffer: &mut [f32], headroom_db: f32) -> PeakLevel {
    let peak = peak_level(buffer);
    let magnitude = peak.magnitude();
    if magnitude <= f32::EPSILON {
        return peak;
    }
    let gain = db_to_gain(-headroom_db.abs()) / magnitude;
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
    peak
}

/// Linear ramp from silence over the first `len` samples of a mono buffer.
pub fn fade_in(buffer: &mut [f32], len: usize) {
    let len = len.min(buffer.len());
    for (i, sample) in buffer[..len].iter_mut().enumerate() {
        *sample *= i as f32 / len as f32;
    }
}

/// Linear ramp to silence over the last `len` samples of a mono buffer.
pub fn fade_out(buffer: &mut [f32], len: usize) {
    let len = len.min(buffer.len());
    let start = buffer.len() - len;
    for (i, sample) in buffer[start..].iter_mut().enumerate() {
        *sample *= (len - 1 - i) as f32 / len as f32;
    }
}
