use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use retempo_audio::io::{write_wav, AudioDecoder};
use retempo_audio::{rescale, AudioBuffer, ClickSynthesizer, ClickTrackSpec};
use retempo_domain::io::JsonExporter;
use retempo_domain::{
    adjust, AdjustmentReport, AdjustmentResult, BeatSequence, ExportFormat, ReportExporter,
};

use crate::config::RetempoConfig;
use crate::tracker::{BeatTracker, TrackedBeats};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetempoJob {
    pub audio_path: PathBuf,
    pub target_bpm: f64,
    pub output_dir: PathBuf,
}

/// Files written by [`RetempoPipeline::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetempoOutputs {
    pub report: AdjustmentReport,
    pub original_clicks: PathBuf,
    pub adjusted_clicks: PathBuf,
    pub adjusted_audio: PathBuf,
    pub report_path: PathBuf,
}

pub struct RetempoPipeline {
    config: RetempoConfig,
    clicks: ClickSynthesizer,
}

impl RetempoPipeline {
    pub fn new(config: RetempoConfig) -> Self {
        let clicks = ClickSynthesizer::new(config.click);
        Self { config, clicks }
    }

    pub fn config(&self) -> &RetempoConfig {
        &self.config
    }

    /// Remaps tracked beats to `target_bpm` after checking the target range.
    pub fn analyze(
        &self,
        tracked: &TrackedBeats,
        target_bpm: f64,
    ) -> Result<(AdjustmentResult, AdjustmentReport)> {
        self.config.target_bounds.check("target tempo", target_bpm)?;
        let result = adjust(tracked.estimate, &tracked.beats, target_bpm)?;
        let report = AdjustmentReport::new(tracked.estimate, target_bpm, &result);
        Ok((result, report))
    }

    /// Changes playback speed, enforcing the configured speed range if enabled.
    pub fn adjust_audio(&self, audio: &AudioBuffer, speed_factor: f64) -> Result<AudioBuffer> {
        if self.config.enforce_speed_bounds {
            self.config.speed_bounds.check("speed factor", speed_factor)?;
        } else if !self.config.speed_bounds.contains(speed_factor) {
            warn!(speed_factor, "speed factor outside recommended range");
        }
        Ok(rescale(audio, speed_factor)?)
    }

    /// Renders a verification click track laid out with the configured channel count.
    pub fn render_clicks(&self, beats: &BeatSequence) -> Result<AudioBuffer> {
        let spec = ClickTrackSpec::new(
            beats.clone(),
            self.config.click_duration_secs,
            self.config.click_sample_rate,
        );
        let mono = self.clicks.synthesize(&spec)?;
        Ok(mono.with_channels(self.config.click_channels)?)
    }

    /// Decodes the job's audio, tracks and remaps its beats, and writes the
    /// adjusted audio, both click tracks and the report to `job.output_dir`.
    #[instrument(skip(self, tracker), fields(audio = ?job.audio_path, target_bpm = job.target_bpm))]
    pub fn run(&self, job: &RetempoJob, tracker: &dyn BeatTracker) -> Result<RetempoOutputs> {
        info!("loading audio");
        let audio = AudioDecoder::open(&job.audio_path)
            .with_context(|| format!("decode {:?}", job.audio_path))?;
        let tracked = tracker.track(&audio).context("beat tracking failed")?;
        let (result, report) = self.analyze(&tracked, job.target_bpm)?;
        let adjusted_audio = self.adjust_audio(&audio, result.speed_factor)?;

        std::fs::create_dir_all(&job.output_dir)
            .with_context(|| format!("create output dir {:?}", job.output_dir))?;
        let stem = file_stem(&job.audio_path);
        let tag = format!("{}_adjusted_{:.0}bpm", stem, job.target_bpm);
        let outputs = RetempoOutputs {
            original_clicks: job.output_dir.join(format!("{stem}_original_beats.wav")),
            adjusted_clicks: job.output_dir.join(format!("{tag}.wav")),
            adjusted_audio: job.output_dir.join(format!("{tag}_audio.wav")),
            report_path: job.output_dir.join(format!("{stem}_report.json")),
            report,
        };

        info!("rendering click tracks");
        write_wav(&outputs.original_clicks, &self.render_clicks(&tracked.beats)?)?;
        write_wav(&outputs.adjusted_clicks, &self.render_clicks(&result.adjusted_beats)?)?;
        write_wav(&outputs.adjusted_audio, &adjusted_audio)?;
        let json = JsonExporter.export(&outputs.report, ExportFormat::Json)?;
        std::fs::write(&outputs.report_path, json)
            .with_context(|| format!("write report {:?}", outputs.report_path))?;

        info!(
            hypothesis = outputs.report.hypothesis.as_str(),
            speed_factor = outputs.report.speed_factor,
            beats = outputs.report.beat_count,
            "retempo finished"
        );
        Ok(outputs)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("audio")
        .to_string()
}
