use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use retempo_audio::io::{write_wav, AudioDecoder};
use retempo_domain::io::{JsonExporter, YamlExporter};
use retempo_domain::{ExportFormat, ReportExporter};
use retempo_remapper::{BeatFileTracker, RetempoConfig, RetempoJob, RetempoPipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Remap beats to a target tempo and render verification audio", long_about = None)]
struct Cli {
    /// JSON or YAML config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the adjustment report for a beat file
    Analyze {
        /// Beat tracker output: {"bpm": .., "beats": [..]}
        #[arg(short, long)]
        beats: PathBuf,
        /// Target tempo in BPM
        #[arg(short, long)]
        target: Option<f64>,
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,
    },
    /// Change playback speed (and pitch) of an audio file
    Speed {
        input: PathBuf,
        /// Playback-rate multiplier
        #[arg(short, long)]
        factor: f64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Render a click track for a beat file
    Click {
        #[arg(short, long)]
        beats: PathBuf,
        /// Remap the beats to this tempo before rendering
        #[arg(long)]
        adjust_to: Option<f64>,
        /// Length of the rendered track in seconds
        #[arg(short, long)]
        duration: Option<f64>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Adjust audio and render click tracks for both beat grids
    Run {
        audio: PathBuf,
        #[arg(short, long)]
        beats: PathBuf,
        #[arg(short, long)]
        target: Option<f64>,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ReportFormat {
    Json,
    Yaml,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = RetempoConfig::load_or_default(cli.config.as_deref())?;
    let default_target = config.default_target_bpm;

    match cli.command {
        Command::Analyze {
            beats,
            target,
            format,
        } => {
            let tracked = BeatFileTracker::load(&beats)?;
            let pipeline = RetempoPipeline::new(config);
            let (_, report) = pipeline.analyze(&tracked, target.unwrap_or(default_target))?;
            let bytes = match format {
                ReportFormat::Json => JsonExporter.export(&report, ExportFormat::Json)?,
                ReportFormat::Yaml => YamlExporter.export(&report, ExportFormat::Yaml)?,
            };
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        Command::Speed {
            input,
            factor,
            output,
        } => {
            let audio =
                AudioDecoder::open(&input).with_context(|| format!("decode {:?}", input))?;
            let pipeline = RetempoPipeline::new(config);
            let adjusted = pipeline.adjust_audio(&audio, factor)?;
            write_wav(&output, &adjusted)?;
            info!(
                input_secs = audio.duration_secs(),
                output_secs = adjusted.duration_secs(),
                "speed adjusted"
            );
        }
        Command::Click {
            beats,
            adjust_to,
            duration,
            output,
        } => {
            let mut config = config;
            if let Some(duration) = duration {
                config.click_duration_secs = duration;
            }
            let tracked = BeatFileTracker::load(&beats)?;
            let pipeline = RetempoPipeline::new(config);
            let grid = match adjust_to {
                Some(target) => pipeline.analyze(&tracked, target)?.0.adjusted_beats,
                None => tracked.beats,
            };
            write_wav(&output, &pipeline.render_clicks(&grid)?)?;
        }
        Command::Run {
            audio,
            beats,
            target,
            out_dir,
        } => {
            let pipeline = RetempoPipeline::new(config);
            let job = RetempoJob {
                audio_path: audio,
                target_bpm: target.unwrap_or(default_target),
                output_dir: out_dir,
            };
            let outputs = pipeline.run(&job, &BeatFileTracker::new(beats))?;
            println!("Files created:");
            println!("- Original beats: {}", outputs.original_clicks.display());
            println!("- Adjusted beats: {}", outputs.adjusted_clicks.display());
            println!("- Adjusted audio: {}", outputs.adjusted_audio.display());
            println!("- Report: {}", outputs.report_path.display());
        }
    }
    Ok(())
}
