use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use frame_sampler::{
    FfmpegLogLevel, FrameSampler, OutputFormat, PixelFormat, ProgressCallback, ProgressInfo,
    RunSummary, SamplerConfig, Stride, VideoSource, WriteFailurePolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const CLI_AFTER_HELP: &str = "Examples:\n  frame-sampler sample input.mp4 --out frames\n  frame-sampler sample input.mp4 --out frames --every 10 --ext png --progress\n  frame-sampler probe input.mp4 --json\n  frame-sampler completions zsh > _frame-sampler";

#[derive(Debug, Parser)]
#[command(
    name = "frame-sampler",
    version,
    about = "Save still frames from a video at a fixed cadence",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while sampling.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write every K-th frame of a video to a directory.
    #[command(
        about = "Sample frames to an output directory",
        after_help = "Examples:\n  frame-sampler sample input.mp4 --out frames\n  frame-sampler sample input.mp4 --out frames --every 30 --quality 85"
    )]
    Sample {
        /// Input video path.
        input: String,
        /// Output directory for frame images. Created if missing.
        #[arg(long)]
        out: PathBuf,
        /// Save every Nth frame. Defaults to one frame per second of playback.
        #[arg(long)]
        every: Option<u64>,
        /// Output image extension (jpg, jpeg, png, bmp).
        #[arg(long, default_value = "jpg")]
        ext: String,
        /// JPEG quality (1-100).
        #[arg(long)]
        quality: Option<u8>,
        /// Pixel format of saved frames (rgb8, gray8).
        #[arg(long, default_value = "rgb8")]
        pixel_format: String,
        /// What to do when a frame cannot be written (skip, abort).
        #[arg(long, default_value = "skip")]
        on_write_error: String,
        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the properties the sampler reads from a video.
    #[command(about = "Print video properties", visible_alias = "info")]
    Probe {
        /// Input video path.
        input: String,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_pixel_format(value: &str) -> Option<PixelFormat> {
    match value.to_ascii_lowercase().as_str() {
        "rgb8" | "rgb" => Some(PixelFormat::Rgb8),
        "gray8" | "gray" | "greyscale" | "grayscale" => Some(PixelFormat::Gray8),
        _ => None,
    }
}

fn parse_write_failure_policy(value: &str) -> Option<WriteFailurePolicy> {
    match value.to_ascii_lowercase().as_str() {
        "skip" | "continue" => Some(WriteFailurePolicy::Skip),
        "abort" | "stop" => Some(WriteFailurePolicy::Abort),
        _ => None,
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "frame_sampler=debug"
    } else {
        "frame_sampler=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

struct TerminalProgress {
    bar: ProgressBar,
    style: ProgressStyle,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("##-");
        Ok(Self {
            bar: ProgressBar::new_spinner(),
            style,
        })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        // The bar stays a spinner until a report carries the frame count.
        if let (None, Some(total)) = (self.bar.length(), info.total_frames) {
            self.bar.set_length(total);
            self.bar.set_style(self.style.clone());
        }
        self.bar.set_position(info.observed);
        self.bar.set_message(format!("{} saved", info.saved));
    }
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let payload = json!({
            "observed": summary.observed,
            "saved": summary.saved,
            "failed": summary.failed,
            "stride": summary.stride,
            "output_dir": summary.output_dir.display().to_string(),
            "elapsed_seconds": summary.elapsed.as_secs_f64(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", "--- Extraction Complete ---".bold());
    println!("Total frames processed: {}", summary.observed);
    println!("Total images saved : {}", summary.saved);
    if summary.failed > 0 {
        println!("{}", format!("Failed writes : {}", summary.failed).yellow());
    }
    println!(
        "{} {}",
        "success:".green().bold(),
        format!("frames written to {}", summary.output_dir.display()).green()
    );
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Some(level) = &cli.global.log_level {
        let parsed = FfmpegLogLevel::parse(level)
            .ok_or(format!("unsupported --log-level: {level}"))?;
        frame_sampler::set_ffmpeg_log_level(parsed);
    }

    match cli.command {
        Commands::Sample {
            input,
            out,
            every,
            ext,
            quality,
            pixel_format,
            on_write_error,
            json,
        } => {
            let stride = match every {
                Some(k) => Stride::fixed(k)?,
                None => Stride::PerSecond,
            };
            let pixel = parse_pixel_format(&pixel_format)
                .ok_or(format!("unsupported --pixel-format: {pixel_format}"))?;
            let policy = parse_write_failure_policy(&on_write_error)
                .ok_or(format!("unsupported --on-write-error: {on_write_error}"))?;

            let mut config = SamplerConfig::new(&input, &out)
                .with_stride(stride)
                .with_output_format(OutputFormat::from_extension(&ext)?)
                .with_pixel_format(pixel)
                .with_write_failure_policy(policy);

            if let Some(quality) = quality {
                if !matches!(config.output_format(), OutputFormat::Jpeg { .. }) {
                    return Err("--quality only applies to jpg output".into());
                }
                config = config.with_jpeg_quality(quality)?;
            }

            let progress = if cli.global.progress {
                let progress = Arc::new(TerminalProgress::new()?);
                config = config.with_progress(progress.clone()).with_batch_size(1);
                Some(progress)
            } else {
                None
            };

            let result = FrameSampler::new(config).run();
            if let Some(progress) = progress {
                progress.bar.finish_with_message("done");
            }
            print_summary(&result?, json)?;
        }
        Commands::Probe { input, json } => {
            let source = VideoSource::open(&input)?;
            let metadata = source.metadata();
            let stride = Stride::PerSecond.resolve(metadata.frames_per_second);

            if json {
                let payload = json!({
                    "format": metadata.format,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                    "codec": metadata.codec,
                    "per_second_stride": stride,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!("Duration: {:?}", metadata.duration);
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
                );
                println!("Frames: {}", metadata.frame_count);
                println!("One frame per second: every {stride} frames");
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "frame-sampler", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
