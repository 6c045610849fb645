// Command-line front end: stamps a batch of files and reports progress.
// The library in lib.rs holds everything else.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use watermark_stamper_lib::commands::{StampOptions, opacity_from_percent, stamp_files};
use watermark_stamper_lib::core::config::{adaptive_opacity, default_opacity, default_resize_limit};
use watermark_stamper_lib::core::{ResizeLimit, ToolConfig};
use watermark_stamper_lib::RunStatus;

/// Stamp a text watermark onto a batch of images, PDFs and videos.
#[derive(Parser, Debug)]
#[command(name = "watermark-stamper", version)]
struct Args {
    /// Who the stamped copies are for
    #[arg(short, long)]
    recipient: String,

    /// Task or project name burned into the watermark
    #[arg(short, long)]
    task: String,

    /// JSON file describing the stamp and resize tools
    #[arg(long, value_name = "FILE")]
    tools: PathBuf,

    /// Overlay image; defaults to the one in the tool config
    #[arg(long, value_name = "FILE")]
    overlay: Option<PathBuf>,

    /// Folder the dated output folder is created in
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Fixed opacity in percent (5-50)
    #[arg(long, value_name = "PERCENT", conflicts_with = "adaptive")]
    opacity: Option<u32>,

    /// Let the stamp tool pick opacity per file
    #[arg(long)]
    adaptive: bool,

    /// Downscale media larger than this many pixels (4096 when no value is given)
    #[arg(long, value_name = "PX", num_args = 0..=1)]
    resize: Option<Option<u32>>,

    /// Print events as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    /// Files to stamp
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stderr) // stdout is reserved for --json
        .compact()
        .init();
}

fn resize_limit(requested: Option<Option<u32>>) -> anyhow::Result<Option<ResizeLimit>> {
    match requested {
        None => Ok(None),
        Some(None) => Ok(default_resize_limit()),
        Some(Some(px)) => match ResizeLimit::new(px) {
            Some(limit) => Ok(Some(limit)),
            None => bail!("--resize must be greater than 0"),
        },
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let tools = ToolConfig::load(&args.tools)?;

    let overlay = args
        .overlay
        .or_else(|| tools.overlay.clone())
        .context("No overlay image given and none configured in the tool config")?;

    let opacity = match (args.adaptive, args.opacity) {
        (true, _) => adaptive_opacity(),
        (false, Some(percent)) => opacity_from_percent(percent)?,
        (false, None) => default_opacity(),
    };

    let options = StampOptions {
        recipient: args.recipient,
        task: args.task,
        date: chrono::Local::now().date_naive(),
        inputs: args.files,
        output_root: args.output_dir,
        overlay,
        opacity,
        resize_limit: resize_limit(args.resize)?,
        json: args.json,
    };

    match stamp_files(&tools, options).await? {
        RunStatus::Completed(report) if report.all_succeeded() => Ok(ExitCode::SUCCESS),
        RunStatus::Completed(report) => {
            error!("{} of {} files failed", report.failed().count(), report.outcomes.len());
            Ok(ExitCode::FAILURE)
        }
        RunStatus::Cancelled => Ok(ExitCode::from(130)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    info!("=== Watermark stamper starting ===");
    run(args).await
}
