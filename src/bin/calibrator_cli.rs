use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use touch_calibrator::calibration::{
    CalibrationState, ClickPoint, DeviceRange, Geometry, TargetLayout, Thresholds,
};
use touch_calibrator::config::AppConfig;
use touch_calibrator::output::{self, OutputFormat};
use touch_calibrator::session::{AbortReason, CalibrationSession, ClickOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "calibrator_cli",
    about = "Replay touchscreen calibration sessions without a display server"
)]
struct Cli {
    /// Print debug messages during the process
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive a calibration session from a scripted event list
    Replay(ReplayArgs),
    /// Print the four target centers for a display size
    Targets {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// JSON script with the display geometry and the events to deliver
    #[arg(long)]
    script: PathBuf,
    /// JSON configuration file (defaults apply when absent)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Misclick threshold in pixels (0 = off)
    #[arg(long)]
    misclick: Option<u32>,
    /// Double-click threshold in pixels (0 = off)
    #[arg(long)]
    doubleclick: Option<u32>,
    /// Time without clicks before giving up
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Product name written into the xorg.conf.d snippet
    #[arg(long)]
    device_name: Option<String>,
    /// Current raw device range; results are projected onto it
    #[arg(long, num_args = 4, value_names = ["MINX", "MAXX", "MINY", "MAXY"], allow_negative_numbers = true)]
    precalib: Option<Vec<f64>>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Xorg)]
    output_type: OutputFormat,
}

/// Scripted calibration session
#[derive(Deserialize, Debug)]
struct Script {
    geometry: Geometry,
    /// Accept clicks only from this device, when set
    #[serde(default)]
    device: Option<u32>,
    events: Vec<ScriptEvent>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
enum ScriptEvent {
    Click {
        x: i32,
        y: i32,
        #[serde(default)]
        device: Option<u32>,
    },
    Tick {
        ms: u64,
    },
    Resize {
        width: u32,
        height: u32,
    },
    FocusLost,
    Abort,
}

#[derive(Serialize)]
struct TargetsPayload {
    width: u32,
    height: u32,
    targets: Vec<TargetEntry>,
}

#[derive(Serialize)]
struct TargetEntry {
    target: CalibrationState,
    x: i32,
    y: i32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Replay(args) => run_replay(args),
        Commands::Targets { width, height } => run_targets(width, height),
    }
}

fn run_replay(args: ReplayArgs) -> Result<ExitCode> {
    let config = args
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default()
        .calibration;

    let thresholds = Thresholds::new(
        args.doubleclick.unwrap_or(config.threshold_doubleclick),
        args.misclick.unwrap_or(config.threshold_misclick),
    );
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.timeout());

    let precalib = args
        .precalib
        .as_deref()
        .map(|v| DeviceRange::new(v[0], v[1], v[2], v[3]))
        .transpose()
        .context("invalid --precalib range")?;

    let raw = fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&raw)
        .with_context(|| format!("parsing script {}", args.script.display()))?;
    let geometry = Geometry::new(script.geometry.width, script.geometry.height)?;

    let mut session = CalibrationSession::new()
        .with_timeout(timeout)
        .with_misclick_hook(|| eprintln!("Mis-click detected, restarting..."));
    if let Some(device) = script.device {
        session = session.with_device(device);
    }
    session.start(geometry, thresholds, |_| {})?;

    for event in script.events {
        if session.state().is_terminal() {
            break;
        }
        apply_event(&mut session, event)?;
    }
    session.abort_with(AbortReason::Incomplete);

    match session.outcome().copied() {
        Some(Ok(axis)) => {
            let axis = match precalib {
                Some(range) => axis.to_device_range(&range)?,
                None => axis,
            };
            let text = output::render(&axis, args.output_type, args.device_name.as_deref())
                .context("rendering calibration")?;
            println!("{}", text.trim_end());
            Ok(ExitCode::from(0))
        }
        Some(Err(reason)) => {
            eprintln!("aborted: {}", reason);
            Ok(ExitCode::from(2))
        }
        None => {
            eprintln!("aborted: {}", AbortReason::Incomplete);
            Ok(ExitCode::from(2))
        }
    }
}

fn apply_event(session: &mut CalibrationSession, event: ScriptEvent) -> Result<()> {
    match event {
        ScriptEvent::Click { x, y, device } => {
            let outcome = match device {
                Some(device) => session.submit_device_click(device, x, y),
                None => session.submit_click(x, y),
            };
            if let ClickOutcome::Accepted { next_target, position } = outcome {
                tracing::debug!(
                    "next target {} at ({}, {})",
                    next_target.display_name(),
                    position.x,
                    position.y
                );
            }
        }
        ScriptEvent::Tick { ms } => {
            session.tick(Duration::from_millis(ms));
        }
        ScriptEvent::Resize { width, height } => {
            let geometry = Geometry::new(width, height)?;
            if let Some(ClickPoint { x, y }) = session.update_geometry(geometry) {
                tracing::debug!("display resized to {}x{}, target at ({}, {})", width, height, x, y);
            }
        }
        ScriptEvent::FocusLost => session.focus_lost(),
        ScriptEvent::Abort => session.abort(),
    }
    Ok(())
}

fn run_targets(width: u32, height: u32) -> Result<ExitCode> {
    let geometry = Geometry::new(width, height)?;
    let layout = TargetLayout::from_geometry(geometry);
    let targets = layout
        .points()
        .iter()
        .enumerate()
        .map(|(idx, point)| TargetEntry {
            target: CalibrationState::from_index(idx),
            x: point.x,
            y: point.y,
        })
        .collect();

    let payload = TargetsPayload {
        width,
        height,
        targets,
    };
    println!("{}", serde_json::to_string(&payload)?);
    Ok(ExitCode::from(0))
}
