//! Hand Surface - sensor calibration and heatmap from recorded hand frames
//!
//! Reads sensor events as JSON lines (one `frame` or `zone` object per line)
//! from a file or stdin.
//! Run with: cargo run --bin hand-surface -- --calibrate --replay session.jsonl

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::EnvFilter;

use hand_surface::heatmap::{save_heatmap_png, MAX_IMAGE_SIDE};
use hand_surface::{
    replay_lines, AppSettings, CalibrationEvent, ReferenceZone, SessionRunner, SessionUpdate,
    SurfaceSession,
};

/// Pixel size of one heatmap cell in the exported image.
const DEFAULT_CELL_SIZE: u32 = 32;

/// Parsed command line options.
#[derive(Debug, Default)]
struct CliArgs {
    calibrate: bool,
    replay: Option<PathBuf>,
    heatmap_out: Option<PathBuf>,
    reference: Option<ReferenceZone>,
    cell_size: Option<u32>,
}

impl CliArgs {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut parsed = CliArgs::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--calibrate" => parsed.calibrate = true,
                "--replay" => parsed.replay = Some(next_value(&mut iter, arg)?.into()),
                "--heatmap-out" => parsed.heatmap_out = Some(next_value(&mut iter, arg)?.into()),
                "--reference" => {
                    let value = next_value(&mut iter, arg)?;
                    parsed.reference = Some(value.parse().map_err(anyhow::Error::msg)?);
                }
                "--cell-size" => {
                    let value = next_value(&mut iter, arg)?;
                    let size: u32 = value
                        .parse()
                        .with_context(|| format!("Invalid cell size: {}", value))?;
                    if !(1..=MAX_IMAGE_SIDE).contains(&size) {
                        anyhow::bail!("Cell size must be in 1..={}: {}", MAX_IMAGE_SIDE, size);
                    }
                    parsed.cell_size = Some(size);
                }
                other => anyhow::bail!("Unknown argument: {}", other),
            }
        }

        Ok(parsed)
    }
}

fn next_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> anyhow::Result<&'a String> {
    iter.next()
        .with_context(|| format!("Missing value for {}", flag))
}

fn load_settings() -> anyhow::Result<AppSettings> {
    let settings = match env::var("HAND_SURFACE_CONFIG") {
        Ok(path) => AppSettings::load_or_init(Path::new(&path))
            .with_context(|| format!("Failed to load settings from {}", path))?,
        Err(_) => AppSettings::load().context("Failed to load settings")?,
    };
    settings.validate()?;
    Ok(settings)
}

fn print_update(update: &SessionUpdate, session: &SurfaceSession) {
    match update {
        SessionUpdate::Progress(progress) => {
            if !progress.registering {
                println!("👉 [{}] {}", progress.role, progress.prompt());
            }
        }
        SessionUpdate::Calibration(CalibrationEvent::CornerCaptured { role, point, .. }) => {
            println!("📍 Registered {} corner at ({:.1}, {:.1})", role, point.x, point.y);
        }
        SessionUpdate::Calibration(CalibrationEvent::Jitter { step }) => {
            println!("   Hand moved, hold again for location #{}", step + 1);
        }
        SessionUpdate::Calibration(CalibrationEvent::Aborted { .. }) => {
            println!("   ⚠️ More than one hand detected");
        }
        SessionUpdate::Calibration(CalibrationEvent::Completed(rect)) => {
            println!("\n✅ Calibration complete!");
            println!("   Active rectangle: {}", rect);
        }
        SessionUpdate::Zone(rect) => {
            tracing::info!(
                "Sensor zone: x {}..{}, y {}..{}",
                rect.x,
                rect.x + rect.w,
                rect.y,
                rect.y + rect.h
            );
        }
        SessionUpdate::Heatmap { history_len } => {
            tracing::debug!(
                "Heatmap history: {} samples, {} filled cells",
                history_len,
                session.heatmap().filled_cells()
            );
        }
    }
}

async fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = CliArgs::parse(&args)?;
    let settings = load_settings()?;

    println!("🖐  Hand Surface");
    println!("================================================");
    println!(
        "Sensor: {}:{}",
        settings.sensor.host, settings.sensor.port
    );
    println!(
        "Hold: {:.2}s, max move: {:.1}, padding: {:.0}%",
        settings.calibration.hold_duration,
        settings.calibration.max_move_dist,
        settings.calibration.pad_perc * 100.0
    );
    println!(
        "Heatmap: {}x{} cells, history {}",
        settings.view.heatmap.rows, settings.view.heatmap.cols, settings.view.heatmap.max_history
    );
    println!("================================================\n");

    let session = SurfaceSession::new(settings)?;
    let (handle, task) = SessionRunner::new(session)
        .with_update_callback(print_update)
        .run();

    if cli.calibrate {
        handle.restart_calibration().await?;
    }
    if let Some(reference) = cli.reference {
        handle.set_reference(reference).await?;
    }

    let input = open_input(cli.replay.as_deref()).await?;
    let forwarded = replay_lines(input, handle.event_sender()).await?;
    tracing::info!("Replayed {} sensor events", forwarded);

    // Closing the last sender lets the loop drain and return the session.
    drop(handle);
    let session = task.await?;

    if session.is_calibrating() {
        if let Some(progress) = session.progress() {
            println!(
                "\n⚠️ Calibration incomplete: stopped at location #{} ({})",
                progress.step + 1,
                progress.role
            );
        }
    }
    if let Some(rect) = session.active_rect() {
        println!("\nActive rectangle:");
        println!("  min_x={:.1} min_y={:.1}", rect.min_x, rect.min_y);
        println!("  max_x={:.1} max_y={:.1}", rect.max_x, rect.max_y);
    }

    println!(
        "\nHeatmap: {} samples in history, {} of {} cells filled",
        session.history_len(),
        session.heatmap().filled_cells(),
        session.heatmap().rows() * session.heatmap().cols()
    );

    let out = cli.heatmap_out.unwrap_or_else(|| {
        PathBuf::from(format!("heatmap_{}.png", Local::now().format("%Y%m%d_%H%M%S")))
    });
    let cell_size = cli.cell_size.unwrap_or(DEFAULT_CELL_SIZE);
    save_heatmap_png(session.heatmap(), cell_size, &out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!("🗺  Heatmap written to {}", out.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let cli = CliArgs::parse(&args(&[
            "--calibrate",
            "--replay",
            "frames.jsonl",
            "--reference",
            "sensor",
            "--cell-size",
            "8",
        ]))
        .unwrap();
        assert!(cli.calibrate);
        assert_eq!(cli.replay, Some(PathBuf::from("frames.jsonl")));
        assert_eq!(cli.reference, Some(ReferenceZone::Sensor));
        assert_eq!(cli.cell_size, Some(8));
        assert_eq!(cli.heatmap_out, None);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(CliArgs::parse(&args(&["--replay"])).is_err());
        assert!(CliArgs::parse(&args(&["--reference", "screen"])).is_err());
        assert!(CliArgs::parse(&args(&["--verbose"])).is_err());
        assert!(CliArgs::parse(&args(&["--cell-size", "0"])).is_err());
        assert!(CliArgs::parse(&args(&["--cell-size", "400000000"])).is_err());
    }
}
