// src/main.rs

use anyhow::Result;
use clap::Parser;
use dribble_analytics::frame_source::{self, SessionReport};
use dribble_analytics::types::{Cycle, Hand};
use dribble_analytics::{Config, PipelineOrchestrator, SessionSummary};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Per-cycle dribble analytics for pose + ball tracking sessions.
#[derive(Parser, Debug)]
#[command(name = "dribble-analytics", version, about)]
struct Cli {
    /// Frame stream file or directory of them (defaults to io.input_dir)
    input: Option<PathBuf>,

    /// YAML configuration file; built-in defaults when absent
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Directory for <stem>_summary.json reports (defaults to io.output_dir)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log a per-cycle table for every session
    #[arg(long)]
    print: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!("dribble_analytics={}", config.logging.level))
            }),
        )
        .init();

    info!("🏀 Dribble Analytics Starting");
    info!(
        "Thresholds: max_velocity={:.1}px, min_cycle={} frames, prominence={:.2}, k={:.2}",
        config.cleaning.max_velocity,
        config.cycles.min_cycle_duration,
        config.cycles.prominence,
        config.contact.threshold_k
    );

    let input = cli
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.io.input_dir));
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.io.output_dir));

    let files = frame_source::find_stream_files(&input)?;
    if files.is_empty() {
        error!("No frame stream files found in {}", input.display());
        return Ok(());
    }

    let orchestrator = PipelineOrchestrator::new(config)?;

    let mut succeeded = 0;
    for (idx, path) in files.iter().enumerate() {
        info!("========================================");
        info!("Processing session {}/{}: {}", idx + 1, files.len(), path.display());
        info!("========================================");

        match process_session(path, &input, &orchestrator, &output_dir, cli.print) {
            Ok(()) => succeeded += 1,
            Err(e) => error!("Failed to process {}: {:#}", path.display(), e),
        }
    }

    if succeeded < files.len() {
        warn!("{} of {} session(s) failed", files.len() - succeeded, files.len());
    }
    info!("✓ {} session(s) processed", succeeded);
    Ok(())
}

fn process_session(
    path: &Path,
    input_root: &Path,
    orchestrator: &PipelineOrchestrator,
    output_dir: &Path,
    print_cycles: bool,
) -> Result<()> {
    let stream = frame_source::load_stream(path)?;
    let fps = stream.fps;
    let output = orchestrator.run_stream(stream)?;

    log_session_summary(&output.summary);
    if print_cycles {
        log_cycle_table(&output.summary.cycles);
    }
    info!(
        "  Outliers repaired: {}/{}, processing time {:.2}s",
        output.metrics.outliers_repaired, output.metrics.outliers_flagged, output.metrics.elapsed_secs
    );

    let report = SessionReport::new(path, fps, output);
    frame_source::write_report(output_dir, input_root, &report)?;
    Ok(())
}

fn log_session_summary(summary: &SessionSummary) {
    info!("📊 Session summary");
    info!(
        "  Valid frames: {}/{} ({:.1}%)",
        summary.valid_frames,
        summary.total_frames,
        100.0 * summary.valid_frames as f64 / summary.total_frames.max(1) as f64
    );
    info!("  Cycles: {}", summary.cycles.len());
    info!(
        "  Avg cycle duration: {:.1} ms (variance {:.1})",
        summary.duration_mean, summary.duration_variance
    );
    info!(
        "  Avg max height: {:.3} (variance {:.4})",
        summary.max_height_mean, summary.max_height_variance
    );
    info!(
        "  Controlled time ratio: {:.2} (variance {:.4})",
        summary.controlled_time_ratio_mean, summary.controlled_time_ratio_variance
    );
    info!(
        "  Control deviation: {:.3} (variance {:.4})",
        summary.control_deviation_mean, summary.control_deviation_variance
    );
    info!(
        "  Crossovers: {} between cycles, {} within cycles",
        summary.crossovers_count, summary.intra_cycle_crossovers
    );
    info!(
        "  Hand ratio L/R: {:.2}/{:.2} over {} cycle(s)",
        summary.left_hand_ratio, summary.right_hand_ratio, summary.hand_ratio_sample_size
    );
    info!(
        "  Shoulder width {:.3}, contact threshold {:.3}",
        summary.shoulder_width_session, summary.d_thr
    );
}

fn hand_label(hand: Option<Hand>) -> &'static str {
    hand.map_or("-", |h| h.as_str())
}

fn log_cycle_table(cycles: &[Cycle]) {
    info!("  id | frames | dur ms | max h  | ctrl | start | end | dom | cross");
    for c in cycles {
        info!(
            "  {:>2} | {:>6} | {:>6} | {:>6.3} | {:>4.2} | {:>5} | {:>3} | {:>3} | {:>5}",
            c.cycle_id,
            c.frame_count(),
            c.duration_ms,
            c.max_height,
            c.controlled_time_ratio,
            hand_label(c.start_hand),
            hand_label(c.end_hand),
            hand_label(c.dominant_hand),
            c.is_crossover.map_or("-", |x| if x { "yes" } else { "no" })
        );
    }
}
