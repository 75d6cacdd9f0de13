// src/frame_source.rs
//
// Session files on disk: discovery, loading, and report output.

use crate::pipeline::{MetricsSummary, PipelineOutput};
use crate::types::{FrameStream, SessionSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const STREAM_EXTENSIONS: [&str; 2] = ["json", "JSON"];
const REPORT_SUFFIX: &str = "_summary.json";

/// Everything written for one processed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub fps: f64,
    pub metrics: MetricsSummary,
    pub summary: SessionSummary,
}

impl SessionReport {
    pub fn new(source: &Path, fps: f64, output: PipelineOutput) -> Self {
        Self {
            source: source.display().to_string(),
            generated_at: Utc::now(),
            fps,
            metrics: output.metrics,
            summary: output.summary,
        }
    }
}

/// Frame stream files under `root` (or `root` itself if it is a file),
/// sorted by path. Previously written reports are skipped.
pub fn find_stream_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        anyhow::bail!("Input path does not exist: {}", root.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| STREAM_EXTENSIONS.contains(&ext))
        })
        .filter(|p| {
            !p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.ends_with(REPORT_SUFFIX))
        })
        .collect();
    files.sort();

    info!("Found {} frame stream file(s)", files.len());
    Ok(files)
}

pub fn load_stream(path: impl AsRef<Path>) -> Result<FrameStream> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read frame stream {}", path.display()))?;
    let stream: FrameStream = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse frame stream {}", path.display()))?;
    info!(
        "Loaded {} frames @ {:.1} FPS from {}",
        stream.frames.len(),
        stream.fps,
        path.display()
    );
    Ok(stream)
}

/// Output path for the report of `source` inside `output_dir`. The
/// subdirectory of `source` below `input_root` is mirrored so sessions with
/// the same file name in different folders get distinct reports.
pub fn report_path(output_dir: impl AsRef<Path>, input_root: &Path, source: &Path) -> PathBuf {
    let subdir = source
        .strip_prefix(input_root)
        .ok()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session");
    output_dir
        .as_ref()
        .join(subdir)
        .join(format!("{}{}", stem, REPORT_SUFFIX))
}

pub fn write_report(
    output_dir: impl AsRef<Path>,
    input_root: &Path,
    report: &SessionReport,
) -> Result<PathBuf> {
    let path = report_path(output_dir, input_root, Path::new(&report.source));
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Report written: {}", path.display());
    Ok(path)
}
