//! facelet-bench: CLI tool for running sticker detection on a photo.
//!
//! Runs the detection pipeline on a given image file with configurable
//! parameters and prints the crop plan, per-stage counts, the selected
//! candidates and the resulting 3×3 label grid. Useful for:
//!
//! - Tuning Canny thresholds and blur sigma against real photos
//! - Comparing the permissive and greedy label resolution policies
//! - Measuring how long one detection takes
//!
//! Set `RUST_LOG=facelet_pipeline=debug` (or `trace`) to see why
//! individual boundaries were rejected.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin facelet-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use facelet_pipeline::{
    AssignmentPolicyKind, CropPlan, Detection, DetectionSummary, LabelAssignment, PipelineConfig,
    label::GRID_POSITIONS,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Locate and label the nine stickers on a photo of one cube face.
///
/// Runs the detection pipeline on a given image and prints what each
/// stage found, plus timing.
#[derive(Parser)]
#[command(name = "facelet-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Gaussian blur sigma (0 disables blurring).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Canny low threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Label resolution policy.
    #[arg(long, value_enum, default_value_t = Policy::Permissive)]
    policy: Policy,

    /// Write the square crop to this file (format from extension).
    #[arg(long)]
    save_crop: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output the report as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// Missing fields take their default values.
    #[arg(long)]
    config_json: Option<String>,
}

/// Label resolution policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// Keep every raw label, duplicates included.
    Permissive,
    /// One-to-one matching by nearest centroid.
    GreedyNearest,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        blur_sigma: cli.blur_sigma,
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
        assignment: match cli.policy {
            Policy::Permissive => AssignmentPolicyKind::Permissive,
            Policy::GreedyNearest => AssignmentPolicyKind::GreedyNearest,
        },
        ..PipelineConfig::default()
    })
}

/// One selected candidate as shown in the report.
#[derive(Serialize)]
struct CandidateReport {
    index: usize,
    source_index: usize,
    area: f64,
    points: usize,
    centroid: Option<(f64, f64)>,
}

/// Machine-readable result of one run.
#[derive(Serialize)]
struct RunReport {
    duration_ms: f64,
    plan: CropPlan,
    summary: DetectionSummary,
    candidates: Vec<CandidateReport>,
    labels: LabelAssignment,
    resolved: LabelAssignment,
    complete: bool,
    missing_positions: Vec<usize>,
    ambiguous_positions: Vec<usize>,
}

impl RunReport {
    fn new(detection: &Detection, duration: Duration) -> Self {
        let candidates = detection
            .candidates
            .iter()
            .enumerate()
            .map(|(index, c)| CandidateReport {
                index,
                source_index: c.source_index(),
                area: c.area(),
                points: c.polygon().len(),
                centroid: c.polygon().centroid(),
            })
            .collect();

        Self {
            duration_ms: duration.as_secs_f64() * 1000.0,
            plan: detection.plan,
            summary: detection.summary,
            candidates,
            labels: detection.labels.clone(),
            resolved: detection.resolved.clone(),
            complete: detection.resolved.is_complete(),
            missing_positions: detection.resolved.missing_positions(),
            ambiguous_positions: detection.resolved.ambiguous_positions(),
        }
    }

    /// Human-readable multi-line report.
    fn text(&self) -> String {
        let mut out = String::new();
        let p = &self.plan;
        let s = &self.summary;

        let _ = writeln!(out, "Detection ({:.3}ms)\n{}", self.duration_ms, "=".repeat(60));
        let _ = writeln!(
            out,
            "Crop: top={} side={} outer={} inner={}",
            p.border_top, p.border_side, p.outer_scale, p.inner_scale,
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<24} {:>8}", "Stage", "Count");
        let _ = writeln!(out, "{}", "-".repeat(34));
        for (name, count) in [
            ("Contours", s.contours_found),
            ("Accepted", s.candidates_accepted),
            ("Selected", s.candidates_selected),
            ("Raw labels", s.raw_labels),
            ("Resolved labels", s.resolved_labels),
        ] {
            let _ = writeln!(out, "{name:<24} {count:>8}");
        }

        if !self.candidates.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{:>3} {:>6} {:>10} {:>7} {:>18}",
                "#", "source", "area", "points", "centroid"
            );
            for c in &self.candidates {
                let centroid = c
                    .centroid
                    .map_or_else(|| "-".to_owned(), |(x, y)| format!("({x:.1}, {y:.1})"));
                let _ = writeln!(
                    out,
                    "{:>3} {:>6} {:>10.1} {:>7} {:>18}",
                    c.index, c.source_index, c.area, c.points, centroid,
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Grid ('.' missing, '*' ambiguous):");
        out.push_str(&grid_text(&self.resolved));
        let _ = writeln!(
            out,
            "Complete: {}",
            if self.complete { "yes" } else { "no" }
        );
        out
    }
}

/// Render the 3×3 grid with each cell showing its candidate index.
fn grid_text(labels: &LabelAssignment) -> String {
    let ambiguous = labels.ambiguous_positions();
    let cells: Vec<String> = labels
        .by_position()
        .iter()
        .enumerate()
        .map(|(g, slot)| match slot {
            Some(k) => k.to_string(),
            None if ambiguous.contains(&g) => "*".to_owned(),
            None => ".".to_owned(),
        })
        .collect();

    let mut out = String::new();
    for row in cells.chunks(GRID_POSITIONS / 3) {
        let _ = writeln!(out, "  [{:>2}] [{:>2}] [{:>2}]", row[0], row[1], row[2]);
    }
    out
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        image = %cli.image_path.display(),
        bytes = image_bytes.len(),
        runs = cli.runs,
        ?config,
        "starting detection"
    );

    let mut durations = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let start = Instant::now();
        let detection = match facelet_pipeline::process_bytes(&image_bytes, &config) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        };
        let elapsed = start.elapsed();

        let report = RunReport::new(&detection, elapsed);
        if cli.json {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing report: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", report.text());
        }

        // Write the crop on the first run only.
        if run == 0
            && let Some(ref crop_path) = cli.save_crop
        {
            match detection.cropped.save(crop_path) {
                Ok(()) => eprintln!(
                    "Crop written to {} ({}x{})",
                    crop_path.display(),
                    detection.cropped.width(),
                    detection.cropped.height(),
                ),
                Err(e) => eprintln!("Error writing crop to {}: {e}", crop_path.display()),
            }
        }

        durations.push(elapsed);
    }

    if cli.runs > 1 {
        print_multi_run_summary(&durations);
    }

    ExitCode::SUCCESS
}

/// Print aggregated timing across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(durations: &[Duration]) {
    println!();
    println!("Summary ({} runs)\n{}", durations.len(), "=".repeat(60));

    if durations.is_empty() {
        println!("Warning: no runs to summarize");
        return;
    }

    let ms: Vec<f64> = durations
        .iter()
        .map(|d| d.as_secs_f64() * 1000.0)
        .collect();

    let min = ms.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = ms.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = ms.iter().sum::<f64>() / ms.len() as f64;

    println!("Duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");
}
