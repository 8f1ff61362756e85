// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! gridphase CLI entrypoint.
//!
//! # Usage
//! ```text
//! gridphase sweep --sizes 10,50,100,500,1000 [--iterations N] [--cell-size S] [--seed X] [--json]
//! gridphase simulate --objects N --frames F [--fps R] [--config DIR] [--save-config] [--json]
//! gridphase detect --objects N [--naive] [--cell-size S] [--seed X] [--json]
//! ```
//!
//! Logs go to stderr (filter with `RUST_LOG`); results go to stdout.

// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use gridphase_bench::{Harness, HarnessConfig, SweepEntry};
use gridphase_geom::generate::random_aabbs;
use gridphase_geom::{BroadPhase, NaiveDetector, SpatialHashConfig, SpatialHashDetector};
use gridphase_sim::{
    ConfigService, FsConfigStore, LoopDriver, PerformanceStats, SimConfig, TickReport,
    TokioFrameHost, SIM_CONFIG_KEY,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "gridphase: broad-phase collision benchmarks and simulation")]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Measure naive vs spatial-hash detection across object counts
    Sweep {
        /// Comma-separated object counts, measured in order
        #[arg(long, value_delimiter = ',', default_value = "10,50,100,500,1000")]
        sizes: Vec<usize>,
        /// Measured runs per detector and size
        #[arg(long, default_value_t = 3)]
        iterations: u32,
        /// Spatial-hash cell edge length
        #[arg(long, default_value_t = 32.0)]
        cell_size: f64,
        /// Base seed for generated test sets
        #[arg(long)]
        seed: Option<u64>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run a headless simulation for a fixed number of frames
    Simulate {
        /// Object count (overrides the config file)
        #[arg(long)]
        objects: Option<usize>,
        /// Frames to run
        #[arg(long, default_value_t = 120)]
        frames: u64,
        /// Target frame rate of the host timer
        #[arg(long, default_value_t = 240)]
        fps: u32,
        /// Directory holding `sim.json`
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the effective config back to `--config`
        #[arg(long, requires = "config")]
        save_config: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Detect collisions once on a generated set
    Detect {
        /// Object count
        #[arg(long)]
        objects: usize,
        /// Use the all-pairs detector
        #[arg(long)]
        naive: bool,
        /// Spatial-hash cell edge length
        #[arg(long, default_value_t = 32.0)]
        cell_size: f64,
        /// Seed for the generated set
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    match args.command {
        Cmd::Sweep {
            sizes,
            iterations,
            cell_size,
            seed,
            json,
        } => sweep(sizes, iterations, cell_size, seed, json).await,
        Cmd::Simulate {
            objects,
            frames,
            fps,
            config,
            save_config,
            json,
        } => simulate(objects, frames, fps, config, save_config, json).await,
        Cmd::Detect {
            objects,
            naive,
            cell_size,
            seed,
            json,
        } => detect(objects, naive, cell_size, seed, json),
    }
}

async fn sweep(
    sizes: Vec<usize>,
    iterations: u32,
    cell_size: f64,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let defaults = HarnessConfig::default();
    let config = HarnessConfig {
        iterations,
        seed: seed.unwrap_or(defaults.seed),
        spatial_hash: SpatialHashConfig::with_cell_size(cell_size)?,
        ..defaults
    };
    let harness = Harness::new(config).context("invalid sweep configuration")?;
    let entries = harness
        .run_sweep(&sizes, |entry| {
            if !json {
                eprintln!("finished {} objects", entry.object_count());
            }
        })
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "objects",
        "naive (ms)",
        "spatial (ms)",
        "speedup",
        "collisions",
    ]);
    for entry in &entries {
        match entry {
            SweepEntry::Measured(r) => table.add_row(vec![
                r.object_count.to_string(),
                format!("{:.3}", r.naive_time_ms),
                format!("{:.3}", r.spatial_time_ms),
                format!("{:.2}x", r.speedup),
                r.collision_count.to_string(),
            ]),
            SweepEntry::Failed {
                object_count,
                reason,
            } => table.add_row(vec![
                object_count.to_string(),
                "-".into(),
                "-".into(),
                "failed".into(),
                reason.clone(),
            ]),
        };
    }
    println!("{table}");
    Ok(())
}

#[derive(Serialize)]
struct SimulateSummary {
    ticks: u64,
    objects: usize,
    wall_time_ms: f64,
    stats: PerformanceStats,
}

async fn simulate(
    objects: Option<usize>,
    frames: u64,
    fps: u32,
    config_dir: Option<PathBuf>,
    save_config: bool,
    json: bool,
) -> Result<()> {
    let service = config_dir
        .as_ref()
        .map(|dir| {
            FsConfigStore::new(dir)
                .map(ConfigService::new)
                .with_context(|| format!("opening config dir {}", dir.display()))
        })
        .transpose()?;

    let mut config = match &service {
        Some(svc) => svc.load_sim().context("loading simulation config")?,
        None => SimConfig::default(),
    };
    if let Some(n) = objects {
        config.object_count = n;
    }
    if let Some(svc) = service.as_ref().filter(|_| save_config) {
        svc.save(SIM_CONFIG_KEY, &config)
            .context("saving simulation config")?;
        info!("saved effective config");
    }

    let mut driver = LoopDriver::from_config(config).context("building simulation")?;
    driver.set_observer(|report: &TickReport<'_>| {
        debug!(
            tick = report.tick,
            collisions = report.stats.actual_collisions,
            energy = report.stats.total_energy,
            "tick"
        );
    });

    let started = Instant::now();
    let stats = TokioFrameHost::with_fps(fps)
        .run(&mut driver, frames)
        .await
        .context("simulation tick failed")?;
    let summary = SimulateSummary {
        ticks: driver.ticks(),
        objects: driver.objects().len(),
        wall_time_ms: started.elapsed().as_secs_f64() * 1_000.0,
        stats,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["metric", "value"]);
    table.add_row(vec!["ticks".to_string(), summary.ticks.to_string()]);
    table.add_row(vec!["objects".to_string(), summary.objects.to_string()]);
    table.add_row(vec!["wall time (ms)".to_string(), format!("{:.1}", summary.wall_time_ms)]);
    table.add_row(vec!["fps".to_string(), format!("{:.1}", stats.fps)]);
    table.add_row(vec!["collisions".to_string(), stats.actual_collisions.to_string()]);
    table.add_row(vec!["checks".to_string(), stats.collision_checks_attempted.to_string()]);
    table.add_row(vec!["last frame (ms)".to_string(), format!("{:.3}", stats.last_frame_time_ms)]);
    table.add_row(vec!["total energy".to_string(), format!("{:.3}", stats.total_energy)]);
    println!("{table}");
    Ok(())
}

#[derive(Serialize)]
struct DetectSummary {
    detector: &'static str,
    objects: usize,
    collisions: usize,
    checks: u64,
    elapsed_ms: f64,
}

fn detect(objects: usize, naive: bool, cell_size: f64, seed: u64, json: bool) -> Result<()> {
    let shape = HarnessConfig::default().shape;
    let aabbs = random_aabbs(objects, seed, &shape)?;
    let detector: Box<dyn BroadPhase> = if naive {
        Box::new(NaiveDetector)
    } else {
        Box::new(SpatialHashDetector::new(SpatialHashConfig::with_cell_size(cell_size)?)?)
    };

    let started = Instant::now();
    let detection = detector.detect(&aabbs)?;
    let summary = DetectSummary {
        detector: detector.name(),
        objects,
        collisions: detection.pairs.len(),
        checks: detection.checks,
        elapsed_ms: started.elapsed().as_secs_f64() * 1_000.0,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["detector", "objects", "collisions", "checks", "elapsed (ms)"]);
    table.add_row(vec![
        summary.detector.to_string(),
        summary.objects.to_string(),
        summary.collisions.to_string(),
        summary.checks.to_string(),
        format!("{:.3}", summary.elapsed_ms),
    ]);
    println!("{table}");
    Ok(())
}
