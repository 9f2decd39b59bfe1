// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod metrics;
pub mod signal;
pub mod types;

use std::time::Duration;

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::GraphFile;
use crate::config::loader::load_and_validate;
use crate::engine::Scheduler;
use crate::exec::CommandWorkload;
use crate::metrics::GraphMetrics;
use crate::types::{ExecutionMode, ScheduleMode};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - graph file loading and validation
/// - CLI overrides of the `[scheduler]` section
/// - the scheduler with a command/sleep workload
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let graph_path = args.graph.clone();
    let mut file = load_and_validate(&graph_path)?;
    apply_overrides(&mut file, &args)?;

    let metrics = GraphMetrics::compute(&file.graph)?;

    if args.dry_run {
        print_dry_run(&file, &metrics)?;
        return Ok(());
    }

    info!(
        graph = %graph_path.display(),
        nodes = file.graph.len(),
        mode = ?file.mode,
        total_work_ms = metrics.total_work.as_millis() as u64,
        critical_path_ms = metrics.critical_path_length.as_millis() as u64,
        "graph loaded"
    );

    tokio::select! {
        res = execute(&file) => res?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            warn!("Ctrl-C received; abandoning run");
            bail!("interrupted");
        }
    }

    print_metrics(&metrics);
    Ok(())
}

async fn execute(file: &GraphFile) -> Result<()> {
    let scheduler = Scheduler::new(
        CommandWorkload::new(file.commands.clone()),
        file.scheduler.clone(),
    );

    let modes: &[ExecutionMode] = match file.mode {
        ScheduleMode::Parallel => &[ExecutionMode::Parallel],
        ScheduleMode::Sequential => &[ExecutionMode::Sequential],
        ScheduleMode::Both => &[ExecutionMode::Parallel, ExecutionMode::Sequential],
    };

    let mut failed_runs = 0usize;
    for &mode in modes {
        let report = scheduler.run(&file.graph, mode).await?;
        println!("{report}");
        if !report.is_success() {
            failed_runs += 1;
        }
    }

    if failed_runs > 0 {
        bail!("{failed_runs} run(s) finished with failed or skipped nodes");
    }
    Ok(())
}

fn apply_overrides(file: &mut GraphFile, args: &CliArgs) -> Result<()> {
    if let Some(mode) = args.mode {
        file.mode = mode;
    }

    if let Some(pool_size) = args.pool_size {
        if pool_size == 0 {
            bail!("--pool-size must be >= 1 (got 0)");
        }
        file.scheduler.pool_size = Some(pool_size);
    }

    if let Some(ms) = args.node_timeout_ms {
        if ms == 0 {
            bail!("--node-timeout-ms must be >= 1 (got 0)");
        }
        file.scheduler.node_timeout = Some(Duration::from_millis(ms));
    }

    debug!(mode = ?file.mode, scheduler = ?file.scheduler, "effective scheduler settings");
    Ok(())
}

fn print_metrics(metrics: &GraphMetrics) {
    println!("metrics:");
    println!("  total work           = {} ms", metrics.total_work.as_millis());
    println!(
        "  critical path length = {} ms ({})",
        metrics.critical_path_length.as_millis(),
        metrics.critical_path.join(" -> ")
    );
    println!("  antichain width      = {}", metrics.antichain_width);
    println!("  parallelism          = {:.2}", metrics.parallelism);
}

/// Simple dry-run output: print nodes, order and metrics.
fn print_dry_run(file: &GraphFile, metrics: &GraphMetrics) -> Result<()> {
    let plan = engine::plan_pool(&file.graph, &file.scheduler)?;

    println!("flowdag dry-run");
    println!("  scheduler.mode = {:?}", file.mode);
    println!("  scheduler.launch_order = {:?}", file.scheduler.launch_order);
    println!("  scheduler.failure_policy = {:?}", file.scheduler.failure_policy);
    match plan.floor {
        Some(floor) => println!("  pool: {} slots (floor {floor})", plan.slots),
        None => println!("  pool: {} slots (one per node)", plan.slots),
    }
    println!();

    println!("nodes ({}):", file.graph.len());
    for node in file.graph.nodes() {
        println!("  - {} ({} ms)", node.id, node.workload.as_millis());
        if !node.prerequisites.is_empty() {
            println!("      after: {:?}", node.prerequisites);
        }
        if let Some(cmd) = file.commands.get(&node.id) {
            println!("      cmd: {cmd}");
        }
    }
    println!();

    println!(
        "topological order: {}",
        file.graph.topological_order()?.join(", ")
    );
    print_metrics(metrics);

    debug!("dry-run complete (no execution)");
    Ok(())
}
