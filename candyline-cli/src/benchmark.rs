//! Benchmark command - throughput of independent simulated sessions
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_parallel_benchmark(), run_sequential_benchmark(), report_results()
//! - Level 3: run_session(), summarize()
//! - Level 4: seeds, timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use candyline_core::GameConfig;
use candyline_session::{HeadlessPresenter, Session};

use crate::autoplay::{play_turns, PlayStats};
use crate::play::create_runtime;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Number of independent sessions
    #[arg(long, default_value = "32")]
    pub sessions: usize,

    /// Automated turns per session
    #[arg(long, default_value = "100")]
    pub turns: usize,

    /// Also run the sessions one after another and report the speedup
    #[arg(long)]
    pub compare: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results of a single benchmark run
#[derive(Clone, Debug)]
struct BenchmarkResult {
    name: String,
    sessions: usize,
    total_time: Duration,
    avg_time_per_session: Duration,
    turns_per_second: f64,
    stats: PlayStats,
}

/// All benchmark results
#[derive(Clone, Debug)]
struct AllResults {
    results: Vec<BenchmarkResult>,
    system_info: String,
    base_seed: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// This function reads like a table of contents:
/// 1. Pick a base seed so every session is reproducible
/// 2. Run all sessions in parallel
/// 3. Optionally run them sequentially for comparison
/// 4. Report all results
pub fn run(args: BenchmarkArgs, config: GameConfig) -> Result<()> {
    anyhow::ensure!(args.sessions > 0, "--sessions must be at least 1");

    let base_seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(
        "Starting benchmark: {} sessions x {} turns on {}x{} boards (base seed {})",
        args.sessions,
        args.turns,
        config.rows,
        config.cols,
        base_seed
    );

    let mut all_results = AllResults {
        results: Vec::new(),
        system_info: get_system_info(),
        base_seed,
    };

    run_parallel_benchmark(&args, &config, base_seed, &mut all_results)?;

    if args.compare {
        run_sequential_benchmark(&args, &config, base_seed, &mut all_results)?;
    }

    report_results(&all_results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Run every session on the rayon pool
fn run_parallel_benchmark(
    args: &BenchmarkArgs,
    config: &GameConfig,
    base_seed: u64,
    results: &mut AllResults,
) -> Result<()> {
    tracing::info!("Benchmarking {} sessions in parallel...", args.sessions);
    let progress = create_progress_bar(args.sessions, args.json);

    let start = Instant::now();
    let runs: Vec<PlayStats> = (0..args.sessions)
        .into_par_iter()
        .map(|i| {
            let stats = run_session(config, session_seed(base_seed, i), args.turns);
            progress.inc(1);
            stats
        })
        .collect::<Result<_>>()?;
    let total_time = start.elapsed();
    progress.finish_and_clear();

    results
        .results
        .push(summarize("Parallel (rayon)", &runs, total_time));
    Ok(())
}

/// Run the same sessions one after another
fn run_sequential_benchmark(
    args: &BenchmarkArgs,
    config: &GameConfig,
    base_seed: u64,
    results: &mut AllResults,
) -> Result<()> {
    tracing::info!("Benchmarking {} sessions sequentially...", args.sessions);
    let progress = create_progress_bar(args.sessions, args.json);

    let start = Instant::now();
    let mut runs = Vec::with_capacity(args.sessions);
    for i in 0..args.sessions {
        runs.push(run_session(config, session_seed(base_seed, i), args.turns)?);
        progress.inc(1);
    }
    let total_time = start.elapsed();
    progress.finish_and_clear();

    results.results.push(summarize("Sequential", &runs, total_time));
    Ok(())
}

/// Report all benchmark results
fn report_results(results: &AllResults, args: &BenchmarkArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one full session on its own single-threaded runtime
fn run_session(config: &GameConfig, seed: u64, turns: usize) -> Result<PlayStats> {
    let config = config.clone().with_seed(seed);
    let mut rng = config.rng();
    let mut session = Session::init(config, HeadlessPresenter::new().without_recording())
        .with_context(|| format!("Failed to start session with seed {}", seed))?;

    let runtime = create_runtime()?;
    let stats = runtime.block_on(play_turns(&mut session, turns, &mut rng));
    session.dispose();

    Ok(stats)
}

/// Fold per-session stats into one result row
fn summarize(name: &str, runs: &[PlayStats], total_time: Duration) -> BenchmarkResult {
    let mut stats = PlayStats::default();
    for run in runs {
        stats.merge(run);
    }

    let sessions = runs.len();
    let secs = total_time.as_secs_f64();
    BenchmarkResult {
        name: name.to_string(),
        sessions,
        total_time,
        avg_time_per_session: total_time / sessions.max(1) as u32,
        turns_per_second: if secs > 0.0 { stats.turns as f64 / secs } else { 0.0 },
        stats,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Seed of the `index`-th session
fn session_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add(index as u64)
}

fn create_progress_bar(len: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} sessions ({elapsed})") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Get system information string
fn get_system_info() -> String {
    format!(
        "candyline {}, {} CPUs",
        env!("CARGO_PKG_VERSION"),
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
    )
}

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 60 {
        format!("{}m {:.1}s", d.as_secs() / 60, (d.as_secs() % 60) as f64 + d.subsec_millis() as f64 / 1000.0)
    } else if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

/// Print results as JSON
fn print_json_results(results: &AllResults) {
    #[derive(serde::Serialize)]
    struct JsonBenchmark<'a> {
        name: &'a str,
        sessions: usize,
        total_time_ms: u64,
        avg_session_ms: f64,
        turns_per_second: f64,
        stats: &'a PlayStats,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        generated_at: String,
        system_info: &'a str,
        base_seed: u64,
        benchmarks: Vec<JsonBenchmark<'a>>,
    }

    let output = JsonOutput {
        generated_at: chrono::Local::now().to_rfc3339(),
        system_info: &results.system_info,
        base_seed: results.base_seed,
        benchmarks: results
            .results
            .iter()
            .map(|r| JsonBenchmark {
                name: &r.name,
                sessions: r.sessions,
                total_time_ms: r.total_time.as_millis() as u64,
                avg_session_ms: r.avg_time_per_session.as_secs_f64() * 1000.0,
                turns_per_second: r.turns_per_second,
                stats: &r.stats,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text table
fn print_text_results(results: &AllResults) {
    println!("\n=== Candyline Benchmark Results ===");
    println!("System: {}", results.system_info);
    println!("Base seed: {}\n", results.base_seed);

    println!(
        "{:<18} {:>8} {:>12} {:>12} {:>10} {:>10} {:>9}",
        "Benchmark", "Sessions", "Total Time", "Avg/Session", "Turns/s", "Avg Score", "Max Casc"
    );
    println!("{}", "-".repeat(86));

    for r in &results.results {
        println!(
            "{:<18} {:>8} {:>12} {:>12} {:>10.0} {:>10.1} {:>9}",
            r.name,
            r.sessions,
            format_duration(r.total_time),
            format_duration(r.avg_time_per_session),
            r.turns_per_second,
            r.stats.score as f64 / r.sessions.max(1) as f64,
            r.stats.longest_cascade
        );
    }

    let parallel = results.results.iter().find(|r| r.name.starts_with("Parallel"));
    let sequential = results.results.iter().find(|r| r.name == "Sequential");

    if let (Some(par), Some(seq)) = (parallel, sequential) {
        if par.turns_per_second > 0.0 && seq.turns_per_second > 0.0 {
            println!(
                "\nParallel speedup vs sequential: {:.1}x",
                par.turns_per_second / seq.turns_per_second
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
