//! Play command - automated turns against a headless presenter
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: start_session(), play_session(), report_results()
//! - Level 3: describe_outcome()
//! - Level 4: runtime construction

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use candyline_core::GameConfig;
use candyline_session::{HeadlessPresenter, Session, Snapshot, TurnOutcome};

use crate::autoplay::{play_turn, PlayStats};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Number of turns to play
    #[arg(long, default_value = "20")]
    pub turns: usize,

    /// Print the board after every turn
    #[arg(long)]
    pub show_board: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything printed at the end of a game
#[derive(Debug, Serialize)]
struct GameReport {
    seed: Option<u64>,
    stats: PlayStats,
    final_board: Snapshot,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Start a session on a fresh board
/// 2. Play the requested turns
/// 3. Report results and dispose the session
pub fn run(args: PlayArgs, config: GameConfig) -> Result<()> {
    tracing::info!(
        "Starting game: {}x{} board, {} turns",
        config.rows,
        config.cols,
        args.turns
    );

    let seed = config.seed;
    let mut session = start_session(config)?;
    if !args.json {
        println!("{}", session.render());
    }

    let runtime = create_runtime()?;
    let stats = runtime.block_on(play_session(&mut session, &args));

    report_results(&session, seed, stats, &args)?;
    session.dispose();

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Build the session with a non-recording headless presenter
fn start_session(config: GameConfig) -> Result<Session<HeadlessPresenter>> {
    Session::init(config, HeadlessPresenter::new().without_recording())
        .context("Failed to start session")
}

/// Play turns, printing one line per turn
async fn play_session(session: &mut Session<HeadlessPresenter>, args: &PlayArgs) -> PlayStats {
    let mut rng = session.config().rng();
    let mut stats = PlayStats::default();

    for turn in 1..=args.turns {
        let Some(outcome) = play_turn(session, &mut rng).await else {
            tracing::warn!("Board has no adjacent cells to swap; stopping");
            break;
        };
        stats.record(&outcome);

        if !args.json {
            println!("turn {:>3}: {}", turn, describe_outcome(&outcome));
            if args.show_board {
                println!("{}", session.render());
            }
        }
    }

    stats
}

/// Print the final board and totals
fn report_results(
    session: &Session<HeadlessPresenter>,
    seed: Option<u64>,
    stats: PlayStats,
    args: &PlayArgs,
) -> Result<()> {
    if args.json {
        let report = GameReport {
            seed,
            stats,
            final_board: session.snapshot(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{}", session.render());
    println!(
        "Score: {}  ({} resolved, {} reverted, {} cleared, longest cascade {})",
        session.score(),
        stats.resolved,
        stats.reverted,
        stats.cleared,
        stats.longest_cascade
    );
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// One-line summary of a turn
fn describe_outcome(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Resolved {
            swap,
            cleared,
            cascades,
            score_delta,
        } => format!(
            "swap {} <-> {} cleared {} (+{}), {} cascades",
            swap.from, swap.to, cleared, score_delta, cascades
        ),
        TurnOutcome::Reverted(swap) => format!("swap {} <-> {} reverted", swap.from, swap.to),
        TurnOutcome::Invalid(err) => format!("invalid swap: {}", err),
        other => format!("{:?}", other),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Single-threaded runtime for one session
pub fn create_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build tokio runtime")
}

// ============================================================================
// TESTS
// ============================================================================
