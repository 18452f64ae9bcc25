//! Integration tests for turn resolution, the watchdog and the driver

use std::time::{Duration, Instant};

use candyline_core::{scan_board, Board, Catalog, Coord, GameConfig, SwapPair};
use candyline_session::{
    drive, gesture_channel, Effect, EffectMode, Gesture, HeadlessPresenter, Session, TurnOutcome,
    NORMAL_SCALE,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// 6x6 board with no runs. Swapping (2,0) and (2,1) lines up three A's at
/// row 2, columns 1-3.
const FIXTURE: [&str; 6] = ["CDBCDB", "DCADCA", "ABAADC", "BDCBCA", "CABDAB", "DCDCBD"];

fn catalog() -> Catalog {
    Catalog::new(["A", "B", "C", "D"]).unwrap()
}

/// Session over the fixture. Handles are numbered row-major, so the actor
/// first placed at (r, c) is `r * 6 + c`.
fn fixture_session(presenter: HeadlessPresenter, config: GameConfig) -> Session<HeadlessPresenter> {
    let board = Board::from_rows(&FIXTURE, &catalog()).unwrap();
    let config = config.with_catalog(catalog()).with_seed(5).with_max_cascades(0);
    Session::with_board(config, presenter, board).unwrap()
}

fn handle_at(session: &Session<HeadlessPresenter>, row: usize, col: usize) -> u32 {
    session.board()[Coord::new(row, col)].handle
}

fn expected_triple() -> TurnOutcome {
    TurnOutcome::Resolved {
        swap: SwapPair {
            from: Coord::new(2, 0),
            to: Coord::new(2, 1),
        },
        cleared: 3,
        cascades: 0,
        score_delta: 30,
    }
}

// ============================================================================
// END-TO-END RESOLUTION
// ============================================================================

#[tokio::test]
async fn test_triple_after_swap_clears_and_refills() {
    let mut session = fixture_session(HeadlessPresenter::new(), GameConfig::default());
    let original = session.board().to_plain();

    session.handle_gesture(Gesture::Tap(Coord::new(2, 0))).await;
    let outcome = session.handle_gesture(Gesture::Tap(Coord::new(2, 1))).await;

    assert_eq!(outcome, expected_triple());
    assert_eq!(session.score(), 30);
    assert_eq!(session.anchor(), None);

    // The three matched actors got a clear effect and were destroyed
    let effects = session.presenter().effects();
    let mut cleared: Vec<u32> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::Clear { handle, .. } => Some(*handle),
            _ => None,
        })
        .collect();
    cleared.sort_unstable();
    assert_eq!(cleared, vec![12, 14, 15]);
    for handle in [12, 14, 15] {
        assert!(effects.contains(&Effect::Destroy { handle }));
    }

    for col in 1..=3 {
        // Rows 0 and 1 fell by one row
        assert_eq!(handle_at(&session, 1, col), col as u32);
        assert_eq!(handle_at(&session, 2, col), 6 + col as u32);
        assert_eq!(
            session.board().token(Coord::new(1, col)),
            original.token(Coord::new(0, col))
        );
        assert_eq!(
            session.board().token(Coord::new(2, col)),
            original.token(Coord::new(1, col))
        );
        assert!(effects.contains(&Effect::Move {
            handle: col as u32,
            from: session.layout().cell_center(Coord::new(0, col)),
            to: session.layout().cell_center(Coord::new(1, col)),
        }));

        // A fresh actor popped in at the top
        let fresh = handle_at(&session, 0, col);
        assert!(fresh >= 36);
        assert!(effects.contains(&Effect::Place {
            handle: fresh,
            at: session.layout().cell_center(Coord::new(0, col)),
        }));
        assert!(effects.contains(&Effect::SetScale {
            handle: fresh,
            scale: 0.0
        }));
        assert!(effects.contains(&Effect::Scale {
            handle: fresh,
            scale: NORMAL_SCALE
        }));
    }

    // Rows below the cleared line and untouched columns keep their actors
    assert_eq!(handle_at(&session, 2, 0), 13);
    for row in 3..6 {
        for col in 0..6 {
            assert_eq!(handle_at(&session, row, col), (row * 6 + col) as u32);
        }
    }
    for col in [4, 5] {
        for row in 0..3 {
            assert_eq!(handle_at(&session, row, col), (row * 6 + col) as u32);
        }
    }

    assert_eq!(session.board().canceled_count(), 0);
    assert_eq!(session.presenter().live_count(), 36);
}

#[tokio::test]
async fn test_cascades_run_until_board_is_quiet() {
    for seed in 0..8 {
        let config = GameConfig::default().with_seed(seed);
        let mut session = Session::init(config, HeadlessPresenter::new().without_recording()).unwrap();

        for _ in 0..12 {
            let Some(pair) = session.hint() else {
                break;
            };
            let outcome = session.resolve_swap(pair.from, pair.to).await;
            assert!(
                matches!(outcome, TurnOutcome::Resolved { .. }),
                "seed {}: hint {:?} gave {:?}",
                seed,
                pair,
                outcome
            );
            assert!(scan_board(session.board()).is_empty(), "seed {}", seed);
            assert_eq!(session.board().canceled_count(), 0);
            assert_eq!(session.presenter().live_count(), 64);
        }
    }
}

#[tokio::test]
async fn test_quiet_board_rescan_is_a_no_op() {
    let session = fixture_session(HeadlessPresenter::new(), GameConfig::default());
    assert!(scan_board(session.board()).is_empty());
}

/// 6x4 board with no runs. Swapping (4,0) and (4,1) clears A's in column 0,
/// rows 3-5; the collapse then drops C onto (5,0) next to the C's at (5,1)
/// and (5,2) without any help from refilled cells.
const CASCADE: [&str; 6] = ["BCDA", "DBAC", "CABD", "ADCB", "DABD", "ACCB"];

fn cascade_session(config: GameConfig) -> Session<HeadlessPresenter> {
    let board = Board::from_rows(&CASCADE, &catalog()).unwrap();
    let config = config.with_catalog(catalog()).with_seed(9);
    Session::with_board(config, HeadlessPresenter::new(), board).unwrap()
}

#[tokio::test]
async fn test_collapse_triggers_cascade_round() {
    let mut session = cascade_session(GameConfig::default());
    let outcome = session.resolve_swap(Coord::new(4, 0), Coord::new(4, 1)).await;

    let TurnOutcome::Resolved {
        cleared,
        cascades,
        score_delta,
        ..
    } = outcome
    else {
        panic!("expected a resolved turn, got {:?}", outcome);
    };
    // Refilled cells may chain further rounds, but never fewer than these
    assert!(cascades >= 1, "cascades = {}", cascades);
    assert!(cleared >= 6, "cleared = {}", cleared);
    assert_eq!(score_delta, cleared as u64 * 10);
    assert_eq!(session.score(), score_delta);

    assert!(scan_board(session.board()).is_empty());
    assert_eq!(session.board().canceled_count(), 0);
    assert_eq!(session.presenter().live_count(), 24);

    let score_events = session
        .presenter()
        .effects()
        .iter()
        .filter(|e| matches!(e, Effect::Score(_)))
        .count();
    assert_eq!(score_events as u32, cascades + 1);
}

#[tokio::test]
async fn test_cascade_cap_leaves_runs_for_next_turn() {
    let mut session = cascade_session(GameConfig::default().with_max_cascades(0));
    let outcome = session.resolve_swap(Coord::new(4, 0), Coord::new(4, 1)).await;

    assert_eq!(
        outcome,
        TurnOutcome::Resolved {
            swap: SwapPair {
                from: Coord::new(4, 0),
                to: Coord::new(4, 1),
            },
            cleared: 3,
            cascades: 0,
            score_delta: 30,
        }
    );

    let leftover = scan_board(session.board());
    for col in 0..3 {
        assert!(leftover.contains(&Coord::new(5, col)), "missing (5,{})", col);
    }
    // Capped turn still leaves a consistent board
    assert_eq!(session.board().canceled_count(), 0);
    assert_eq!(session.presenter().live_count(), 24);
    assert_eq!(session.score(), 30);
}

// ============================================================================
// WATCHDOG
// ============================================================================

#[tokio::test]
async fn test_stalled_presenter_is_released_by_watchdog() {
    let presenter = HeadlessPresenter::new().with_mode(EffectMode::Stalled);
    let config = GameConfig::default().with_effect_timeout(Some(Duration::from_millis(20)));
    let mut session = fixture_session(presenter, config);

    let start = Instant::now();
    session.handle_gesture(Gesture::Tap(Coord::new(2, 0))).await;
    let outcome = session.handle_gesture(Gesture::Tap(Coord::new(2, 1))).await;

    assert_eq!(outcome, expected_triple());
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_rejected_effects_count_as_complete() {
    let presenter = HeadlessPresenter::new().with_mode(EffectMode::Rejected);
    let mut session = fixture_session(presenter, GameConfig::default());

    let outcome = session
        .resolve_swap(Coord::new(2, 0), Coord::new(2, 1))
        .await;
    assert_eq!(outcome, expected_triple());
}

// ============================================================================
// DRIVER
// ============================================================================

#[tokio::test]
async fn test_driver_handles_queued_gestures_in_order() {
    let mut session = fixture_session(HeadlessPresenter::new(), GameConfig::default());
    let (tx, rx) = gesture_channel();
    tx.send(Gesture::Tap(Coord::new(2, 0))).await.unwrap();
    tx.send(Gesture::Tap(Coord::new(2, 1))).await.unwrap();
    drop(tx);

    let report = drive(&mut session, rx).await;

    assert_eq!(report.dropped, 0);
    assert_eq!(
        report.outcomes,
        vec![TurnOutcome::Anchored(Coord::new(2, 0)), expected_triple()]
    );
}

#[tokio::test]
async fn test_driver_drops_gestures_while_resolving() {
    let presenter = HeadlessPresenter::new().with_mode(EffectMode::Delayed(Duration::from_millis(100)));
    let mut session = fixture_session(presenter, GameConfig::default());
    let (tx, rx) = gesture_channel();

    tokio::spawn(async move {
        tx.send(Gesture::Tap(Coord::new(2, 0))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        tx.send(Gesture::Tap(Coord::new(2, 1))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        // Lands during the swap effect
        tx.send(Gesture::Tap(Coord::new(5, 5))).await.unwrap();
    });

    let report = drive(&mut session, rx).await;

    assert_eq!(report.dropped, 1);
    assert_eq!(
        report.outcomes,
        vec![TurnOutcome::Anchored(Coord::new(2, 0)), expected_triple()]
    );
    assert_eq!(session.anchor(), None);
}
