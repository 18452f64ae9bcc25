//! Integration tests for the Candyline engine
//!
//! Tests the full stack: config files, board generation, the session
//! orchestrator and the headless presenter

use candyline_core::{scan_board, Board, Catalog, Coord, GameConfig, Point};
use candyline_session::{Gesture, HeadlessPresenter, Session, TurnOutcome};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn headless() -> HeadlessPresenter {
    HeadlessPresenter::new().without_recording()
}

/// Play `turns` hinted swaps; stops early on a board with no match
async fn play_hinted(session: &mut Session<HeadlessPresenter>, turns: usize) -> Vec<TurnOutcome> {
    let mut outcomes = Vec::new();
    for _ in 0..turns {
        let Some(pair) = session.hint() else {
            break;
        };
        session.handle_gesture(Gesture::Tap(pair.from)).await;
        outcomes.push(session.handle_gesture(Gesture::Tap(pair.to)).await);
    }
    outcomes
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_config_file_drives_session() {
    let path = std::env::temp_dir().join(format!("candyline-it-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "rows": 5, "cols": 9, "board_width": 900.0, "catalog": ["Ruby", "Sapphire", "Emerald", "Topaz"], "seed": 17 }"#,
    )
    .unwrap();
    let config = GameConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let session = Session::init(config, headless()).unwrap();
    assert_eq!(session.board().rows(), 5);
    assert_eq!(session.board().cols(), 9);
    assert_eq!(session.layout().cell_size(), 100.0);
    assert_eq!(session.catalog().len(), 4);
    assert_eq!(session.presenter().live_count(), 45);
    assert!(session.board().adjacent_duplicates().is_empty());
}

#[test]
fn test_same_seed_same_board() {
    let config = GameConfig::with_size(7, 7).with_seed(2024);
    let a = Session::init(config.clone(), headless()).unwrap();
    let b = Session::init(config, headless()).unwrap();
    assert_eq!(a.render(), b.render());
}

// ============================================================================
// FULL GAMES
// ============================================================================

#[tokio::test]
async fn test_long_game_keeps_board_consistent() {
    let config = GameConfig::default().with_seed(77);
    let mut session = Session::init(config, headless()).unwrap();

    let outcomes = play_hinted(&mut session, 40).await;
    assert!(!outcomes.is_empty());

    let mut expected_score = 0;
    for outcome in &outcomes {
        match outcome {
            TurnOutcome::Resolved {
                cleared,
                score_delta,
                ..
            } => {
                assert!(*cleared >= 3);
                assert_eq!(*score_delta, *cleared as u64 * 10);
                expected_score += score_delta;
            }
            other => panic!("hinted swap did not resolve: {:?}", other),
        }
    }

    assert_eq!(session.score(), expected_score);
    assert!(scan_board(session.board()).is_empty());
    assert_eq!(session.board().canceled_count(), 0);
    assert_eq!(session.presenter().live_count(), 64);
    assert_eq!(session.moves(), outcomes.len() as u64);

    let presenter = session.dispose();
    assert_eq!(presenter.live_count(), 0);
}

#[tokio::test]
async fn test_snapshot_matches_render() {
    let catalog = Catalog::new(["A", "B", "C", "D"]).unwrap();
    let board = Board::from_rows(&["ABCD", "CDAB", "ABCD"], &catalog).unwrap();
    let config = GameConfig::default().with_catalog(catalog.clone());
    let session = Session::with_board(config, headless(), board).unwrap();

    let snapshot = session.snapshot();
    let rendered: String = snapshot
        .tokens
        .iter()
        .map(|row| {
            let mut line: String = row.iter().map(|&t| catalog.glyph(t)).collect();
            line.push('\n');
            line
        })
        .collect();
    assert_eq!(rendered, session.render());
}

#[tokio::test]
async fn test_world_space_taps_select_cells() {
    let config = GameConfig::with_size(4, 4).with_seed(1);
    let mut session = Session::init(config, headless()).unwrap();

    // Default width 640 over 4 columns: 160-unit cells, origin at the centre
    let outcome = session
        .handle_gesture(Gesture::TapAt(Point::new(-300.0, 300.0)))
        .await;
    assert_eq!(outcome, TurnOutcome::Anchored(Coord::new(0, 0)));

    let outcome = session
        .handle_gesture(Gesture::TapAt(Point::new(100.0, -100.0)))
        .await;
    assert_eq!(
        outcome,
        TurnOutcome::Reanchored {
            from: Coord::new(0, 0),
            to: Coord::new(2, 2)
        }
    );
}
