use futures::future::join_all;

use broadside_common::game::grid::{CellState, Coordinate};
use broadside_common::game::ship::ShipType;

use crate::game::operations::{FireOutcome, OperationResult};
use crate::game::session_test::{session, ship, start, ALICE, BOB};
use crate::game::states::Phase;

#[tokio::test]
async fn fire_passes_the_turn() {
    let session = session();
    start(
        &session,
        vec![ship(ShipType::Destroyer, &[(0, 0), (0, 1)])],
        vec![ship(ShipType::Destroyer, &[(5, 5), (6, 5)])],
    )
    .await;

    // miss
    assert_eq!(
        session.fire(ALICE, 0, 0).await.ok(),
        Some(OperationResult::Fired(FireOutcome {
            x: 0,
            y: 0,
            hit: false,
            next_turn: BOB.to_string(),
            game_over: false,
        }))
    );
    assert_eq!(session.turn().await.as_deref(), Some(BOB));
    let err = session.fire(ALICE, 1, 1).await.unwrap_err();
    assert_eq!(err.code(), "not_your_turn");

    // hit
    assert_eq!(
        session.fire(BOB, 0, 0).await.ok(),
        Some(OperationResult::Fired(FireOutcome {
            x: 0,
            y: 0,
            hit: true,
            next_turn: ALICE.to_string(),
            game_over: false,
        }))
    );

    let alice = session.grid(ALICE).await.unwrap();
    assert_eq!(alice.cell(Coordinate::new(0, 0)), Some(CellState::Hit));
    assert_eq!(alice.surviving_ship_cells(), 1);
    let bob = session.grid(BOB).await.unwrap();
    assert_eq!(bob.cell(Coordinate::new(0, 0)), Some(CellState::Miss));
    assert_eq!(bob.shots_made(), &[Coordinate::new(0, 0)]);
}

#[tokio::test]
async fn fire_rejected_shots_keep_the_turn() {
    let session = session();
    start(
        &session,
        vec![ship(ShipType::Submarine, &[(0, 0)])],
        vec![ship(ShipType::Submarine, &[(5, 5)])],
    )
    .await;

    let err = session.fire(ALICE, 10, 0).await.unwrap_err();
    assert_eq!(err.code(), "out_of_bounds");
    assert_eq!(session.turn().await.as_deref(), Some(ALICE));

    assert!(session.fire(ALICE, 3, 3).await.is_ok());
    assert!(session.fire(BOB, 3, 3).await.is_ok());

    let before = session.grid(BOB).await;
    let err = session.fire(ALICE, 3, 3).await.unwrap_err();
    assert_eq!(err.code(), "already_shot");
    assert_eq!(session.grid(BOB).await, before);
    assert_eq!(session.turn().await.as_deref(), Some(ALICE));
}

#[tokio::test]
async fn fire_sinks_the_last_ship() {
    let session = session();
    start(
        &session,
        vec![ship(ShipType::Submarine, &[(0, 0)])],
        vec![ship(ShipType::Destroyer, &[(5, 5), (5, 6)])],
    )
    .await;

    assert!(session.fire(ALICE, 5, 5).await.is_ok());
    assert!(session.fire(BOB, 9, 9).await.is_ok());
    assert_eq!(
        session.fire(ALICE, 5, 6).await.ok(),
        Some(OperationResult::Fired(FireOutcome {
            x: 5,
            y: 6,
            hit: true,
            next_turn: BOB.to_string(),
            game_over: true,
        }))
    );

    assert_eq!(session.phase().await, Phase::Ended);
    assert_eq!(session.winner().await.as_deref(), Some(ALICE));

    // nobody may shoot once the game is over, whoever holds the turn
    for player in [ALICE, BOB] {
        let err = session.fire(player, 1, 1).await.unwrap_err();
        assert_eq!(err.code(), "game_over");
    }
    let err = session.ready(BOB).await.unwrap_err();
    assert_eq!(err.code(), "game_over");
    assert_eq!(session.grid(ALICE).await.map(|g| g.shots_made().len()), Some(1));
}

#[tokio::test]
async fn fire_concurrent_attempts_are_serialized() {
    let session = session();
    start(
        &session,
        vec![ship(ShipType::Submarine, &[(9, 9)])],
        vec![ship(ShipType::Submarine, &[(9, 9)])],
    )
    .await;

    let attempts = (0..10).map(|x| {
        let session = session.clone();
        tokio::spawn(async move { session.fire(ALICE, x, 0).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    // the first shot passes the turn, every other one finds it gone
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.code() == "not_your_turn"));
    assert_eq!(session.grid(BOB).await.map(|g| g.shots_made().len()), Some(1));
    assert_eq!(session.turn().await.as_deref(), Some(BOB));
}
