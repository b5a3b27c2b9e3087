use broadside_common::game::ship::ShipType;
use broadside_common::script::ItemCatalog;

use crate::config_provider::{FirstTurn, GameConfig};
use crate::game::operations::OperationResult;
use crate::game::session_test::{session, session_with, ship, start, ALICE, BOB};
use crate::game::states::Phase;

#[tokio::test]
async fn ready_starts_the_game() {
    let session = session();
    assert_eq!(session.phase().await, Phase::Waiting);
    assert_eq!(session.turn().await, None);

    start(&session, vec![], vec![]).await;

    assert_eq!(session.phase().await, Phase::Playing);
    assert_eq!(session.turn().await.as_deref(), Some(ALICE));

    // player 2 shooting first is rejected without touching any board
    let before = (session.grid(ALICE).await, session.grid(BOB).await);
    let err = session.fire(BOB, 0, 0).await.unwrap_err();
    assert_eq!(err.code(), "not_your_turn");
    assert_eq!((session.grid(ALICE).await, session.grid(BOB).await), before);
    assert_eq!(session.turn().await.as_deref(), Some(ALICE));
}

#[tokio::test]
async fn ready_is_idempotent() {
    let session = session();

    for _ in 0..2 {
        assert_eq!(
            session.ready(ALICE).await.ok(),
            Some(OperationResult::ReadyConfirmed { all_ready: false })
        );
    }
    assert_eq!(session.phase().await, Phase::Waiting);

    assert!(session.ready(BOB).await.is_ok());
    assert_eq!(
        session.ready(BOB).await.ok(),
        Some(OperationResult::ReadyConfirmed { all_ready: true })
    );
    assert_eq!(session.phase().await, Phase::Playing);
    assert_eq!(session.turn().await.as_deref(), Some(ALICE));
}

#[tokio::test]
async fn ready_requires_ships() {
    let session = session_with(
        GameConfig {
            ships_required_for_ready: 2,
            ..Default::default()
        },
        ItemCatalog::default(),
    );

    assert!(session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(0, 0)]))
        .await
        .is_ok());
    let err = session.ready(ALICE).await.unwrap_err();
    assert_eq!(err.code(), "not_enough_ships");
    assert_eq!(err.to_string(), "you need to place 1 more ship(s)");
    assert_eq!(session.is_ready(ALICE).await, Some(false));

    assert!(session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(2, 0)]))
        .await
        .is_ok());
    assert!(session.ready(ALICE).await.is_ok());
    assert_eq!(session.is_ready(ALICE).await, Some(true));
}

#[tokio::test]
async fn ready_second_player_goes_first() {
    let session = session_with(
        GameConfig {
            first_turn: FirstTurn::Player2,
            ..Default::default()
        },
        ItemCatalog::default(),
    );

    start(&session, vec![], vec![]).await;
    assert_eq!(session.turn().await.as_deref(), Some(BOB));

    let err = session.fire(ALICE, 0, 0).await.unwrap_err();
    assert_eq!(err.code(), "not_your_turn");
}

#[tokio::test]
async fn ready_no_attacks_before_start() {
    let session = session();

    assert!(session
        .place_ship(BOB, ship(ShipType::Submarine, &[(0, 0)]))
        .await
        .is_ok());
    assert!(session.ready(ALICE).await.is_ok());

    let err = session.fire(ALICE, 0, 0).await.unwrap_err();
    assert_eq!(err.code(), "game_not_started");

    let err = session
        .use_item(ALICE, 1, Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "game_not_started");

    assert_eq!(session.grid(BOB).await.map(|g| g.shots_made().len()), Some(0));
}
