use broadside_common::game::grid::{CellState, Coordinate};
use broadside_common::game::ship::ShipType;
use broadside_common::script::expr::Params;
use broadside_common::script::{Item, ItemCatalog};

use crate::config_provider::GameConfig;
use crate::game::operations::OperationResult;
use crate::game::session_test::{session_with, ship, start, ALICE, BOB};
use crate::game::states::Phase;

fn catalog() -> ItemCatalog {
    ItemCatalog::new([
        Item {
            id: 1,
            name: "Depth charge".to_string(),
            description: String::new(),
            script: r#"[{"Name":"MAKE_SHOT","Args":{"x":"$x","y":"$y"}},{"Name":"MAKE_SHOT","Args":{"x":"$x","y":"$y+1"}}]"#.to_string(),
        },
        Item {
            id: 2,
            name: "Scout plane".to_string(),
            description: String::new(),
            script: r#"[{"Name":"OPEN_CELL","Args":{"x":"$x","y":"$y"}},{"Name":"END_PLAYER_ACTION","Args":{}}]"#.to_string(),
        },
    ])
}

fn params(x: i64, y: i64) -> Params {
    Params::from([("x".to_string(), x), ("y".to_string(), y)])
}

#[tokio::test]
async fn items_keep_the_turn() {
    let session = session_with(GameConfig::default(), catalog());
    start(
        &session,
        vec![ship(ShipType::Submarine, &[(0, 0)])],
        vec![ship(ShipType::Submarine, &[(5, 5)])],
    )
    .await;

    assert_eq!(
        session.use_item(ALICE, 2, params(2, 2)).await.ok(),
        Some(OperationResult::ItemUsed {
            item_id: 2,
            result: "item_used_successfully",
            game_over: false,
        })
    );
    assert_eq!(session.turn().await.as_deref(), Some(ALICE));

    let bob = session.grid(BOB).await.unwrap();
    assert_eq!(bob.cell(Coordinate::new(2, 2)), Some(CellState::Revealed));
    let alice = session.grid(ALICE).await.unwrap();
    assert_eq!(alice.cell(Coordinate::new(2, 2)), Some(CellState::Empty));

    let err = session
        .use_item(BOB, 2, params(1, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_your_turn");
}

#[tokio::test]
async fn items_failures_roll_back() {
    let session = session_with(GameConfig::default(), catalog());
    start(
        &session,
        vec![ship(ShipType::Submarine, &[(0, 0)])],
        vec![ship(ShipType::Submarine, &[(5, 5)])],
    )
    .await;
    let before = session.grid(BOB).await;

    let err = session
        .use_item(ALICE, 9, params(1, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "unknown_item");

    // the second shot leaves the board
    let err = session
        .use_item(ALICE, 1, params(3, 9))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "out_of_bounds");

    assert_eq!(session.grid(BOB).await, before);
    assert_eq!(session.turn().await.as_deref(), Some(ALICE));
}

#[tokio::test]
async fn items_can_win_the_game() {
    let session = session_with(GameConfig::default(), catalog());
    start(
        &session,
        vec![ship(ShipType::Submarine, &[(0, 0)])],
        vec![ship(ShipType::Destroyer, &[(5, 5), (5, 6)])],
    )
    .await;

    assert_eq!(
        session.use_item(ALICE, 1, params(5, 5)).await.ok(),
        Some(OperationResult::ItemUsed {
            item_id: 1,
            result: "item_used_successfully",
            game_over: true,
        })
    );
    assert_eq!(session.phase().await, Phase::Ended);
    assert_eq!(session.winner().await.as_deref(), Some(ALICE));

    let err = session
        .use_item(ALICE, 2, params(0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "game_over");
}
