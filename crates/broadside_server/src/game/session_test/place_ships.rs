use broadside_common::game::grid::{CellState, Coordinate};
use broadside_common::game::ship::ShipType;
use broadside_common::script::ItemCatalog;

use crate::config_provider::GameConfig;
use crate::game::operations::OperationResult;
use crate::game::session_test::{session, session_with, ship, ALICE, BOB};
use crate::game::states::Phase;

#[tokio::test]
async fn place_ships_adjacent_rejected() {
    let session = session();

    let placed = session
        .place_ship(ALICE, ship(ShipType::Destroyer, &[(1, 1), (1, 2)]))
        .await;
    assert_eq!(
        placed.ok(),
        Some(OperationResult::ShipPlaced {
            ship_id: 1,
            ship_type: ShipType::Destroyer
        })
    );
    let before = session.grid(ALICE).await;

    let err = session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(2, 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_placement");
    assert_eq!(session.grid(ALICE).await, before);

    // the other board is independent
    assert!(session
        .place_ship(BOB, ship(ShipType::Submarine, &[(2, 1)]))
        .await
        .is_ok());
}

#[tokio::test]
async fn place_ships_ids_are_assigned_by_the_board() {
    let session = session();

    let mut request = ship(ShipType::Submarine, &[(0, 0)]);
    request.id = Some(42);
    assert_eq!(
        session.place_ship(ALICE, request).await.ok(),
        Some(OperationResult::ShipPlaced {
            ship_id: 1,
            ship_type: ShipType::Submarine
        })
    );

    let grid = session.grid(ALICE).await.unwrap();
    assert!(grid.ship(42).is_none());
    assert_eq!(grid.cell(Coordinate::new(0, 0)), Some(CellState::ShipCell));
}

#[tokio::test]
async fn place_ships_invalid_requests() {
    let session = session();

    let mut unknown = ship(ShipType::Submarine, &[(0, 0)]);
    unknown.kind = "carrier".to_string();
    let err = session.place_ship(ALICE, unknown).await.unwrap_err();
    assert_eq!(err.code(), "invalid_placement");

    let err = session
        .place_ship(ALICE, ship(ShipType::Destroyer, &[(9, 9), (10, 9)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "out_of_bounds");

    let err = session
        .place_ship(ALICE, ship(ShipType::Cruiser, &[(0, 0), (1, 1), (2, 2)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_placement");

    // extreme coordinates are rejected and the room keeps serving requests
    let err = session
        .place_ship(ALICE, ship(ShipType::Destroyer, &[(0, i32::MIN), (0, i32::MAX)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_placement");
    assert!(session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(0, 0)]))
        .await
        .is_ok());

    assert_eq!(session.grid(ALICE).await.map(|g| g.ship_count()), Some(1));
}

#[tokio::test]
async fn place_ships_cap() {
    let session = session_with(
        GameConfig {
            max_ships_per_player: 2,
            ..Default::default()
        },
        ItemCatalog::default(),
    );

    for x in [0, 2] {
        assert!(session
            .place_ship(ALICE, ship(ShipType::Submarine, &[(x, 0)]))
            .await
            .is_ok());
    }
    let err = session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(4, 0)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "placement_cap_reached");
    assert_eq!(session.grid(ALICE).await.map(|g| g.ship_count()), Some(2));
}

#[tokio::test]
async fn place_ships_remove() {
    let session = session();

    assert!(session
        .place_ship(ALICE, ship(ShipType::Destroyer, &[(1, 1), (1, 2)]))
        .await
        .is_ok());
    assert_eq!(
        session.remove_ship(ALICE, 1).await.ok(),
        Some(OperationResult::ShipRemoved { ship_id: 1 })
    );

    let grid = session.grid(ALICE).await.unwrap();
    assert_eq!(grid.ship_count(), 0);
    assert_eq!(grid.cell(Coordinate::new(1, 1)), Some(CellState::Empty));

    // the freed cells can be used again
    assert!(session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(2, 1)]))
        .await
        .is_ok());

    let err = session.remove_ship(ALICE, 1).await.unwrap_err();
    assert_eq!(err.code(), "ship_not_found");
}

#[tokio::test]
async fn place_ships_after_ready() {
    let session = session();

    assert!(session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(0, 0)]))
        .await
        .is_ok());
    assert!(session.ready(ALICE).await.is_ok());
    assert_eq!(session.phase().await, Phase::Waiting);

    let err = session.remove_ship(ALICE, 1).await.unwrap_err();
    assert_eq!(err.code(), "already_ready");

    let err = session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(5, 5)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "already_ready");

    assert_eq!(session.grid(ALICE).await.map(|g| g.ship_count()), Some(1));
}
