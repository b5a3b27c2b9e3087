use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use broadside_common::game::ship::ShipType;

use crate::game::events::{ErrorReply, ServerEvent};
use crate::game::operations::FireOutcome;
use crate::game::session_test::{session, ship, ALICE, BOB};

fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn notifications_reach_both_players() {
    let session = session();
    let (alice_tx, mut alice_rx) = unbounded_channel();
    let (bob_tx, mut bob_rx) = unbounded_channel();
    assert!(session.attach(ALICE, alice_tx).await.is_ok());
    assert!(session.attach(BOB, bob_tx).await.is_ok());

    assert!(session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(0, 0)]))
        .await
        .is_ok());
    assert!(session
        .place_ship(BOB, ship(ShipType::Submarine, &[(4, 4)]))
        .await
        .is_ok());
    assert!(session.ready(ALICE).await.is_ok());
    assert!(session.ready(BOB).await.is_ok());

    let game_start = ServerEvent::GameStart {
        first_turn: ALICE.to_string(),
    };
    assert_eq!(
        drain(&mut alice_rx),
        vec![
            ServerEvent::ShipPlaced {
                ship_id: 1,
                ship_type: ShipType::Submarine
            },
            ServerEvent::ReadyConfirmed { all_ready: false },
            game_start.clone(),
        ]
    );
    assert_eq!(
        drain(&mut bob_rx),
        vec![
            ServerEvent::ShipPlaced {
                ship_id: 1,
                ship_type: ShipType::Submarine
            },
            ServerEvent::ReadyConfirmed { all_ready: true },
            game_start,
        ]
    );

    assert!(session.fire(BOB, 0, 0).await.is_err());
    assert_eq!(
        drain(&mut bob_rx),
        vec![ServerEvent::NotYourTurn(ErrorReply {
            code: "not_your_turn",
            message: "not your turn".to_string(),
        })]
    );
    assert!(drain(&mut alice_rx).is_empty());

    assert!(session.fire(ALICE, 4, 4).await.is_ok());
    let expected = vec![
        ServerEvent::FireResult(FireOutcome {
            x: 4,
            y: 4,
            hit: true,
            next_turn: BOB.to_string(),
            game_over: true,
        }),
        ServerEvent::GameEnd {
            winner: ALICE.to_string(),
        },
    ];
    assert_eq!(drain(&mut alice_rx), expected);
    assert_eq!(drain(&mut bob_rx), expected);
}

#[tokio::test]
async fn notifications_are_best_effort() {
    let session = session();
    let (alice_tx, alice_rx) = unbounded_channel();
    assert!(session.attach(ALICE, alice_tx).await.is_ok());
    drop(alice_rx);

    assert!(session
        .place_ship(ALICE, ship(ShipType::Submarine, &[(0, 0)]))
        .await
        .is_ok());
    assert_eq!(session.grid(ALICE).await.map(|g| g.ship_count()), Some(1));

    let err = session.remove_ship(ALICE, 5).await.unwrap_err();
    assert_eq!(err.code(), "ship_not_found");
}
