use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use broadside_common::game::grid::Coordinate;
use broadside_common::game::ship::{ShipRequest, ShipType};
use broadside_common::game::PlayerID;
use broadside_common::script::expr::Params;
use broadside_common::script::ItemID;
use broadside_common::BOARD_SIZE;

use broadside_server::game::events::ServerEvent;
use broadside_server::game::operations::{Operation, SessionError};
use broadside_server::game::session::MatchSession;
use broadside_server::tasks::spawn_connection;

const RETRY_DELAY: Duration = Duration::from_millis(50);

/// A scripted player: places a fixed fleet, then sweeps the opponent's board.
pub struct DemoPlayer {
    id: PlayerID,
    fleet: Vec<ShipRequest>,
    targets: VecDeque<Coordinate>,
    item: Option<ItemID>,
}

impl DemoPlayer {
    pub fn new(id: impl Into<PlayerID>, mirrored: bool, item: Option<ItemID>) -> Self {
        let layout = [
            (ShipType::Battleship, vec![(0, 0), (1, 0), (2, 0), (3, 0)]),
            (ShipType::Cruiser, vec![(0, 2), (0, 3), (0, 4)]),
            (ShipType::Destroyer, vec![(5, 5), (6, 5)]),
            (ShipType::Submarine, vec![(9, 9)]),
        ];
        let fleet = layout
            .iter()
            .map(|(ship_type, coords)| {
                let coords: Vec<_> = coords
                    .iter()
                    .map(|&(x, y)| if mirrored { (BOARD_SIZE - 1 - x, y) } else { (x, y) })
                    .collect();
                ShipRequest::new(*ship_type, &coords)
            })
            .collect();

        let mut targets: VecDeque<_> = (0..BOARD_SIZE)
            .flat_map(|y| (0..BOARD_SIZE).map(move |x| Coordinate::new(x, y)))
            .collect();
        if mirrored {
            targets.make_contiguous().reverse();
        }

        DemoPlayer {
            id: id.into(),
            fleet,
            targets,
            item,
        }
    }

    fn next_move(&mut self) -> Option<Operation> {
        let target = self.targets.pop_front()?;
        match self.item.take() {
            Some(item_id) => {
                // aim the item at the cell we were about to shoot
                self.targets.push_front(target);
                let params = Params::from([
                    ("x".to_string(), i64::from(target.x)),
                    ("y".to_string(), i64::from(target.y)),
                ]);
                Some(Operation::UseItem { item_id, params })
            }
            None => Some(Operation::Fire {
                x: target.x,
                y: target.y,
            }),
        }
    }
}

/// Plays one side of the match over its own connection until the game ends.
pub async fn play(session: Arc<MatchSession>, mut player: DemoPlayer) -> Result<(), SessionError> {
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let connection = spawn_connection(session.clone(), player.id.clone(), out_tx, in_rx).await?;

    let mut outgoing: Vec<Operation> = player
        .fleet
        .drain(..)
        .map(|ship| Operation::PlaceShip { ship })
        .collect();
    outgoing.push(Operation::Ready);
    for operation in outgoing {
        if in_tx.send(operation).is_err() {
            warn!("{}: connection closed during setup", player.id);
            return Ok(());
        }
    }

    while let Some(event) = out_rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(json) => info!("{} <- {}", player.id, json),
            Err(e) => warn!("{}: unable to encode {}: {}", player.id, event.name(), e),
        }

        let my_turn = match &event {
            ServerEvent::GameStart { first_turn } => *first_turn == player.id,
            ServerEvent::FireResult(outcome) => !outcome.game_over && outcome.next_turn == player.id,
            ServerEvent::ItemUsed { user, .. } => *user == player.id,
            ServerEvent::FireError(_) | ServerEvent::UseItemError(_) => true,
            ServerEvent::NotYourTurn(_) => {
                debug!("{}: not my turn yet, waiting", player.id);
                tokio::time::sleep(RETRY_DELAY).await;
                false
            }
            ServerEvent::GameEnd { .. } => break,
            _ => false,
        };

        if my_turn {
            match player.next_move() {
                Some(operation) => {
                    if in_tx.send(operation).is_err() {
                        break;
                    }
                }
                None => break,
            }
        }
    }

    connection.stop().await;
    Ok(())
}
