use serde::Serialize;
use tokio::sync::mpsc;

use broadside_common::game::ship::{ShipID, ShipType};
use broadside_common::game::PlayerID;
use broadside_common::script::ItemID;

use crate::game::operations::{FireOutcome, Operation, OperationResult, SessionError};

/// Outbound half of a player connection.
pub type Connection = mpsc::UnboundedSender<ServerEvent>;

/// Message sent to a player connection, encoded as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ShipPlaced {
        ship_id: ShipID,
        ship_type: ShipType,
    },
    ReadyConfirmed {
        all_ready: bool,
    },
    ShipRemoved {
        ship_id: ShipID,
    },
    ItemUsed {
        item_id: ItemID,
        user: PlayerID,
        result: &'static str,
    },
    GameStart {
        first_turn: PlayerID,
    },
    FireResult(FireOutcome),
    GameEnd {
        winner: PlayerID,
    },
    PlaceShipError(ErrorReply),
    RemoveShipError(ErrorReply),
    ReadyError(ErrorReply),
    FireError(ErrorReply),
    UseItemError(ErrorReply),
    NotYourTurn(ErrorReply),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReply {
    pub code: &'static str,
    pub message: String,
}

impl From<&SessionError> for ErrorReply {
    fn from(e: &SessionError) -> Self {
        ErrorReply {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

impl ServerEvent {
    /// Acknowledgment for the acting connection. Fire outcomes and item use
    /// are broadcast instead.
    pub fn acknowledgment(result: &OperationResult) -> Option<ServerEvent> {
        match result {
            OperationResult::ShipPlaced { ship_id, ship_type } => Some(ServerEvent::ShipPlaced {
                ship_id: *ship_id,
                ship_type: *ship_type,
            }),
            OperationResult::ReadyConfirmed { all_ready } => Some(ServerEvent::ReadyConfirmed {
                all_ready: *all_ready,
            }),
            OperationResult::ShipRemoved { ship_id } => {
                Some(ServerEvent::ShipRemoved { ship_id: *ship_id })
            }
            OperationResult::Fired(_) | OperationResult::ItemUsed { .. } => None,
        }
    }

    /// Error reply for a rejected `operation`.
    pub fn rejection(operation: &Operation, error: &SessionError) -> ServerEvent {
        let reply = ErrorReply::from(error);
        if reply.code == "not_your_turn" {
            return ServerEvent::NotYourTurn(reply);
        }
        match operation {
            Operation::PlaceShip { .. } => ServerEvent::PlaceShipError(reply),
            Operation::Ready => ServerEvent::ReadyError(reply),
            Operation::RemoveShip { .. } => ServerEvent::RemoveShipError(reply),
            Operation::Fire { .. } => ServerEvent::FireError(reply),
            Operation::UseItem { .. } => ServerEvent::UseItemError(reply),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ShipPlaced { .. } => "ship_placed",
            ServerEvent::ReadyConfirmed { .. } => "ready_confirmed",
            ServerEvent::ShipRemoved { .. } => "ship_removed",
            ServerEvent::ItemUsed { .. } => "item_used",
            ServerEvent::GameStart { .. } => "game_start",
            ServerEvent::FireResult(_) => "fire_result",
            ServerEvent::GameEnd { .. } => "game_end",
            ServerEvent::PlaceShipError(_) => "place_ship_error",
            ServerEvent::RemoveShipError(_) => "remove_ship_error",
            ServerEvent::ReadyError(_) => "ready_error",
            ServerEvent::FireError(_) => "fire_error",
            ServerEvent::UseItemError(_) => "use_item_error",
            ServerEvent::NotYourTurn(_) => "not_your_turn",
        }
    }
}
