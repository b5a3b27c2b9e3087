use serde::{Deserialize, Serialize};
use thiserror::Error;

use broadside_common::game::ship::{ShipID, ShipRequest, ShipType};
use broadside_common::game::transaction::TransactionError;
use broadside_common::game::{PlayerID, StateError, ValidationError};
use broadside_common::script::expr::Params;
use broadside_common::script::{ItemID, ScriptError};

/// A client request against a match, decoded from `{"event": <name>, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Operation {
    PlaceShip {
        ship: ShipRequest,
    },
    Ready,
    RemoveShip {
        ship_id: ShipID,
    },
    Fire {
        x: i32,
        y: i32,
    },
    UseItem {
        item_id: ItemID,
        #[serde(default)]
        params: Params,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::PlaceShip { .. } => "place_ship",
            Operation::Ready => "ready",
            Operation::RemoveShip { .. } => "remove_ship",
            Operation::Fire { .. } => "fire",
            Operation::UseItem { .. } => "use_item",
        }
    }
}

/// Success payload of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
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
    Fired(FireOutcome),
    ItemUsed {
        item_id: ItemID,
        result: &'static str,
        game_over: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FireOutcome {
    pub x: i32,
    pub y: i32,
    pub hit: bool,
    pub next_turn: PlayerID,
    pub game_over: bool,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerID),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("inconsistent match state: {0}")]
    InconsistentState(String),
}

impl SessionError {
    /// The error name reported to the client.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::UnknownPlayer(_) => "unknown_player",
            SessionError::Validation(ValidationError::PlacementCap { .. }) => {
                "placement_cap_reached"
            }
            SessionError::Validation(_) => "invalid_placement",
            SessionError::State(e) => e.code(),
            SessionError::Transaction(e) => e.code(),
            SessionError::Script(e) => e.code(),
            SessionError::InconsistentState(_) => "inconsistent_state",
        }
    }
}
