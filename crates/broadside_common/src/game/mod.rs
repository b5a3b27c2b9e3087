use thiserror::Error;

use crate::game::grid::Coordinate;
use crate::game::ship::ShipID;

pub mod command;
pub mod grid;
pub mod ship;
pub mod transaction;

pub type PlayerID = String;

/// Placement, shape and bounds violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid ship type: {0}")]
    InvalidShipType(String),
    #[error("ship type {kind} must have size {expected}, got {actual}")]
    WrongShipSize {
        kind: String,
        expected: usize,
        actual: usize,
    },
    #[error("only {max} {kind}(s) allowed")]
    ShipLimitReached { kind: String, max: usize },
    #[error("ship must be a straight line")]
    NotStraightLine,
    #[error("ship cells must be consecutive")]
    NotContiguous,
    #[error("{0} is out of bounds")]
    OutOfBounds(Coordinate),
    #[error("cell {0} is not empty")]
    CellOccupied(Coordinate),
    #[error("ships cannot be adjacent")]
    AdjacentShip,
    #[error("invalid ship orientation")]
    InvalidOrientation,
    #[error("maximum {max} ships allowed")]
    PlacementCap { max: usize },
}

/// Violations of the current board or match state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("ship {0} not found")]
    ShipNotFound(ShipID),
    #[error("no ship at {0}")]
    NoShipAt(Coordinate),
    #[error("already shot at {0}")]
    AlreadyShot(Coordinate),
    #[error("not your turn")]
    NotYourTurn,
    #[error("game not started")]
    GameNotStarted,
    #[error("game is over")]
    GameOver,
    #[error("cannot change ships after ready")]
    AlreadyReady,
    #[error("you need to place {missing} more ship(s)")]
    NotEnoughShips { missing: usize },
}

/// Error raised by a single [`command::Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Validation(ValidationError::PlacementCap { .. }) => {
                "placement_cap_reached"
            }
            CommandError::Validation(ValidationError::OutOfBounds(_)) => "out_of_bounds",
            CommandError::Validation(_) => "invalid_placement",
            CommandError::State(e) => e.code(),
        }
    }
}

impl StateError {
    pub fn code(&self) -> &'static str {
        match self {
            StateError::ShipNotFound(_) | StateError::NoShipAt(_) => "ship_not_found",
            StateError::AlreadyShot(_) => "already_shot",
            StateError::NotYourTurn => "not_your_turn",
            StateError::GameNotStarted => "game_not_started",
            StateError::GameOver => "game_over",
            StateError::AlreadyReady => "already_ready",
            StateError::NotEnoughShips { .. } => "not_enough_ships",
        }
    }
}
