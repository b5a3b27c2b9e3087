use std::fmt::{Display, Formatter};

use broadside_common::game::StateError;

use crate::game::operations::Operation;

/// Match phase. Only ever moves forward: Waiting, Playing, Ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Playing,
    Ended,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Waiting => f.write_str("waiting"),
            Phase::Playing => f.write_str("playing"),
            Phase::Ended => f.write_str("ended"),
        }
    }
}

impl Phase {
    pub fn check_operation(&self, operation: &Operation) -> Result<(), StateError> {
        match self {
            Phase::Waiting => match operation {
                Operation::Fire { .. } | Operation::UseItem { .. } => {
                    Err(StateError::GameNotStarted)
                }
                _ => Ok(()),
            },
            // both players are ready by now
            Phase::Playing => match operation {
                Operation::PlaceShip { .. } | Operation::RemoveShip { .. } => {
                    Err(StateError::AlreadyReady)
                }
                _ => Ok(()),
            },
            Phase::Ended => Err(StateError::GameOver),
        }
    }

    pub fn can_advance_to(&self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Waiting, Phase::Playing) | (Phase::Playing, Phase::Ended)
        )
    }
}
