use log::{trace, warn};

use crate::game::grid::{CellState, Cells, Coordinate, GridState};
use crate::game::ship::{Ship, ShipID, ShipRequest, ShipType};
use crate::game::{CommandError, StateError, ValidationError};

/// A single reversible mutation of a [`GridState`].
///
/// Each variant carries the data it was built from and, once applied, the
/// pre-image needed to revert exactly that application. `undo` is only
/// meaningful right after a successful `apply` of the same instance; it is a
/// no-op otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenCell {
        target: Coordinate,
        previous: Option<CellState>,
    },
    /// Overwrites a cell regardless of the game rules. Used by item scripts.
    SetCellStatus {
        target: Coordinate,
        status: CellState,
        previous: Option<CellState>,
    },
    Shoot {
        target: Coordinate,
        previous: Option<CellState>,
    },
    PlaceShip {
        request: ShipRequest,
        placed: Option<Ship>,
    },
    RemoveShip {
        ship_id: ShipID,
        backup: Option<(Ship, Vec<CellState>)>,
    },
    /// Relocates a ship in one step. The destination is only checked for bounds.
    MoveShip {
        ship_id: ShipID,
        old_coords: Vec<Coordinate>,
        new_coords: Vec<Coordinate>,
        snapshot: Option<(Cells, Option<Vec<Coordinate>>)>,
    },
}

impl Command {
    pub fn open_cell(x: i32, y: i32) -> Self {
        Command::OpenCell {
            target: Coordinate::new(x, y),
            previous: None,
        }
    }

    pub fn set_cell_status(x: i32, y: i32, status: CellState) -> Self {
        Command::SetCellStatus {
            target: Coordinate::new(x, y),
            status,
            previous: None,
        }
    }

    pub fn shoot(x: i32, y: i32) -> Self {
        Command::Shoot {
            target: Coordinate::new(x, y),
            previous: None,
        }
    }

    pub fn place_ship(request: ShipRequest) -> Self {
        Command::PlaceShip {
            request,
            placed: None,
        }
    }

    pub fn remove_ship(ship_id: ShipID) -> Self {
        Command::RemoveShip {
            ship_id,
            backup: None,
        }
    }

    pub fn move_ship(
        ship_id: ShipID,
        old_coords: Vec<Coordinate>,
        new_coords: Vec<Coordinate>,
    ) -> Self {
        Command::MoveShip {
            ship_id,
            old_coords,
            new_coords,
            snapshot: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::OpenCell { .. } => "OpenCell",
            Command::SetCellStatus { .. } => "SetCellStatus",
            Command::Shoot { .. } => "Shoot",
            Command::PlaceShip { .. } => "PlaceShip",
            Command::RemoveShip { .. } => "RemoveShip",
            Command::MoveShip { .. } => "MoveShip",
        }
    }

    /// The ship registered by a successfully applied `PlaceShip`.
    pub fn placed_ship(&self) -> Option<&Ship> {
        match self {
            Command::PlaceShip { placed, .. } => placed.as_ref(),
            _ => None,
        }
    }

    pub fn apply(&mut self, state: &mut GridState) -> Result<(), CommandError> {
        trace!("apply {:?}", self);

        match self {
            Command::OpenCell { target, previous } => {
                let before = state
                    .open_cell(*target)
                    .ok_or(ValidationError::OutOfBounds(*target))?;
                *previous = Some(before);
            }
            Command::SetCellStatus {
                target,
                status,
                previous,
            } => {
                let before = state
                    .cell(*target)
                    .ok_or(ValidationError::OutOfBounds(*target))?;
                state.set_cell(*target, *status);
                *previous = Some(before);
            }
            Command::Shoot { target, previous } => {
                let before = state
                    .cell(*target)
                    .ok_or(ValidationError::OutOfBounds(*target))?;
                let after = match before {
                    CellState::Empty => CellState::Miss,
                    CellState::ShipCell => CellState::Hit,
                    _ => return Err(StateError::AlreadyShot(*target).into()),
                };
                state.set_cell(*target, after);
                state.shots_made.push(*target);
                *previous = Some(before);
            }
            Command::PlaceShip { request, placed } => {
                let ship_type = validate_placement(state, request)?;
                let ship = Ship {
                    id: state.next_ship_id(),
                    ship_type,
                    coords: request.coords.clone(),
                };
                for c in &ship.coords {
                    state.set_cell(*c, CellState::ShipCell);
                }
                state.ships.insert(ship.id, ship.clone());
                *placed = Some(ship);
            }
            Command::RemoveShip { ship_id, backup } => {
                let ship = state
                    .ships
                    .remove(ship_id)
                    .ok_or(StateError::ShipNotFound(*ship_id))?;
                let cells = ship
                    .coords
                    .iter()
                    .map(|c| {
                        let before = state.cell(*c).unwrap_or_default();
                        state.set_cell(*c, CellState::Empty);
                        before
                    })
                    .collect();
                *backup = Some((ship, cells));
            }
            Command::MoveShip {
                ship_id,
                old_coords,
                new_coords,
                snapshot,
            } => {
                if let Some(c) = new_coords
                    .iter()
                    .chain(old_coords.iter())
                    .find(|c| !GridState::is_inside(**c))
                {
                    return Err(ValidationError::OutOfBounds(*c).into());
                }

                let cells = state.cells;
                for c in old_coords.iter() {
                    state.set_cell(*c, CellState::Empty);
                }
                for c in new_coords.iter() {
                    state.set_cell(*c, CellState::ShipCell);
                }
                let previous_coords = state
                    .ships
                    .get_mut(ship_id)
                    .map(|ship| std::mem::replace(&mut ship.coords, new_coords.clone()));
                *snapshot = Some((cells, previous_coords));
            }
        }

        Ok(())
    }

    pub fn undo(&mut self, state: &mut GridState) {
        trace!("undo {}", self.name());

        match self {
            Command::OpenCell { target, previous }
            | Command::SetCellStatus {
                target, previous, ..
            } => {
                if let Some(before) = previous.take() {
                    state.set_cell(*target, before);
                }
            }
            Command::Shoot { target, previous } => {
                if let Some(before) = previous.take() {
                    state.set_cell(*target, before);
                    if state.shots_made.last() == Some(&*target) {
                        state.shots_made.pop();
                    } else {
                        warn!("shot log tail does not match {target}, log left untouched");
                    }
                }
            }
            Command::PlaceShip { placed, .. } => {
                if let Some(ship) = placed.take() {
                    for c in &ship.coords {
                        state.set_cell(*c, CellState::Empty);
                    }
                    state.ships.remove(&ship.id);
                    if state.last_ship_id == ship.id {
                        state.last_ship_id -= 1;
                    }
                }
            }
            Command::RemoveShip { backup, .. } => {
                if let Some((ship, cells)) = backup.take() {
                    for (c, before) in ship.coords.iter().zip(cells) {
                        state.set_cell(*c, before);
                    }
                    state.ships.insert(ship.id, ship);
                }
            }
            Command::MoveShip {
                ship_id, snapshot, ..
            } => {
                if let Some((cells, previous_coords)) = snapshot.take() {
                    state.cells = cells;
                    if let (Some(ship), Some(coords)) =
                        (state.ships.get_mut(ship_id), previous_coords)
                    {
                        ship.coords = coords;
                    }
                }
            }
        }
    }
}

/// Checks every placement rule in order and returns the resolved ship type.
fn validate_placement(
    state: &GridState,
    request: &ShipRequest,
) -> Result<ShipType, ValidationError> {
    let ship_type: ShipType = request.kind.parse()?;

    if request.coords.len() != ship_type.size() {
        return Err(ValidationError::WrongShipSize {
            kind: ship_type.to_string(),
            expected: ship_type.size(),
            actual: request.coords.len(),
        });
    }

    if state.count_of(ship_type) >= ship_type.max_count() {
        return Err(ValidationError::ShipLimitReached {
            kind: ship_type.to_string(),
            max: ship_type.max_count(),
        });
    }

    if !GridState::is_straight_line(&request.coords) {
        return Err(ValidationError::NotStraightLine);
    }
    if !GridState::is_contiguous_run(&request.coords) {
        return Err(ValidationError::NotContiguous);
    }

    for c in &request.coords {
        if !GridState::is_inside(*c) {
            return Err(ValidationError::OutOfBounds(*c));
        }
        if !state.is_empty(*c) {
            return Err(ValidationError::CellOccupied(*c));
        }
    }

    if state.has_adjacent_ship(&request.coords) {
        return Err(ValidationError::AdjacentShip);
    }

    Ok(ship_type)
}
