use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::game::ship::{Ship, ShipID, ShipType};
use crate::BOARD_SIZE;

pub type Cells = [[CellState; BOARD_SIZE as usize]; BOARD_SIZE as usize];

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Coordinate { x, y }
    }

    /// The four orthogonal neighbours, bounds not checked.
    /// Wraps at the i32 edges; a wrapped neighbour is never on the board.
    fn orthogonal(&self) -> [Coordinate; 4] {
        [
            Coordinate::new(self.x.wrapping_sub(1), self.y),
            Coordinate::new(self.x.wrapping_add(1), self.y),
            Coordinate::new(self.x, self.y.wrapping_sub(1)),
            Coordinate::new(self.x, self.y.wrapping_add(1)),
        ]
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Coordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Coordinate { x, y }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Empty,
    ShipCell,
    Miss,
    Hit,
    Revealed,
}

impl CellState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellState::Empty => "empty",
            CellState::ShipCell => "ship",
            CellState::Miss => "miss",
            CellState::Hit => "hit",
            CellState::Revealed => "revealed",
        }
    }

    fn symbol(&self) -> char {
        match self {
            CellState::Empty => '.',
            CellState::ShipCell => 'S',
            CellState::Miss => 'o',
            CellState::Hit => 'X',
            CellState::Revealed => '*',
        }
    }
}

/// One player's board: the cell matrix, the ship registry and the shot log.
///
/// Cells are indexed `[x][y]`. Everything outside of this crate only reads a
/// `GridState`; mutation goes through [`crate::game::command::Command`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridState {
    pub(crate) cells: Cells,
    pub(crate) ships: BTreeMap<ShipID, Ship>,
    pub(crate) shots_made: Vec<Coordinate>,
    pub(crate) last_ship_id: ShipID,
}

impl GridState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_inside(c: Coordinate) -> bool {
        (0..BOARD_SIZE).contains(&c.x) && (0..BOARD_SIZE).contains(&c.y)
    }

    pub fn is_empty(&self, c: Coordinate) -> bool {
        self.cell(c) == Some(CellState::Empty)
    }

    pub fn cell(&self, c: Coordinate) -> Option<CellState> {
        if Self::is_inside(c) {
            Some(self.cells[c.x as usize][c.y as usize])
        } else {
            None
        }
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    /// All coordinates share either their x or their y value.
    /// Contiguity is checked separately by [`GridState::is_contiguous_run`].
    pub fn is_straight_line(coords: &[Coordinate]) -> bool {
        let Some(first) = coords.first() else {
            return true;
        };
        coords.iter().all(|c| c.x == first.x) || coords.iter().all(|c| c.y == first.y)
    }

    /// Coordinates on one line that cover a gap-free run without duplicates.
    pub fn is_contiguous_run(coords: &[Coordinate]) -> bool {
        if !Self::is_straight_line(coords) {
            return false;
        }
        let mut along: Vec<i32> = match coords.first() {
            None => return true,
            Some(first) if coords.iter().all(|c| c.x == first.x) => {
                coords.iter().map(|c| c.y).collect()
            }
            Some(_) => coords.iter().map(|c| c.x).collect(),
        };
        along.sort_unstable();
        along.windows(2).all(|w| w[1].checked_sub(w[0]) == Some(1))
    }

    /// In-bounds orthogonal neighbours of `coords`, excluding `coords` themselves.
    pub fn neighbors(coords: &[Coordinate]) -> BTreeSet<Coordinate> {
        coords
            .iter()
            .flat_map(Coordinate::orthogonal)
            .filter(|c| Self::is_inside(*c) && !coords.contains(c))
            .collect()
    }

    pub fn has_adjacent_ship(&self, coords: &[Coordinate]) -> bool {
        Self::neighbors(coords)
            .into_iter()
            .any(|c| matches!(self.cell(c), Some(CellState::ShipCell | CellState::Hit)))
    }

    /// Reveals an empty cell. Any other cell is left untouched.
    /// Returns the state the cell had before the call; out of bounds yields `None`.
    pub(crate) fn open_cell(&mut self, c: Coordinate) -> Option<CellState> {
        let previous = self.cell(c)?;
        if previous == CellState::Empty {
            self.set_cell(c, CellState::Revealed);
        }
        Some(previous)
    }

    pub(crate) fn set_cell(&mut self, c: Coordinate, state: CellState) {
        self.cells[c.x as usize][c.y as usize] = state;
    }

    pub(crate) fn next_ship_id(&mut self) -> ShipID {
        self.last_ship_id += 1;
        self.last_ship_id
    }

    pub fn ship(&self, id: ShipID) -> Option<&Ship> {
        self.ships.get(&id)
    }

    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.values()
    }

    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    pub fn count_of(&self, ship_type: ShipType) -> usize {
        self.ships.values().filter(|s| s.ship_type == ship_type).count()
    }

    /// The ship with the lowest id covering `c`.
    pub fn ship_at(&self, c: Coordinate) -> Option<&Ship> {
        self.ships.values().find(|s| s.coords.contains(&c))
    }

    pub fn shots_made(&self) -> &[Coordinate] {
        &self.shots_made
    }

    /// Number of registered ship cells that have not been hit yet.
    pub fn surviving_ship_cells(&self) -> usize {
        self.ships
            .values()
            .flat_map(|s| s.coords.iter())
            .filter(|c| self.cell(**c) == Some(CellState::ShipCell))
            .count()
    }
}

impl Display for GridState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "  ")?;
        for x in 0..BOARD_SIZE {
            write!(f, " {x}")?;
        }
        writeln!(f)?;
        for y in 0..BOARD_SIZE {
            write!(f, "{y} ")?;
            for x in 0..BOARD_SIZE {
                write!(f, " {}", self.cells[x as usize][y as usize].symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
