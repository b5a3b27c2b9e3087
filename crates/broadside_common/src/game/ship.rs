use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::grid::Coordinate;
use crate::game::ValidationError;

pub type ShipID = u32;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipType {
    Battleship,
    Cruiser,
    Destroyer,
    Submarine,
}

impl ShipType {
    pub const ALL: [ShipType; 4] = [
        ShipType::Battleship,
        ShipType::Cruiser,
        ShipType::Destroyer,
        ShipType::Submarine,
    ];

    pub fn size(&self) -> usize {
        match self {
            ShipType::Battleship => 4,
            ShipType::Cruiser => 3,
            ShipType::Destroyer => 2,
            ShipType::Submarine => 1,
        }
    }

    /// How many ships of this type a single board may hold.
    pub fn max_count(&self) -> usize {
        match self {
            ShipType::Battleship => 1,
            ShipType::Cruiser => 2,
            ShipType::Destroyer => 3,
            ShipType::Submarine => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipType::Battleship => "battleship",
            ShipType::Cruiser => "cruiser",
            ShipType::Destroyer => "destroyer",
            ShipType::Submarine => "submarine",
        }
    }
}

impl Display for ShipType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidShipType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipID,
    #[serde(rename = "type")]
    pub ship_type: ShipType,
    pub coords: Vec<Coordinate>,
}

/// A ship as sent by a client for placement.
///
/// The type is kept as raw text so an unknown type is reported by the placement
/// itself, and the id is never used: ids are assigned by the board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipRequest {
    #[serde(default)]
    pub id: Option<ShipID>,
    #[serde(rename = "type")]
    pub kind: String,
    pub coords: Vec<Coordinate>,
}

impl ShipRequest {
    pub fn new(ship_type: ShipType, coords: &[(i32, i32)]) -> Self {
        ShipRequest {
            id: None,
            kind: ship_type.as_str().to_string(),
            coords: coords.iter().copied().map(Coordinate::from).collect(),
        }
    }
}
