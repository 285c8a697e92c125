use std::fmt;

use serde::{Deserialize, Serialize};

/// A direction a block can face, as reported by the host.
///
/// The host vocabulary is wider than the six axis directions: signs may be
/// rotated onto diagonals and secondary winds, and `Self_` denotes no offset
/// at all. Only [`is_axis_aligned`](Self::is_axis_aligned) faces can carry a
/// link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockFace {
    North,
    East,
    South,
    West,
    Up,
    Down,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
    WestNorthWest,
    NorthNorthWest,
    NorthNorthEast,
    EastNorthEast,
    EastSouthEast,
    SouthSouthEast,
    SouthSouthWest,
    WestSouthWest,
    #[serde(rename = "Self")]
    Self_,
}

impl BlockFace {
    /// The six axis-aligned unit directions.
    pub const AXES: [BlockFace; 6] = [
        BlockFace::North,
        BlockFace::East,
        BlockFace::South,
        BlockFace::West,
        BlockFace::Up,
        BlockFace::Down,
    ];

    /// Offset along the x axis for one step in this direction.
    pub fn mod_x(&self) -> i32 {
        self.offsets().0
    }

    /// Offset along the y axis for one step in this direction.
    pub fn mod_y(&self) -> i32 {
        self.offsets().1
    }

    /// Offset along the z axis for one step in this direction.
    pub fn mod_z(&self) -> i32 {
        self.offsets().2
    }

    /// `(x, y, z)` offsets for one step in this direction.
    pub fn offsets(&self) -> (i32, i32, i32) {
        match self {
            Self::North => (0, 0, -1),
            Self::East => (1, 0, 0),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::Up => (0, 1, 0),
            Self::Down => (0, -1, 0),
            Self::NorthEast => (1, 0, -1),
            Self::NorthWest => (-1, 0, -1),
            Self::SouthEast => (1, 0, 1),
            Self::SouthWest => (-1, 0, 1),
            Self::WestNorthWest => (-2, 0, -1),
            Self::NorthNorthWest => (-1, 0, -2),
            Self::NorthNorthEast => (1, 0, -2),
            Self::EastNorthEast => (2, 0, -1),
            Self::EastSouthEast => (2, 0, 1),
            Self::SouthSouthEast => (1, 0, 2),
            Self::SouthSouthWest => (-1, 0, 2),
            Self::WestSouthWest => (-2, 0, 1),
            Self::Self_ => (0, 0, 0),
        }
    }

    /// Returns `true` for exactly the six unit directions along one axis.
    pub fn is_axis_aligned(&self) -> bool {
        let (x, y, z) = self.offsets();
        x.abs() + y.abs() + z.abs() == 1
    }

    /// Returns `true` for the four axis-aligned horizontal directions.
    pub fn is_horizontal_axis(&self) -> bool {
        self.is_axis_aligned() && self.mod_y() == 0
    }

    /// The face pointing the other way.
    pub fn opposite(&self) -> BlockFace {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::NorthEast => Self::SouthWest,
            Self::NorthWest => Self::SouthEast,
            Self::SouthEast => Self::NorthWest,
            Self::SouthWest => Self::NorthEast,
            Self::WestNorthWest => Self::EastSouthEast,
            Self::NorthNorthWest => Self::SouthSouthEast,
            Self::NorthNorthEast => Self::SouthSouthWest,
            Self::EastNorthEast => Self::WestSouthWest,
            Self::EastSouthEast => Self::WestNorthWest,
            Self::SouthSouthEast => Self::NorthNorthWest,
            Self::SouthSouthWest => Self::NorthNorthEast,
            Self::WestSouthWest => Self::EastNorthEast,
            Self::Self_ => Self::Self_,
        }
    }
}

impl fmt::Display for BlockFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::North => "NORTH",
            Self::East => "EAST",
            Self::South => "SOUTH",
            Self::West => "WEST",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::NorthEast => "NORTH_EAST",
            Self::NorthWest => "NORTH_WEST",
            Self::SouthEast => "SOUTH_EAST",
            Self::SouthWest => "SOUTH_WEST",
            Self::WestNorthWest => "WEST_NORTH_WEST",
            Self::NorthNorthWest => "NORTH_NORTH_WEST",
            Self::NorthNorthEast => "NORTH_NORTH_EAST",
            Self::EastNorthEast => "EAST_NORTH_EAST",
            Self::EastSouthEast => "EAST_SOUTH_EAST",
            Self::SouthSouthEast => "SOUTH_SOUTH_EAST",
            Self::SouthSouthWest => "SOUTH_SOUTH_WEST",
            Self::WestSouthWest => "WEST_SOUTH_WEST",
            Self::Self_ => "SELF",
        };
        write!(f, "{s}")
    }
}
