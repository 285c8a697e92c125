//! Block snapshots as reported by the host world.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::face::BlockFace;

/// The block types watchlink distinguishes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Empty space.
    Air,
    /// A trigger-capable block: it faces a direction and carries a powered flag.
    Observer,
    /// A sign-capable block attached to the side of another block.
    WallSign,
    /// Any other material, by host name.
    Other(String),
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Air => write!(f, "AIR"),
            Self::Observer => write!(f, "OBSERVER"),
            Self::WallSign => write!(f, "WALL_SIGN"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Snapshot of one block's type, orientation and powered flag.
///
/// `facing` is `None` for blocks without orientation. For a wall sign the
/// facing points away from the block it hangs on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    pub kind: BlockKind,
    pub facing: Option<BlockFace>,
    pub powered: bool,
}

impl BlockState {
    pub fn air() -> Self {
        Self {
            kind: BlockKind::Air,
            facing: None,
            powered: false,
        }
    }

    /// An unpowered observer facing `facing`.
    pub fn observer(facing: BlockFace) -> Self {
        Self {
            kind: BlockKind::Observer,
            facing: Some(facing),
            powered: false,
        }
    }

    /// A wall sign whose front faces `facing`.
    pub fn wall_sign(facing: BlockFace) -> Self {
        Self {
            kind: BlockKind::WallSign,
            facing: Some(facing),
            powered: false,
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Other(name.into()),
            facing: None,
            powered: false,
        }
    }

    pub fn is_observer(&self) -> bool {
        self.kind == BlockKind::Observer
    }

    pub fn is_wall_sign(&self) -> bool {
        self.kind == BlockKind::WallSign
    }

    /// This state with the powered flag replaced.
    pub fn with_powered(mut self, powered: bool) -> Self {
        self.powered = powered;
        self
    }
}

impl Default for BlockState {
    fn default() -> Self {
        Self::air()
    }
}

/// A block state pinned to its coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub at: Coordinate,
    pub state: BlockState,
}

impl Block {
    pub fn new(at: Coordinate, state: BlockState) -> Self {
        Self { at, state }
    }
}

/// Renders `KIND[world:x:y:z]`.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.state.kind, self.at)
    }
}
