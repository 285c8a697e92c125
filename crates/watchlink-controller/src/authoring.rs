//! Rules for turning sign text into a link.

use std::fmt;

use watchlink_types::{BlockFace, BlockKind, Coordinate, Link};

use crate::event::Verdict;
use crate::host::World;

/// Smallest accepted range. A range of one would watch the sign itself.
pub const MIN_RANGE: i32 = 2;

/// Blocks per chunk, to convert a simulation radius into a range bound.
pub const BLOCKS_PER_CHUNK: i64 = 16;

/// The range a sign asks for: the largest line that parses as an integer.
///
/// Lines are parsed as written, so padded numbers do not count. Returns
/// `None` when no line parses.
pub fn parse_range<S: AsRef<str>>(lines: &[S]) -> Option<i32> {
    lines
        .iter()
        .filter_map(|line| line.as_ref().parse::<i32>().ok())
        .max()
}

/// Largest range allowed for a simulation radius given in chunks.
pub fn max_range(simulation_radius: u32) -> i64 {
    i64::from(simulation_radius) * BLOCKS_PER_CHUNK
}

/// Why a sign edit did not produce a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthoringRejection {
    NotWallSign { kind: BlockKind },
    SignFacing { facing: Option<BlockFace> },
    NoObserver { behind: Coordinate, kind: BlockKind },
    ObserverFacing { facing: Option<BlockFace> },
    NoRange,
    RangeTooShort { range: i32 },
    RangeTooLong { range: i32, max: i64 },
    /// Walking `distance` along `face` from `from` leaves the coordinate range.
    OutOfWorld {
        from: Coordinate,
        face: BlockFace,
        distance: i32,
    },
}

fn facing_name(facing: &Option<BlockFace>) -> String {
    facing.map_or_else(|| "NONE".to_string(), |face| face.to_string())
}

impl fmt::Display for AuthoringRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotWallSign { kind } => write!(f, "not a wall sign: {kind}"),
            Self::SignFacing { facing } => write!(f, "wrong sign facing: {}", facing_name(facing)),
            Self::NoObserver { behind, kind } => {
                write!(f, "no observer behind sign: {kind}[{behind}]")
            }
            Self::ObserverFacing { facing } => {
                write!(f, "wrong observer facing: {}", facing_name(facing))
            }
            Self::NoRange => write!(f, "no range on sign"),
            Self::RangeTooShort { range } => write!(f, "too short range: {range}"),
            Self::RangeTooLong { range, max } => write!(f, "too long range: {range} > {max}"),
            Self::OutOfWorld {
                from,
                face,
                distance,
            } => write!(f, "out of world: {distance} x {face} from {from}"),
        }
    }
}

/// A sign edit that passed every check, ready to be stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub link: Link,
    pub range: i32,
}

/// Validate a sign edit against the world and compute the link it asks for.
///
/// The sign must hang on a horizontal face with an observer directly behind
/// it. The observer must face along one axis. The range must fall within
/// `MIN_RANGE..=max_range(simulation_radius)`.
pub fn evaluate<W: World + ?Sized>(
    world: &W,
    sign: &Coordinate,
    lines: &[String],
    simulation_radius: u32,
) -> Result<Candidate, AuthoringRejection> {
    let sign_state = world.block_at(sign);
    if !sign_state.is_wall_sign() {
        return Err(AuthoringRejection::NotWallSign {
            kind: sign_state.kind,
        });
    }
    let sign_facing = match sign_state.facing {
        Some(face) if face.is_horizontal_axis() => face,
        facing => return Err(AuthoringRejection::SignFacing { facing }),
    };

    let observer = walk(sign, sign_facing.opposite(), 1)?;
    let observer_state = world.block_at(&observer);
    if !observer_state.is_observer() {
        return Err(AuthoringRejection::NoObserver {
            behind: observer,
            kind: observer_state.kind,
        });
    }
    let observer_facing = match observer_state.facing {
        Some(face) if face.is_axis_aligned() => face,
        facing => return Err(AuthoringRejection::ObserverFacing { facing }),
    };

    let range = parse_range(lines).ok_or(AuthoringRejection::NoRange)?;
    if range < MIN_RANGE {
        return Err(AuthoringRejection::RangeTooShort { range });
    }
    let max = max_range(simulation_radius);
    if i64::from(range) > max {
        return Err(AuthoringRejection::RangeTooLong { range, max });
    }

    let target = walk(&observer, observer_facing, range)?;
    Ok(Candidate {
        link: Link::new(observer, sign.clone(), target),
        range,
    })
}

fn walk(
    from: &Coordinate,
    face: BlockFace,
    distance: i32,
) -> Result<Coordinate, AuthoringRejection> {
    from.relative(face, distance)
        .ok_or_else(|| AuthoringRejection::OutOfWorld {
            from: from.clone(),
            face,
            distance,
        })
}

/// Result of handling a sign edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthoringOutcome {
    /// A link was stored, replacing any previous link authored by the same sign.
    Linked(Link),
    /// The sign does not describe a link. The edit goes through untouched.
    Rejected(AuthoringRejection),
    /// The observer is already paired with a different sign.
    Conflict {
        observer: Coordinate,
        existing_sign: Coordinate,
    },
    /// Another observer already watches the computed target.
    TargetTaken {
        target: Coordinate,
        owner: Coordinate,
    },
    /// The sign is still recorded for a different observer.
    SignTaken {
        sign: Coordinate,
        owner: Coordinate,
    },
    /// The link was valid but could not be persisted.
    Failed(String),
}

impl AuthoringOutcome {
    /// Conflicts cancel the edit. Everything else lets it through.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Conflict { .. } | Self::TargetTaken { .. } | Self::SignTaken { .. } => {
                Verdict::Cancel
            }
            _ => Verdict::Proceed,
        }
    }
}
