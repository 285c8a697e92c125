use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::face::BlockFace;

/// Separator between the four parts of a coordinate token.
pub const TOKEN_DELIMITER: char = ':';

/// Characters a world name may not contain, so a token round-trips through
/// `key=value` records without ambiguity.
const FORBIDDEN_WORLD_CHARS: &[char] = &[TOKEN_DELIMITER, '='];

/// One block position: a world name plus three integer axes.
///
/// Equality, ordering and hashing are by value. The persisted and displayed
/// form is the token `world:x:y:z`.
///
/// # Examples
///
/// ```
/// use watchlink_types::Coordinate;
///
/// let c: Coordinate = "overworld:10:64:-3".parse().unwrap();
/// assert_eq!(c.y(), 64);
/// assert_eq!(c.to_string(), "overworld:10:64:-3");
/// assert!("overworld:10:64".parse::<Coordinate>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    world: String,
    x: i32,
    y: i32,
    z: i32,
}

impl Coordinate {
    /// Build a coordinate, validating the world name.
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Result<Self, TypeError> {
        let world = world.into();
        validate_world_name(&world)?;
        Ok(Self { world, x, y, z })
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    /// The coordinate `distance` steps away along `face`, in the same world.
    ///
    /// Negative distances walk against the face. Returns `None` when any axis
    /// would leave the `i32` range.
    pub fn relative(&self, face: BlockFace, distance: i32) -> Option<Coordinate> {
        let (dx, dy, dz) = face.offsets();
        let step = |axis: i32, offset: i32| offset.checked_mul(distance)?.checked_add(axis);
        Some(Coordinate {
            world: self.world.clone(),
            x: step(self.x, dx)?,
            y: step(self.y, dy)?,
            z: step(self.z, dz)?,
        })
    }
}

/// Validate a world name for use in a coordinate token.
pub fn validate_world_name(name: &str) -> Result<(), TypeError> {
    if name.is_empty() {
        return Err(TypeError::InvalidWorldName {
            name: name.to_string(),
            reason: "world name must not be empty".into(),
        });
    }
    for ch in FORBIDDEN_WORLD_CHARS {
        if name.contains(*ch) {
            return Err(TypeError::InvalidWorldName {
                name: name.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TypeError::InvalidWorldName {
            name: name.to_string(),
            reason: "must not contain whitespace or control characters".into(),
        });
    }
    Ok(())
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.world,
            self.x,
            self.y,
            self.z,
            d = TOKEN_DELIMITER
        )
    }
}

impl FromStr for Coordinate {
    type Err = TypeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| TypeError::MalformedCoordinate {
            raw: raw.to_string(),
            reason,
        };

        let parts: Vec<&str> = raw.split(TOKEN_DELIMITER).collect();
        if parts.len() != 4 {
            return Err(malformed(format!("expected 4 parts, got {}", parts.len())));
        }

        let axis = |part: &str| {
            part.parse::<i32>()
                .map_err(|e| malformed(format!("axis {part:?} is not an integer: {e}")))
        };
        let (x, y, z) = (axis(parts[1])?, axis(parts[2])?, axis(parts[3])?);

        Coordinate::new(parts[0], x, y, z).map_err(|e| malformed(e.to_string()))
    }
}

impl TryFrom<String> for Coordinate {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.to_string()
    }
}
