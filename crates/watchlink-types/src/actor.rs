use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// The identifiable player behind an event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    /// Where the actor stood when the event fired.
    pub location: Coordinate,
}

impl Actor {
    pub fn new(name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// Renders `name[world:x:y:z]`.
impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.location)
    }
}
