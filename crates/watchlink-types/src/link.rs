use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// One managed link, keyed by its observer.
///
/// The sign names the link (its text carries the range) and the target is
/// the coordinate the observer watches.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub observer: Coordinate,
    pub sign: Coordinate,
    pub target: Coordinate,
}

impl Link {
    pub fn new(observer: Coordinate, sign: Coordinate, target: Coordinate) -> Self {
        Self {
            observer,
            sign,
            target,
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} (sign {})", self.observer, self.target, self.sign)
    }
}
