//! Two-phase pulse tasks.
//!
//! A detected change at a target schedules [`PulsePhase::Rise`] on the
//! paired observer. A rise that actually switches the observer on schedules
//! the matching [`PulsePhase::Fall`]. Tasks are plain data: the host queues
//! them and hands them back to the controller when they come due.

use std::fmt;

use watchlink_types::Coordinate;

/// Ticks between a detected change and the rising edge.
pub const PULSE_DELAY_TICKS: u64 = 2;

/// Ticks between the rising and the falling edge.
pub const PULSE_LENGTH_TICKS: u64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PulsePhase {
    /// Set the observer's powered flag.
    Rise,
    /// Clear it again.
    Fall,
}

impl PulsePhase {
    /// The powered flag this phase drives the observer to.
    pub fn powered(self) -> bool {
        matches!(self, Self::Rise)
    }
}

impl fmt::Display for PulsePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rise => write!(f, "rise"),
            Self::Fall => write!(f, "fall"),
        }
    }
}

/// One deferred power transition for an observer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PulseTask {
    pub observer: Coordinate,
    pub phase: PulsePhase,
}

impl PulseTask {
    pub fn rise(observer: Coordinate) -> Self {
        Self {
            observer,
            phase: PulsePhase::Rise,
        }
    }

    pub fn fall(observer: Coordinate) -> Self {
        Self {
            observer,
            phase: PulsePhase::Fall,
        }
    }

    /// The follow-up task and its delay, if this phase has one.
    pub fn follow_up(&self) -> Option<(PulseTask, u64)> {
        match self.phase {
            PulsePhase::Rise => Some((Self::fall(self.observer.clone()), PULSE_LENGTH_TICKS)),
            PulsePhase::Fall => None,
        }
    }
}

impl fmt::Display for PulseTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.phase, self.observer)
    }
}

/// What running a [`PulseTask`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseOutcome {
    /// The observer's powered flag was switched to `powered`.
    Switched { powered: bool },
    /// The observer already had the flag this phase drives.
    Unchanged,
    /// No observer at the task's coordinate any more.
    ObserverMissing,
}
