//! Capabilities the controller consumes from the host world.
//!
//! The controller never owns the world. Every handler borrows a [`Host`] for
//! the duration of one event or one scheduled task, which matches the host's
//! single-threaded tick loop.

use watchlink_types::{Actor, BlockState, Coordinate};

use crate::pulse::PulseTask;

/// Block queries and mutations.
pub trait World {
    /// Current state of the block at `at`. Unloaded or empty positions
    /// report [`BlockState::air`].
    fn block_at(&self, at: &Coordinate) -> BlockState;

    /// Replace the block state at `at`.
    fn set_block(&mut self, at: &Coordinate, state: BlockState);

    /// Destroy the block at `at` as if mined, dropping its item.
    fn break_naturally(&mut self, at: &Coordinate);
}

/// Tick-based deferred execution.
///
/// The host hands each task back through
/// [`LinkController::run_task`](crate::LinkController::run_task) once
/// `delay_ticks` ticks have passed. Scheduled tasks are never cancelled.
pub trait TaskScheduler {
    fn schedule(&mut self, task: PulseTask, delay_ticks: u64);
}

/// Chat-style feedback to the player behind an event.
pub trait Messenger {
    fn send_message(&mut self, actor: &Actor, message: &str);
}

/// Everything the controller needs from its host.
pub trait Host: World + TaskScheduler + Messenger {
    /// Simulation radius in chunks (16 blocks each). Bounds the link range.
    fn max_simulation_radius(&self) -> u32;
}
