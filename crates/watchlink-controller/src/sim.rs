//! A deterministic in-memory host for exercising the controller.
//!
//! [`SimWorld`] keeps a sparse block map and a tick-ordered task queue.
//! Tasks due on the same tick run in the order they were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use watchlink_types::{Actor, BlockState, Coordinate};

use crate::controller::LinkController;
use crate::host::{Host, Messenger, TaskScheduler, World};
use crate::pulse::PulseTask;

/// One observed power transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerChange {
    pub tick: u64,
    pub at: Coordinate,
    pub powered: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct Scheduled {
    due: u64,
    seq: u64,
    task: PulseTask,
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

#[derive(Debug)]
pub struct SimWorld {
    blocks: HashMap<Coordinate, BlockState>,
    simulation_radius: u32,
    tick: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
    messages: Vec<(String, String)>,
    broken: Vec<Coordinate>,
    power_log: Vec<PowerChange>,
}

impl SimWorld {
    pub fn new(simulation_radius: u32) -> Self {
        Self {
            blocks: HashMap::new(),
            simulation_radius,
            tick: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
            messages: Vec::new(),
            broken: Vec::new(),
            power_log: Vec::new(),
        }
    }

    /// Put a block in place without any bookkeeping.
    pub fn place(&mut self, at: Coordinate, state: BlockState) {
        if state == BlockState::air() {
            self.blocks.remove(&at);
        } else {
            self.blocks.insert(at, state);
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// `(actor name, text)` pairs in send order.
    pub fn messages(&self) -> &[(String, String)] {
        &self.messages
    }

    /// Coordinates destroyed through [`World::break_naturally`].
    pub fn broken(&self) -> &[Coordinate] {
        &self.broken
    }

    pub fn power_log(&self) -> &[PowerChange] {
        &self.power_log
    }

    /// Step `ticks` ticks, handing every due task to `controller`.
    pub fn advance(&mut self, ticks: u64, controller: &mut LinkController) {
        self.advance_with(ticks, |world, task| {
            controller.run_task(world, task);
        });
    }

    /// Step `ticks` ticks, handing every due task to `run`.
    pub fn advance_with<F>(&mut self, ticks: u64, mut run: F)
    where
        F: FnMut(&mut SimWorld, &PulseTask),
    {
        for _ in 0..ticks {
            self.tick += 1;
            while let Some(Reverse(next)) = self.queue.peek() {
                if next.due > self.tick {
                    break;
                }
                let Some(Reverse(due)) = self.queue.pop() else {
                    break;
                };
                run(self, &due.task);
            }
        }
    }
}

impl World for SimWorld {
    fn block_at(&self, at: &Coordinate) -> BlockState {
        self.blocks.get(at).cloned().unwrap_or_default()
    }

    fn set_block(&mut self, at: &Coordinate, state: BlockState) {
        let before = self.block_at(at);
        if before.powered != state.powered {
            self.power_log.push(PowerChange {
                tick: self.tick,
                at: at.clone(),
                powered: state.powered,
            });
        }
        self.place(at.clone(), state);
    }

    fn break_naturally(&mut self, at: &Coordinate) {
        self.blocks.remove(at);
        self.broken.push(at.clone());
    }
}

impl TaskScheduler for SimWorld {
    fn schedule(&mut self, task: PulseTask, delay_ticks: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            due: self.tick + delay_ticks,
            seq,
            task,
        }));
    }
}

impl Messenger for SimWorld {
    fn send_message(&mut self, actor: &Actor, message: &str) {
        self.messages.push((actor.name.clone(), message.to_string()));
    }
}

impl Host for SimWorld {
    fn max_simulation_radius(&self) -> u32 {
        self.simulation_radius
    }
}
