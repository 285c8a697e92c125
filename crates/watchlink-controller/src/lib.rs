//! Link controller for watchlink.
//!
//! Turns host events into link changes and observer pulses. The host is
//! abstracted behind the [`Host`] trait so the same controller runs inside a
//! game server or inside the deterministic [`SimWorld`].
//!
//! # Modules
//!
//! - [`host`]: capabilities borrowed from the host world
//! - [`event`]: host events and the verdict handed back
//! - [`authoring`]: sign text and geometry rules
//! - [`pulse`]: two-phase pulse tasks
//! - [`controller`]: the [`LinkController`]
//! - [`config`]: `config.toml` loading
//! - [`plugin`]: enable, reload and disable around the controller
//! - [`sim`]: in-memory host

pub mod authoring;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod host;
pub mod plugin;
pub mod pulse;
pub mod sim;

pub use authoring::{parse_range, AuthoringOutcome, AuthoringRejection, Candidate};
pub use config::{WatchConfig, CONFIG_FILE_NAME};
pub use controller::{LinkController, MutationOutcome};
pub use error::{ConfigError, PluginError};
pub use event::{BlockChange, MutationSource, SignChange, Verdict, WorldEvent, WorldMutation};
pub use host::{Host, Messenger, TaskScheduler, World};
pub use plugin::WatchPlugin;
pub use pulse::{PulseOutcome, PulsePhase, PulseTask, PULSE_DELAY_TICKS, PULSE_LENGTH_TICKS};
pub use sim::{PowerChange, SimWorld};
