//! Foundation types for watchlink.
//!
//! This crate provides the value types shared by the link store and the link
//! controller. Every other watchlink crate depends on `watchlink-types`.
//!
//! # Key Types
//!
//! - [`Coordinate`]: One block position: world name plus three integer axes
//! - [`BlockFace`]: The host's face vocabulary with per-axis offsets
//! - [`BlockState`]: Snapshot of a block's kind, facing and powered flag
//! - [`Block`]: A block state pinned to a coordinate
//! - [`Actor`]: The player that initiated an event
//! - [`Link`]: The `(observer, sign, target)` triple watchlink manages

pub mod actor;
pub mod block;
pub mod coordinate;
pub mod error;
pub mod face;
pub mod link;

pub use actor::Actor;
pub use block::{Block, BlockKind, BlockState};
pub use coordinate::Coordinate;
pub use error::TypeError;
pub use face::BlockFace;
pub use link::Link;
