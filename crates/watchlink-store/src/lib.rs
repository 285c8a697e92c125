//! Link store for watchlink.
//!
//! The store owns the three-way mapping between observers, signs and targets.
//! Two relations are persisted (observer -> sign, observer -> target); the two
//! reverse maps are rebuilt by inversion on load and kept in step by every
//! mutation.
//!
//! # Architecture
//!
//! - [`LinkStore`] owns the four maps and exposes lookups plus `add`/`remove`.
//!   Every mutation is written through to the backend before it returns.
//! - A [`TableBackend`] stores each [`Relation`] as an ordered list of
//!   `(key, value)` text records. [`FileBackend`] keeps one text file per
//!   relation; [`InMemoryBackend`] is for tests.
//! - Loading is strict: malformed records, observer key sets that differ
//!   between the relations, and values that cannot be inverted are all fatal.
//!
//! # Modules
//!
//! - [`error`]: Error types for store operations
//! - [`relation`]: The two persisted relations
//! - [`traits`]: The [`TableBackend`] trait
//! - [`file`]: Crash-safe file-per-relation backend
//! - [`memory`]: In-memory backend
//! - [`store`]: The [`LinkStore`] itself

pub mod error;
pub mod file;
pub mod memory;
pub mod relation;
pub mod store;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::{FileBackend, SyncMode};
pub use memory::InMemoryBackend;
pub use relation::Relation;
pub use store::LinkStore;
pub use traits::{Record, TableBackend};
