//! Error types for link store operations.

use thiserror::Error;
use watchlink_types::{Coordinate, TypeError};

use crate::relation::Relation;

/// Errors that can occur while loading, querying or persisting links.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Observers present in one relation but missing from the other.
    #[error("not empty {present_in} without {missing_from}: {}", join(.observers))]
    KeySetMismatch {
        present_in: Relation,
        missing_from: Relation,
        observers: Vec<Coordinate>,
    },

    /// Two observers claim the same value, so the relation cannot be inverted.
    #[error("duplicate {relation} value {value}: claimed by {first} and {second}")]
    DuplicateInverse {
        relation: Relation,
        value: Coordinate,
        first: Coordinate,
        second: Coordinate,
    },

    /// A persisted line that is not a `key=value` record.
    #[error("malformed {relation} record at line {line}: {raw:?}")]
    MalformedRecord {
        relation: Relation,
        line: usize,
        raw: String,
    },

    /// The same observer appears twice in one relation.
    #[error("duplicate {relation} key: {observer}")]
    DuplicateKey {
        relation: Relation,
        observer: Coordinate,
    },

    /// A record whose key or value is not a valid coordinate token.
    #[error("malformed {relation} record: {source}")]
    MalformedCoordinate {
        relation: Relation,
        #[source]
        source: TypeError,
    },

    /// The sign already belongs to another observer.
    #[error("sign {sign} already belongs to observer {owner}")]
    SignClaimed { sign: Coordinate, owner: Coordinate },

    /// The target is already watched by another observer.
    #[error("target {target} is already watched by observer {owner}")]
    TargetClaimed { target: Coordinate, owner: Coordinate },

    /// Backend failure that is not plain I/O.
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error during file-based persistence.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn join(coordinates: &[Coordinate]) -> String {
    let tokens: Vec<String> = coordinates.iter().map(ToString::to_string).collect();
    format!("[{}]", tokens.join(", "))
}

/// Convenience type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
