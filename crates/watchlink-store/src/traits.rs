//! The [`TableBackend`] trait defining where relations are persisted.

use crate::error::Result;
use crate::relation::Relation;

/// One persisted `(key, value)` pair of coordinate tokens.
pub type Record = (String, String);

/// Durable storage for the two link relations.
///
/// A backend never interprets the tokens it stores; parsing and integrity
/// checks belong to the [`LinkStore`](crate::LinkStore). Implementations must
/// replace a table as a whole, so a reader sees either the previous or the
/// new record set, never a mix.
pub trait TableBackend: Send {
    /// Read every record of a relation in stored order.
    ///
    /// A relation that has never been written reads as empty.
    fn read_table(&self, relation: Relation) -> Result<Vec<Record>>;

    /// Replace the relation's records with `records`.
    fn write_table(&mut self, relation: Relation, records: &[Record]) -> Result<()>;
}
