use std::fmt;

/// One of the two persisted relations, both keyed by observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    /// observer -> sign
    Signs,
    /// observer -> target
    Targets,
}

impl Relation {
    /// File name of the relation's table inside a data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Relation::Signs => "signs.txt",
            Relation::Targets => "targets.txt",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Signs => write!(f, "signs"),
            Relation::Targets => write!(f, "targets"),
        }
    }
}
