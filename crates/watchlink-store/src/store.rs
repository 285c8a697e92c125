//! The [`LinkStore`]: four interlocking maps behind one API.
//!
//! Forward maps (observer -> sign, observer -> target) are the persisted
//! truth. Reverse maps (sign -> observer, target -> observer) make every
//! lookup O(1) and are rebuilt by inversion whenever the store is opened.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};
use watchlink_types::{Coordinate, Link};

use crate::error::{Result, StoreError};
use crate::relation::Relation;
use crate::traits::{Record, TableBackend};

type Map = HashMap<Coordinate, Coordinate>;

/// Bidirectional observer/sign/target index with write-through persistence.
///
/// Invariants held between calls:
/// - every observer has exactly one sign and one target;
/// - a sign or target resolves to at most one observer;
/// - the backend holds the same link set as memory after every successful
///   `add`/`remove`.
pub struct LinkStore {
    signs: Map,
    signs_back: Map,
    targets: Map,
    targets_back: Map,
    backend: Box<dyn TableBackend>,
}

impl std::fmt::Debug for LinkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkStore")
            .field("links", &self.signs.len())
            .finish()
    }
}

impl LinkStore {
    /// Load both relations from `backend` and verify them.
    ///
    /// Fails on any malformed record, on observer key sets that differ
    /// between the relations, and on a value claimed by two observers.
    pub fn open(backend: impl TableBackend + 'static) -> Result<Self> {
        let targets = load_relation(&backend, Relation::Targets)?;
        let signs = load_relation(&backend, Relation::Signs)?;

        check_diff(Relation::Targets, &targets, Relation::Signs, &signs)?;
        check_diff(Relation::Signs, &signs, Relation::Targets, &targets)?;

        let targets_back = invert(Relation::Targets, &targets)?;
        let signs_back = invert(Relation::Signs, &signs)?;

        info!(links = signs.len(), "link store loaded");

        Ok(Self {
            signs,
            signs_back,
            targets,
            targets_back,
            backend: Box::new(backend),
        })
    }

    /// The sign owned by `observer`.
    pub fn sign_for(&self, observer: &Coordinate) -> Option<&Coordinate> {
        self.signs.get(observer)
    }

    /// The target watched by `observer`.
    pub fn target_for(&self, observer: &Coordinate) -> Option<&Coordinate> {
        self.targets.get(observer)
    }

    /// The observer that owns `sign`.
    pub fn observer_for_sign(&self, sign: &Coordinate) -> Option<&Coordinate> {
        self.signs_back.get(sign)
    }

    /// The observer watching `target`. Called on every world change.
    pub fn observer_for_target(&self, target: &Coordinate) -> Option<&Coordinate> {
        self.targets_back.get(target)
    }

    pub fn is_observer(&self, coordinate: &Coordinate) -> bool {
        self.targets.contains_key(coordinate)
    }

    /// The full link keyed by `observer`.
    pub fn link(&self, observer: &Coordinate) -> Option<Link> {
        let sign = self.signs.get(observer)?;
        let target = self.targets.get(observer)?;
        Some(Link::new(observer.clone(), sign.clone(), target.clone()))
    }

    /// Every link, ordered by observer.
    pub fn links(&self) -> Vec<Link> {
        let mut links: Vec<Link> = self.signs.keys().filter_map(|o| self.link(o)).collect();
        links.sort();
        links
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// Insert the link keyed by `observer`, replacing any link it had, then
    /// persist.
    ///
    /// A sign or target that already belongs to a different observer is
    /// refused and nothing changes.
    pub fn add(&mut self, observer: Coordinate, sign: Coordinate, target: Coordinate) -> Result<()> {
        if let Some(owner) = self.signs_back.get(&sign) {
            if *owner != observer {
                return Err(StoreError::SignClaimed {
                    sign,
                    owner: owner.clone(),
                });
            }
        }
        if let Some(owner) = self.targets_back.get(&target) {
            if *owner != observer {
                return Err(StoreError::TargetClaimed {
                    target,
                    owner: owner.clone(),
                });
            }
        }

        // Overwrite: the previous sign/target must stop resolving here.
        if let Some(old_sign) = self.signs.remove(&observer) {
            self.signs_back.remove(&old_sign);
        }
        if let Some(old_target) = self.targets.remove(&observer) {
            self.targets_back.remove(&old_target);
        }

        self.signs.insert(observer.clone(), sign.clone());
        self.signs_back.insert(sign, observer.clone());
        self.targets.insert(observer.clone(), target.clone());
        self.targets_back.insert(target, observer.clone());

        debug!(%observer, links = self.len(), "link stored");
        self.save()
    }

    /// Delete the link keyed by `observer`, then persist.
    ///
    /// Persists even when `observer` had no link. Returns the removed link.
    pub fn remove(&mut self, observer: &Coordinate) -> Result<Option<Link>> {
        let target = self.targets.remove(observer);
        if let Some(target) = &target {
            self.targets_back.remove(target);
        }
        let sign = self.signs.remove(observer);
        if let Some(sign) = &sign {
            self.signs_back.remove(sign);
        }

        self.save()?;

        Ok(match (sign, target) {
            (Some(sign), Some(target)) => Some(Link::new(observer.clone(), sign, target)),
            _ => None,
        })
    }

    /// Rewrite both relations in full.
    fn save(&mut self) -> Result<()> {
        self.backend
            .write_table(Relation::Targets, &to_records(&self.targets))?;
        self.backend
            .write_table(Relation::Signs, &to_records(&self.signs))?;
        Ok(())
    }
}

fn load_relation(backend: &dyn TableBackend, relation: Relation) -> Result<Map> {
    let mut map = Map::new();
    for (key, value) in backend.read_table(relation)? {
        let parse = |token: &str| {
            token
                .parse::<Coordinate>()
                .map_err(|source| StoreError::MalformedCoordinate { relation, source })
        };
        let observer = parse(&key)?;
        let value = parse(&value)?;
        if map.contains_key(&observer) {
            return Err(StoreError::DuplicateKey { relation, observer });
        }
        map.insert(observer, value);
    }
    Ok(map)
}

/// Fail if `set1` has observers that `set2` lacks.
fn check_diff(title1: Relation, set1: &Map, title2: Relation, set2: &Map) -> Result<()> {
    let diff: BTreeSet<&Coordinate> = set1.keys().filter(|k| !set2.contains_key(*k)).collect();
    if diff.is_empty() {
        return Ok(());
    }
    Err(StoreError::KeySetMismatch {
        present_in: title1,
        missing_from: title2,
        observers: diff.into_iter().cloned().collect(),
    })
}

fn invert(relation: Relation, map: &Map) -> Result<Map> {
    let mut entries: Vec<(&Coordinate, &Coordinate)> = map.iter().collect();
    entries.sort();

    let mut back = Map::with_capacity(map.len());
    for (observer, value) in entries {
        if let Some(first) = back.insert(value.clone(), observer.clone()) {
            return Err(StoreError::DuplicateInverse {
                relation,
                value: value.clone(),
                first,
                second: observer.clone(),
            });
        }
    }
    Ok(back)
}

fn to_records(map: &Map) -> Vec<Record> {
    let mut entries: Vec<(&Coordinate, &Coordinate)> = map.iter().collect();
    entries.sort();
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
