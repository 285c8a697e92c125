use std::fmt;

use watchlink_types::{Actor, Coordinate};

/// Text written onto a sign-capable block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignChange {
    pub sign: Coordinate,
    pub lines: Vec<String>,
    pub actor: Actor,
}

/// What removed or displaced a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationSource {
    /// Mined by a player.
    Broken { actor: Actor },
    /// Caught in an explosion started by a block.
    BlockExplosion,
    /// Caught in an explosion started by an entity.
    EntityExplosion,
    /// Pushed by an extending piston.
    PistonExtend,
    /// Pulled by a retracting piston.
    PistonRetract,
}

impl MutationSource {
    /// Whether an identifiable player initiated the mutation.
    pub fn has_actor(&self) -> bool {
        matches!(self, Self::Broken { .. })
    }

    /// Whether the mutation arrived as part of a list of blocks.
    pub fn is_batched(&self) -> bool {
        !matches!(self, Self::Broken { .. })
    }

    /// Direct breakage: the only source that also destroys the paired sign
    /// of a broken observer.
    pub fn is_direct_breakage(&self) -> bool {
        self.has_actor() && !self.is_batched()
    }
}

impl fmt::Display for MutationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broken { actor } => write!(f, "{actor}"),
            Self::BlockExplosion => write!(f, "block explosion"),
            Self::EntityExplosion => write!(f, "entity explosion"),
            Self::PistonExtend => write!(f, "piston extension"),
            Self::PistonRetract => write!(f, "piston retraction"),
        }
    }
}

/// One coordinate removed or displaced from the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldMutation {
    pub coordinate: Coordinate,
    pub source: MutationSource,
}

/// A block reported a state change in its neighbourhood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockChange {
    /// The block being notified.
    pub block: Coordinate,
    /// Where the change originated.
    pub source: Coordinate,
}

impl BlockChange {
    /// The change originated at the reporting block itself.
    pub fn is_direct(&self) -> bool {
        self.block == self.source
    }
}

/// Every host event the controller consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    SignChanged(SignChange),
    BlockBroken { block: Coordinate, actor: Actor },
    BlockExploded { blocks: Vec<Coordinate> },
    EntityExploded { blocks: Vec<Coordinate> },
    PistonExtended { blocks: Vec<Coordinate> },
    PistonRetracted { blocks: Vec<Coordinate> },
    BlockChanged(BlockChange),
}

impl WorldEvent {
    /// The per-coordinate mutations carried by a breakage-style event.
    ///
    /// Empty for sign and change events.
    pub fn mutations(&self) -> Vec<WorldMutation> {
        let batch = |blocks: &[Coordinate], source: MutationSource| -> Vec<WorldMutation> {
            blocks
                .iter()
                .map(|coordinate| WorldMutation {
                    coordinate: coordinate.clone(),
                    source: source.clone(),
                })
                .collect()
        };
        match self {
            Self::BlockBroken { block, actor } => vec![WorldMutation {
                coordinate: block.clone(),
                source: MutationSource::Broken {
                    actor: actor.clone(),
                },
            }],
            Self::BlockExploded { blocks } => batch(blocks, MutationSource::BlockExplosion),
            Self::EntityExploded { blocks } => batch(blocks, MutationSource::EntityExplosion),
            Self::PistonExtended { blocks } => batch(blocks, MutationSource::PistonExtend),
            Self::PistonRetracted { blocks } => batch(blocks, MutationSource::PistonRetract),
            Self::SignChanged(_) | Self::BlockChanged(_) => Vec::new(),
        }
    }
}

/// Whether the host should let the upstream action go ahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32) -> Coordinate {
        Coordinate::new("world", x, 64, 0).unwrap()
    }

    fn steve() -> Actor {
        Actor::new("Steve", at(100))
    }

    #[test]
    fn direct_breakage_is_only_the_actor_source() {
        let broken = MutationSource::Broken { actor: steve() };
        assert!(broken.has_actor());
        assert!(!broken.is_batched());
        assert!(broken.is_direct_breakage());

        for source in [
            MutationSource::BlockExplosion,
            MutationSource::EntityExplosion,
            MutationSource::PistonExtend,
            MutationSource::PistonRetract,
        ] {
            assert!(!source.has_actor());
            assert!(source.is_batched());
            assert!(!source.is_direct_breakage());
        }
    }

    #[test]
    fn batched_events_expand_per_coordinate() {
        let event = WorldEvent::PistonExtended {
            blocks: vec![at(1), at(2), at(3)],
        };
        let mutations = event.mutations();
        assert_eq!(mutations.len(), 3);
        assert!(mutations
            .iter()
            .all(|m| m.source == MutationSource::PistonExtend));
        assert_eq!(mutations[2].coordinate, at(3));
    }

    #[test]
    fn non_breakage_events_carry_no_mutations() {
        let change = WorldEvent::BlockChanged(BlockChange {
            block: at(1),
            source: at(1),
        });
        assert!(change.mutations().is_empty());
    }

    #[test]
    fn change_direction_filter() {
        let direct = BlockChange {
            block: at(1),
            source: at(1),
        };
        let propagated = BlockChange {
            block: at(1),
            source: at(2),
        };
        assert!(direct.is_direct());
        assert!(!propagated.is_direct());
    }
}
