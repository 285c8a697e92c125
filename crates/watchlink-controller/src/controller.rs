//! The link controller: reacts to world events and drives observer pulses.
//!
//! [`LinkController`] owns the [`LinkStore`] and borrows a [`Host`] for each
//! call. It handles four kinds of input:
//!
//! - sign edits, which author or overwrite links
//! - block breaks, explosions and piston moves, which remove links
//! - neighbour changes at watched targets, which schedule a pulse
//! - pulse tasks coming back from the host scheduler
//!
//! Store failures never escape a handler. They are logged and reported
//! through the returned outcome, and the in-memory index keeps serving.

use tracing::{debug, error, info};
use watchlink_store::{LinkStore, StoreError};
use watchlink_types::{Actor, Block, Coordinate, Link};

use crate::authoring::{self, AuthoringOutcome};
use crate::event::{BlockChange, MutationSource, SignChange, Verdict, WorldEvent, WorldMutation};
use crate::host::Host;
use crate::pulse::{PulseOutcome, PulseTask, PULSE_DELAY_TICKS};

/// Result of applying one world mutation to the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// A linked sign went away. Its link was removed.
    Deactivated(Link),
    /// A linked observer went away. Its link was removed.
    Broken(Link),
    /// The coordinate is neither a linked sign nor a linked observer.
    Ignored,
    /// The link was dropped from memory but could not be persisted.
    Failed(String),
}

pub struct LinkController {
    store: LinkStore,
}

impl LinkController {
    pub fn new(store: LinkStore) -> Self {
        Self { store }
    }

    /// Read access to the link index.
    pub fn store(&self) -> &LinkStore {
        &self.store
    }

    /// Route a host event to its handler.
    pub fn handle<H: Host + ?Sized>(&mut self, host: &mut H, event: &WorldEvent) -> Verdict {
        match event {
            WorldEvent::SignChanged(change) => self.on_sign_change(host, change).verdict(),
            WorldEvent::BlockChanged(change) => {
                self.on_block_change(host, change);
                Verdict::Proceed
            }
            WorldEvent::BlockBroken { .. }
            | WorldEvent::BlockExploded { .. }
            | WorldEvent::EntityExploded { .. }
            | WorldEvent::PistonExtended { .. }
            | WorldEvent::PistonRetracted { .. } => {
                for mutation in event.mutations() {
                    self.apply_mutation(host, &mutation);
                }
                Verdict::Proceed
            }
        }
    }

    /// Author a link from a sign edit.
    ///
    /// Rejections are logged at debug level and let the edit through. A
    /// second sign on an already linked observer, a target already watched
    /// by another observer, or a sign still recorded for another observer
    /// cancels the edit and tells the actor.
    pub fn on_sign_change<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        change: &SignChange,
    ) -> AuthoringOutcome {
        let radius = host.max_simulation_radius();
        let candidate = match authoring::evaluate(&*host, &change.sign, &change.lines, radius) {
            Ok(candidate) => candidate,
            Err(reason) => {
                debug!(sign = %change.sign, actor = %change.actor, %reason, "sign ignored");
                return AuthoringOutcome::Rejected(reason);
            }
        };
        let Link {
            observer,
            sign,
            target,
        } = candidate.link;

        if let Some(existing) = self.store.sign_for(&observer) {
            if *existing != sign {
                let existing = existing.clone();
                let shown = Block::new(sign.clone(), host.block_at(&sign));
                host.send_message(&change.actor, &format!("Another sign already exists: {shown}"));
                info!(%observer, %existing, actor = %change.actor, "another sign already exists");
                return AuthoringOutcome::Conflict {
                    observer,
                    existing_sign: existing,
                };
            }
        }

        if let Some(owner) = self.store.observer_for_target(&target) {
            if *owner != observer {
                let owner = owner.clone();
                let shown = Block::new(owner.clone(), host.block_at(&owner));
                host.send_message(
                    &change.actor,
                    &format!("Target {target} is already watched by {shown}"),
                );
                info!(%target, %owner, actor = %change.actor, "target already watched");
                return AuthoringOutcome::TargetTaken { target, owner };
            }
        }

        let link = Link::new(observer.clone(), sign.clone(), target.clone());
        match self.store.add(observer.clone(), sign, target.clone()) {
            Ok(()) => {}
            Err(StoreError::SignClaimed { sign, owner }) => {
                let shown = Block::new(owner.clone(), host.block_at(&owner));
                host.send_message(
                    &change.actor,
                    &format!("Sign {sign} already belongs to {shown}"),
                );
                info!(%sign, %owner, actor = %change.actor, "sign already claimed");
                return AuthoringOutcome::SignTaken { sign, owner };
            }
            Err(StoreError::TargetClaimed { target, owner }) => {
                info!(%target, %owner, actor = %change.actor, "target already claimed");
                return AuthoringOutcome::TargetTaken { target, owner };
            }
            Err(e) => {
                error!(%link, error = %e, "failed to persist link");
                return AuthoringOutcome::Failed(e.to_string());
            }
        }

        let observer_block = Block::new(observer.clone(), host.block_at(&observer));
        let target_block = Block::new(target.clone(), host.block_at(&target));
        host.send_message(
            &change.actor,
            &format!("Aimed {observer_block} at {target_block}"),
        );
        info!(
            observer = %observer_block,
            target = %target_block,
            range = candidate.range,
            actor = %change.actor,
            "observer aimed"
        );
        AuthoringOutcome::Linked(link)
    }

    /// A player broke one block.
    pub fn on_block_broken<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        block: &Coordinate,
        actor: &Actor,
    ) -> MutationOutcome {
        self.apply_mutation(
            host,
            &WorldMutation {
                coordinate: block.clone(),
                source: MutationSource::Broken {
                    actor: actor.clone(),
                },
            },
        )
    }

    /// Blocks destroyed by an explosion, in event order.
    pub fn on_explosion<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        blocks: &[Coordinate],
        source: MutationSource,
    ) -> Vec<MutationOutcome> {
        self.apply_batch(host, blocks, source)
    }

    /// Blocks displaced by a piston, in event order.
    pub fn on_piston<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        blocks: &[Coordinate],
        source: MutationSource,
    ) -> Vec<MutationOutcome> {
        self.apply_batch(host, blocks, source)
    }

    fn apply_batch<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        blocks: &[Coordinate],
        source: MutationSource,
    ) -> Vec<MutationOutcome> {
        blocks
            .iter()
            .map(|coordinate| {
                self.apply_mutation(
                    host,
                    &WorldMutation {
                        coordinate: coordinate.clone(),
                        source: source.clone(),
                    },
                )
            })
            .collect()
    }

    /// Drop the link touched by one removed or displaced coordinate.
    ///
    /// A linked sign only deactivates its link. A linked observer removes
    /// its link, and on direct breakage the paired sign is broken first.
    pub fn apply_mutation<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        mutation: &WorldMutation,
    ) -> MutationOutcome {
        let at = &mutation.coordinate;

        if let Some(observer) = self.store.observer_for_sign(at).cloned() {
            return match self.store.remove(&observer) {
                Ok(Some(link)) => {
                    let shown = Block::new(observer, host.block_at(&link.observer));
                    info!(observer = %shown, by = %mutation.source, "deactivated");
                    MutationOutcome::Deactivated(link)
                }
                Ok(None) => MutationOutcome::Ignored,
                Err(e) => {
                    error!(%observer, error = %e, "failed to persist deactivation");
                    MutationOutcome::Failed(e.to_string())
                }
            };
        }

        if !self.store.is_observer(at) {
            return MutationOutcome::Ignored;
        }

        if mutation.source.is_direct_breakage() {
            if let Some(sign) = self.store.sign_for(at).cloned() {
                host.break_naturally(&sign);
            }
        }
        let shown = Block::new(at.clone(), host.block_at(at));
        match self.store.remove(at) {
            Ok(Some(link)) => {
                info!(observer = %shown, by = %mutation.source, "broken");
                MutationOutcome::Broken(link)
            }
            Ok(None) => MutationOutcome::Ignored,
            Err(e) => {
                error!(observer = %at, error = %e, "failed to persist removal");
                MutationOutcome::Failed(e.to_string())
            }
        }
    }

    /// Schedule a pulse when a watched target changes by itself.
    ///
    /// Returns `true` when a rise was scheduled.
    pub fn on_block_change<H: Host + ?Sized>(&mut self, host: &mut H, change: &BlockChange) -> bool {
        if !change.is_direct() {
            return false;
        }
        let Some(observer) = self.store.observer_for_target(&change.block).cloned() else {
            return false;
        };
        host.schedule(PulseTask::rise(observer), PULSE_DELAY_TICKS);
        debug!(
            block = %Block::new(change.block.clone(), host.block_at(&change.block)),
            "changed"
        );
        true
    }

    /// Run one pulse phase that came due.
    ///
    /// The observer is re-read from the world first. If it is gone the
    /// stale link is removed. The powered flag is only written when it
    /// differs, and only a rise that switched schedules the fall.
    pub fn run_task<H: Host + ?Sized>(&mut self, host: &mut H, task: &PulseTask) -> PulseOutcome {
        let state = host.block_at(&task.observer);
        if !state.is_observer() {
            error!(
                block = %Block::new(task.observer.clone(), state),
                phase = %task.phase,
                "no observer"
            );
            self.drop_stale(&task.observer);
            return PulseOutcome::ObserverMissing;
        }

        let powered = task.phase.powered();
        if state.powered == powered {
            return PulseOutcome::Unchanged;
        }
        let next = state.with_powered(powered);
        host.set_block(&task.observer, next.clone());
        debug!(block = %Block::new(task.observer.clone(), next), powered, "power set");

        if let Some((follow_up, delay)) = task.follow_up() {
            host.schedule(follow_up, delay);
        }
        PulseOutcome::Switched { powered }
    }

    fn drop_stale(&mut self, observer: &Coordinate) {
        if !self.store.is_observer(observer) {
            return;
        }
        match self.store.remove(observer) {
            Ok(_) => info!(%observer, "stale link removed"),
            Err(e) => error!(%observer, error = %e, "failed to persist stale link removal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use watchlink_store::{InMemoryBackend, Relation, Result as StoreResult, TableBackend};
    use watchlink_types::{BlockFace, BlockState};

    use super::*;
    use crate::authoring::AuthoringRejection;
    use crate::host::World;
    use crate::pulse::PulsePhase;
    use crate::sim::{PowerChange, SimWorld};

    const RADIUS: u32 = 4;

    fn at(x: i32, y: i32, z: i32) -> Coordinate {
        Coordinate::new("world", x, y, z).unwrap()
    }

    fn steve() -> Actor {
        Actor::new("Steve", at(5, 64, 5))
    }

    fn observer_pos() -> Coordinate {
        at(0, 64, 0)
    }

    /// Sign hanging on the east face of the observer.
    fn sign_pos() -> Coordinate {
        at(1, 64, 0)
    }

    fn edit(sign: &Coordinate, lines: &[&str]) -> SignChange {
        SignChange {
            sign: sign.clone(),
            lines: lines.iter().map(|line| line.to_string()).collect(),
            actor: steve(),
        }
    }

    fn controller() -> LinkController {
        LinkController::new(LinkStore::open(InMemoryBackend::new()).unwrap())
    }

    /// An observer looking north with a sign on its east face.
    fn rig() -> (SimWorld, LinkController) {
        let mut world = SimWorld::new(RADIUS);
        world.place(observer_pos(), BlockState::observer(BlockFace::North));
        world.place(sign_pos(), BlockState::wall_sign(BlockFace::East));
        (world, controller())
    }

    fn linked_rig(range: &str) -> (SimWorld, LinkController, Link) {
        let (mut world, mut controller) = rig();
        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &[range]));
        let AuthoringOutcome::Linked(link) = outcome else {
            panic!("expected a link, got {outcome:?}");
        };
        (world, controller, link)
    }

    fn change_at(target: &Coordinate) -> BlockChange {
        BlockChange {
            block: target.clone(),
            source: target.clone(),
        }
    }

    #[test]
    fn sign_edit_links_observer_to_target() {
        let (world, controller, link) = linked_rig("10");

        assert_eq!(link.observer, observer_pos());
        assert_eq!(link.sign, sign_pos());
        assert_eq!(link.target, at(0, 64, -10));
        assert_eq!(controller.store().link(&observer_pos()), Some(link));
        assert_eq!(
            world.messages(),
            &[(
                "Steve".to_string(),
                "Aimed OBSERVER[world:0:64:0] at AIR[world:0:64:-10]".to_string()
            )]
        );
    }

    #[test]
    fn largest_numeric_line_wins() {
        let (mut world, mut controller) = rig();
        let outcome = controller.on_sign_change(
            &mut world,
            &edit(&sign_pos(), &["2", "abc", "10", "not-a-number"]),
        );
        let AuthoringOutcome::Linked(link) = outcome else {
            panic!("expected a link, got {outcome:?}");
        };
        assert_eq!(link.target, at(0, 64, -10));
    }

    #[test]
    fn range_bounds() {
        let max = (RADIUS * 16) as i32;

        let (mut world, mut controller) = rig();
        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["1"]));
        assert_eq!(
            outcome,
            AuthoringOutcome::Rejected(AuthoringRejection::RangeTooShort { range: 1 })
        );

        let outcome =
            controller.on_sign_change(&mut world, &edit(&sign_pos(), &[&(max + 1).to_string()]));
        assert_eq!(
            outcome,
            AuthoringOutcome::Rejected(AuthoringRejection::RangeTooLong {
                range: max + 1,
                max: i64::from(max)
            })
        );
        assert!(controller.store().is_empty());

        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &[&max.to_string()]));
        let AuthoringOutcome::Linked(link) = outcome else {
            panic!("expected a link, got {outcome:?}");
        };
        assert_eq!(link.target, at(0, 64, -max));

        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["2"]));
        assert!(matches!(outcome, AuthoringOutcome::Linked(_)));
    }

    #[test]
    fn text_without_range_is_ignored() {
        let (mut world, mut controller) = rig();
        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["hello", "world"]));
        assert_eq!(outcome, AuthoringOutcome::Rejected(AuthoringRejection::NoRange));
        assert_eq!(outcome.verdict(), Verdict::Proceed);
        assert!(world.messages().is_empty());
    }

    #[test]
    fn sign_geometry_is_checked() {
        let (mut world, mut controller) = rig();

        let floating = at(10, 64, 10);
        world.place(floating.clone(), BlockState::wall_sign(BlockFace::East));
        let outcome = controller.on_sign_change(&mut world, &edit(&floating, &["5"]));
        assert!(matches!(
            outcome,
            AuthoringOutcome::Rejected(AuthoringRejection::NoObserver { .. })
        ));

        world.place(sign_pos(), BlockState::wall_sign(BlockFace::NorthEast));
        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["5"]));
        assert_eq!(
            outcome,
            AuthoringOutcome::Rejected(AuthoringRejection::SignFacing {
                facing: Some(BlockFace::NorthEast)
            })
        );

        world.place(sign_pos(), BlockState::other("OAK_SIGN"));
        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["5"]));
        assert!(matches!(
            outcome,
            AuthoringOutcome::Rejected(AuthoringRejection::NotWallSign { .. })
        ));
        assert!(controller.store().is_empty());
    }

    #[test]
    fn observer_must_face_an_axis() {
        let (mut world, mut controller) = rig();
        world.place(observer_pos(), BlockState::observer(BlockFace::Self_));

        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["5"]));
        assert_eq!(
            outcome,
            AuthoringOutcome::Rejected(AuthoringRejection::ObserverFacing {
                facing: Some(BlockFace::Self_)
            })
        );
    }

    #[test]
    fn second_sign_on_linked_observer_is_cancelled() {
        let (mut world, mut controller, link) = linked_rig("10");
        let other_sign = at(-1, 64, 0);
        world.place(other_sign.clone(), BlockState::wall_sign(BlockFace::West));

        let outcome = controller.on_sign_change(&mut world, &edit(&other_sign, &["20"]));
        assert_eq!(
            outcome,
            AuthoringOutcome::Conflict {
                observer: observer_pos(),
                existing_sign: sign_pos()
            }
        );
        assert_eq!(outcome.verdict(), Verdict::Cancel);
        assert_eq!(controller.store().link(&observer_pos()), Some(link));
        assert_eq!(
            world.messages().last().map(|(_, text)| text.as_str()),
            Some("Another sign already exists: WALL_SIGN[world:-1:64:0]")
        );
    }

    #[test]
    fn rewriting_the_same_sign_moves_the_target() {
        let (mut world, mut controller, old) = linked_rig("10");

        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["3"]));
        let AuthoringOutcome::Linked(link) = outcome else {
            panic!("expected a link, got {outcome:?}");
        };
        assert_eq!(link.target, at(0, 64, -3));
        assert_eq!(controller.store().observer_for_target(&old.target), None);
        assert_eq!(
            controller.store().observer_for_target(&link.target),
            Some(&observer_pos())
        );
        assert_eq!(controller.store().len(), 1);
    }

    #[test]
    fn rehung_sign_still_owned_elsewhere_is_cancelled() {
        let (mut world, mut controller, link) = linked_rig("10");

        // The sign is flipped onto a second observer without a break event.
        let second = at(2, 64, 0);
        world.place(second.clone(), BlockState::observer(BlockFace::North));
        world.place(sign_pos(), BlockState::wall_sign(BlockFace::West));

        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["10"]));
        assert_eq!(
            outcome,
            AuthoringOutcome::SignTaken {
                sign: sign_pos(),
                owner: observer_pos()
            }
        );
        assert_eq!(outcome.verdict(), Verdict::Cancel);
        assert_eq!(controller.store().link(&observer_pos()), Some(link));
        assert!(!controller.store().is_observer(&second));
        assert_eq!(
            world.messages().last().map(|(_, text)| text.as_str()),
            Some("Sign world:1:64:0 already belongs to OBSERVER[world:0:64:0]")
        );
    }

    #[test]
    fn target_past_axis_bound_is_rejected() {
        let mut world = SimWorld::new(RADIUS);
        let mut controller = controller();
        let observer = at(0, 64, i32::MIN + 5);
        let sign = at(1, 64, i32::MIN + 5);
        world.place(observer.clone(), BlockState::observer(BlockFace::North));
        world.place(sign.clone(), BlockState::wall_sign(BlockFace::East));

        let outcome = controller.on_sign_change(&mut world, &edit(&sign, &["10"]));
        assert_eq!(
            outcome,
            AuthoringOutcome::Rejected(AuthoringRejection::OutOfWorld {
                from: observer.clone(),
                face: BlockFace::North,
                distance: 10
            })
        );
        assert_eq!(outcome.verdict(), Verdict::Proceed);
        assert!(controller.store().is_empty());

        let outcome = controller.on_sign_change(&mut world, &edit(&sign, &["5"]));
        let AuthoringOutcome::Linked(link) = outcome else {
            panic!("expected a link, got {outcome:?}");
        };
        assert_eq!(link.target, at(0, 64, i32::MIN));
    }

    #[test]
    fn observer_past_axis_bound_is_rejected() {
        let mut world = SimWorld::new(RADIUS);
        let mut controller = controller();
        let sign = at(i32::MAX, 64, 0);
        world.place(sign.clone(), BlockState::wall_sign(BlockFace::West));

        let outcome = controller.on_sign_change(&mut world, &edit(&sign, &["10"]));
        assert_eq!(
            outcome,
            AuthoringOutcome::Rejected(AuthoringRejection::OutOfWorld {
                from: sign,
                face: BlockFace::East,
                distance: 1
            })
        );
    }

    #[test]
    fn shared_target_is_cancelled() {
        let (mut world, mut controller, _) = linked_rig("10");

        // A second observer east of the first target, looking west at it.
        let second = at(10, 64, -10);
        let second_sign = at(11, 64, -10);
        world.place(second.clone(), BlockState::observer(BlockFace::West));
        world.place(second_sign.clone(), BlockState::wall_sign(BlockFace::East));

        let outcome = controller.on_sign_change(&mut world, &edit(&second_sign, &["10"]));
        assert_eq!(
            outcome,
            AuthoringOutcome::TargetTaken {
                target: at(0, 64, -10),
                owner: observer_pos()
            }
        );
        assert_eq!(outcome.verdict(), Verdict::Cancel);
        assert!(!controller.store().is_observer(&second));
    }

    #[test]
    fn direct_change_pulses_observer() {
        let (mut world, mut controller, link) = linked_rig("10");

        assert!(controller.on_block_change(&mut world, &change_at(&link.target)));
        world.advance(1, &mut controller);
        assert!(world.power_log().is_empty());
        assert!(!world.block_at(&observer_pos()).powered);

        world.advance(1, &mut controller);
        assert!(world.block_at(&observer_pos()).powered);

        world.advance(2, &mut controller);
        assert!(!world.block_at(&observer_pos()).powered);
        assert_eq!(
            world.power_log(),
            &[
                PowerChange {
                    tick: 2,
                    at: observer_pos(),
                    powered: true
                },
                PowerChange {
                    tick: 4,
                    at: observer_pos(),
                    powered: false
                },
            ]
        );
        assert_eq!(world.pending_tasks(), 0);
    }

    #[test]
    fn propagated_and_unwatched_changes_are_ignored() {
        let (mut world, mut controller, link) = linked_rig("10");

        let propagated = BlockChange {
            block: link.target.clone(),
            source: at(0, 65, -10),
        };
        assert!(!controller.on_block_change(&mut world, &propagated));
        assert!(!controller.on_block_change(&mut world, &change_at(&at(7, 7, 7))));

        world.advance(10, &mut controller);
        assert!(world.power_log().is_empty());
    }

    #[test]
    fn already_powered_observer_is_left_alone() {
        let (mut world, mut controller, link) = linked_rig("10");
        world.place(
            observer_pos(),
            BlockState::observer(BlockFace::North).with_powered(true),
        );

        controller.on_block_change(&mut world, &change_at(&link.target));
        world.advance(2, &mut controller);

        assert!(world.power_log().is_empty());
        assert_eq!(world.pending_tasks(), 0);
        assert!(world.block_at(&observer_pos()).powered);
    }

    #[test]
    fn vanished_observer_drops_link_before_rise() {
        let (mut world, mut controller, link) = linked_rig("10");

        controller.on_block_change(&mut world, &change_at(&link.target));
        world.place(observer_pos(), BlockState::air());
        world.advance(4, &mut controller);

        assert!(world.power_log().is_empty());
        assert!(controller.store().is_empty());
    }

    #[test]
    fn vanished_observer_drops_link_before_fall() {
        let (mut world, mut controller, link) = linked_rig("10");

        controller.on_block_change(&mut world, &change_at(&link.target));
        world.advance(2, &mut controller);
        assert!(world.block_at(&observer_pos()).powered);

        world.place(observer_pos(), BlockState::other("STONE"));
        let outcome = controller.run_task(&mut world, &PulseTask::fall(observer_pos()));
        assert_eq!(outcome, PulseOutcome::ObserverMissing);
        assert!(controller.store().is_empty());
    }

    #[test]
    fn fall_without_rise_is_a_no_op() {
        let (mut world, mut controller, _) = linked_rig("10");
        let outcome = controller.run_task(
            &mut world,
            &PulseTask {
                observer: observer_pos(),
                phase: PulsePhase::Fall,
            },
        );
        assert_eq!(outcome, PulseOutcome::Unchanged);
        assert_eq!(world.pending_tasks(), 0);
    }

    #[test]
    fn breaking_the_sign_deactivates() {
        let (mut world, mut controller, link) = linked_rig("10");

        let outcome = controller.on_block_broken(&mut world, &sign_pos(), &steve());
        assert_eq!(outcome, MutationOutcome::Deactivated(link));
        assert!(controller.store().is_empty());
        assert!(world.broken().is_empty());
        assert!(world.block_at(&observer_pos()).is_observer());
    }

    #[test]
    fn breaking_the_observer_breaks_its_sign() {
        let (mut world, mut controller, link) = linked_rig("10");

        let outcome = controller.on_block_broken(&mut world, &observer_pos(), &steve());
        assert_eq!(outcome, MutationOutcome::Broken(link));
        assert_eq!(world.broken(), &[sign_pos()]);
        assert_eq!(world.block_at(&sign_pos()), BlockState::air());
        assert!(controller.store().is_empty());
    }

    #[test]
    fn batched_observer_removal_leaves_sign() {
        for source in [
            MutationSource::BlockExplosion,
            MutationSource::EntityExplosion,
            MutationSource::PistonExtend,
            MutationSource::PistonRetract,
        ] {
            let (mut world, mut controller, link) = linked_rig("10");
            let outcomes = controller.on_explosion(
                &mut world,
                &[at(30, 64, 30), observer_pos()],
                source.clone(),
            );
            assert_eq!(
                outcomes,
                vec![MutationOutcome::Ignored, MutationOutcome::Broken(link)],
                "{source}"
            );
            assert!(world.broken().is_empty(), "{source}");
            assert!(world.block_at(&sign_pos()).is_wall_sign(), "{source}");
            assert!(controller.store().is_empty(), "{source}");
        }
    }

    #[test]
    fn batch_with_sign_and_observer_removes_once() {
        let (mut world, mut controller, link) = linked_rig("10");
        let outcomes = controller.on_piston(
            &mut world,
            &[sign_pos(), observer_pos()],
            MutationSource::PistonExtend,
        );
        assert_eq!(
            outcomes,
            vec![MutationOutcome::Deactivated(link), MutationOutcome::Ignored]
        );
    }

    #[test]
    fn unrelated_break_is_ignored() {
        let (mut world, mut controller, link) = linked_rig("10");
        let outcome = controller.on_block_broken(&mut world, &link.target, &steve());
        assert_eq!(outcome, MutationOutcome::Ignored);
        assert_eq!(controller.store().len(), 1);
    }

    #[test]
    fn handle_routes_events() {
        let (mut world, mut controller) = rig();

        let verdict = controller.handle(
            &mut world,
            &WorldEvent::SignChanged(edit(&sign_pos(), &["6"])),
        );
        assert_eq!(verdict, Verdict::Proceed);
        let target = at(0, 64, -6);
        assert_eq!(
            controller.store().observer_for_target(&target),
            Some(&observer_pos())
        );

        controller.handle(&mut world, &WorldEvent::BlockChanged(change_at(&target)));
        assert_eq!(world.pending_tasks(), 1);

        controller.handle(
            &mut world,
            &WorldEvent::EntityExploded {
                blocks: vec![observer_pos()],
            },
        );
        assert!(controller.store().is_empty());
    }

    #[derive(Debug)]
    struct ReadOnlyBackend;

    impl TableBackend for ReadOnlyBackend {
        fn read_table(&self, _relation: Relation) -> StoreResult<Vec<(String, String)>> {
            Ok(Vec::new())
        }

        fn write_table(&mut self, _relation: Relation, _records: &[(String, String)]) -> StoreResult<()> {
            Err(watchlink_store::StoreError::Backend("read-only".into()))
        }
    }

    #[test]
    fn persistence_failure_is_absorbed() {
        let (mut world, _) = rig();
        let mut controller = LinkController::new(LinkStore::open(ReadOnlyBackend).unwrap());

        let outcome = controller.on_sign_change(&mut world, &edit(&sign_pos(), &["10"]));
        assert!(matches!(outcome, AuthoringOutcome::Failed(_)));
        assert_eq!(outcome.verdict(), Verdict::Proceed);
        assert!(world.messages().is_empty());

        // The index still serves the link from memory.
        assert_eq!(controller.store().len(), 1);
        let outcome = controller.on_block_broken(&mut world, &sign_pos(), &steve());
        assert!(matches!(outcome, MutationOutcome::Failed(_)));
        assert!(controller.store().is_empty());
    }
}
