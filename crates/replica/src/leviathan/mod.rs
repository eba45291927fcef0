mod rig;
mod snapshot;

pub use rig::{AnimFlags, AnimTrigger, BodyPart, LeviathanPose, LeviathanRig};
pub use snapshot::LeviathanSnapshot;

use log::{debug, trace};

use crate::codec::{Snapshot, Writer};
use crate::config::ReplicationConfig;
use crate::entity::{Authority, Entity, EntityBase, EntityId, EntityType};
use crate::error::ReplicationError;
use crate::interpolation::{ScalarInterpolator, VectorInterpolator};
use crate::phase::{PhaseField, PhaseTransition};

/// Head surfaced and firing projectiles.
pub const HEAD_SURFACED: u8 = 0;
/// Head lunging at a player.
pub const HEAD_BITE: u8 = 1;

/// Two-part sea serpent boss: a head and a tail that surface independently.
pub struct Leviathan<R> {
    base: EntityBase,
    rig: R,

    health: ScalarInterpolator,
    head: VectorInterpolator,
    tail: VectorInterpolator,
    head_rotation: ScalarInterpolator,
    tail_rotation: ScalarInterpolator,

    head_active: bool,
    tail_active: bool,

    head_phase: PhaseField,
    tail_phase: PhaseField,
}

impl<R: LeviathanRig> Leviathan<R> {
    pub fn new(id: EntityId, authority: Authority, mut rig: R, config: &ReplicationConfig) -> Self {
        let interval = config.snapshot_interval();

        let health = match authority {
            Authority::Owner => ScalarInterpolator::new(interval),
            Authority::Replica => {
                rig.set_simulated(false);
                ScalarInterpolator::with_initial(rig.initial_health(), interval)
            }
        };

        Self {
            base: EntityBase::new(id, EntityType::Leviathan, authority),
            rig,
            health,
            head: VectorInterpolator::new(interval),
            tail: VectorInterpolator::new(interval),
            head_rotation: ScalarInterpolator::new(interval),
            tail_rotation: ScalarInterpolator::new(interval),
            head_active: false,
            tail_active: false,
            head_phase: PhaseField::new(),
            tail_phase: PhaseField::new(),
        }
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }

    pub fn head_phase(&self) -> &PhaseField {
        &self.head_phase
    }

    pub fn tail_phase(&self) -> &PhaseField {
        &self.tail_phase
    }

    pub fn pose(&self, now: f64) -> LeviathanPose {
        let health = self.health.get(now);
        LeviathanPose {
            health,
            defeated: health <= 0.0,
            head: self.head.get(now),
            tail: self.tail.get(now),
            head_rotation: self.head_rotation.get(now),
            tail_rotation: self.tail_rotation.get(now),
            head_active: self.head_active,
            tail_active: self.tail_active,
        }
    }

    fn commit(&mut self, snapshot: &LeviathanSnapshot, now: f64) {
        self.health.read(snapshot.health, now);
        self.head.read(snapshot.head, now);
        self.tail.read(snapshot.tail, now);
        self.head_rotation.read(snapshot.head_rotation, now);
        self.tail_rotation.read(snapshot.tail_rotation, now);

        self.head_active = snapshot.head_active;
        self.tail_active = snapshot.tail_active;

        self.head_phase.set(snapshot.head_phase);
        self.tail_phase.set(snapshot.tail_phase);
    }

    fn apply_head(&mut self, transition: PhaseTransition) {
        trace!("{} head -> {:?}", self.base.id(), transition);
        match transition {
            PhaseTransition::Enter(HEAD_SURFACED) => {
                self.rig.set_flags(BodyPart::Head, AnimFlags::PROJECTILE_BURST);
            }
            PhaseTransition::Enter(HEAD_BITE) => {
                self.rig.set_flags(BodyPart::Head, AnimFlags::empty());
                self.rig.trigger(BodyPart::Head, AnimTrigger::Bite);
            }
            PhaseTransition::Enter(other) => {
                debug!("{} unknown head phase {other}", self.base.id());
            }
            PhaseTransition::Idle => {
                self.rig.set_flags(BodyPart::Head, AnimFlags::SUNKEN);
            }
        }
    }

    fn apply_tail(&mut self, transition: PhaseTransition) {
        trace!("{} tail -> {:?}", self.base.id(), transition);
        match transition {
            // every new tail spot means the tail dives and attacks from there
            PhaseTransition::Enter(_) => {
                self.rig.set_flags(BodyPart::Tail, AnimFlags::empty());
                self.rig.trigger(BodyPart::Tail, AnimTrigger::Reposition);
            }
            PhaseTransition::Idle => {
                self.rig.set_flags(BodyPart::Tail, AnimFlags::SUNKEN);
            }
        }
    }
}

impl<R: LeviathanRig> Entity for Leviathan<R> {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn write(&mut self, writer: &mut Writer) -> Result<(), ReplicationError> {
        self.base.require_owner()?;
        let snapshot = self
            .rig
            .sample()
            .ok_or(ReplicationError::MissingLiveState(self.base.id()))?;
        snapshot.encode(writer);
        Ok(())
    }

    fn read(&mut self, payload: &[u8], now: f64) -> Result<(), ReplicationError> {
        self.base.require_replica()?;
        let snapshot = LeviathanSnapshot::from_bytes(payload)?;
        self.commit(&snapshot, now);
        self.base.mark_received(now);
        Ok(())
    }

    fn apply_tick(&mut self, now: f64) {
        if self.base.is_owner() {
            return;
        }

        // nothing to show until the owner has been heard from
        if self.base.last_update().is_some() {
            let pose = self.pose(now);
            self.rig.apply_pose(&pose);
        }

        if let Some(transition) = self.head_phase.poll() {
            self.apply_head(transition);
        }
        if let Some(transition) = self.tail_phase.poll() {
            self.apply_tail(transition);
        }
    }
}
