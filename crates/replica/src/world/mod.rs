mod session;

pub use session::{Clock, ManualClock, Session, SystemClock};

use std::collections::HashMap;

use log::{debug, warn};

use crate::codec::Writer;
use crate::entity::{Entity, EntityId};
use crate::error::ReplicationError;
use crate::net::SnapshotEnvelope;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicationStats {
    pub decoded: u64,
    pub rejected_stale: u64,
    pub rejected_schema: u64,
    pub rejected_other: u64,
    pub skipped_writes: u64,
    pub sent: u64,
}

/// Registry of the replicated entities known to this peer.
#[derive(Default)]
pub struct World {
    entities: HashMap<EntityId, Box<dyn Entity>>,
    stats: ReplicationStats,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity under its id. Configuring an id that is already
    /// known with the same type keeps the existing entity.
    pub fn configure(&mut self, entity: Box<dyn Entity>) -> Result<EntityId, ReplicationError> {
        let id = entity.id();
        if let Some(existing) = self.entities.get(&id) {
            if existing.entity_type() != entity.entity_type() {
                return Err(ReplicationError::TypeConflict {
                    entity: id,
                    existing: existing.entity_type(),
                    requested: entity.entity_type(),
                });
            }
            debug!("{id} already configured");
            return Ok(id);
        }
        self.entities.insert(id, entity);
        Ok(id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Box<dyn Entity>> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities.get(&id).map(|entity| entity.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        self.entities.get_mut(&id).map(|entity| entity.as_mut())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn stats(&self) -> ReplicationStats {
        self.stats
    }

    /// Advances every replica by one local frame.
    pub fn tick<C: Clock>(&mut self, session: &Session<C>) {
        let now = session.now();
        for entity in self.entities.values_mut() {
            if !entity.is_owner() {
                entity.apply_tick(now);
            }
        }
    }

    /// Applies one received snapshot. A failure drops this update only.
    pub fn on_snapshot_received<C: Clock>(
        &mut self,
        session: &Session<C>,
        envelope: &SnapshotEnvelope,
    ) -> Result<(), ReplicationError> {
        let result = self.decode(session.now(), envelope);
        match &result {
            Ok(()) => self.stats.decoded += 1,
            Err(err) if err.is_stale() => {
                debug!("dropping snapshot: {err}");
                self.stats.rejected_stale += 1;
            }
            Err(err) if err.is_schema_mismatch() => {
                warn!("dropping snapshot for {}: {err}", envelope.entity());
                self.stats.rejected_schema += 1;
            }
            Err(err) => {
                debug!("dropping snapshot: {err}");
                self.stats.rejected_other += 1;
            }
        }
        result
    }

    fn decode(&mut self, now: f64, envelope: &SnapshotEnvelope) -> Result<(), ReplicationError> {
        let id = envelope.entity();
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(ReplicationError::UnknownEntity(id))?;

        let expected = entity.entity_type();
        if envelope.entity_type != expected.tag() {
            return Err(ReplicationError::TypeMismatch {
                entity: id,
                expected,
                actual: envelope.entity_type,
            });
        }

        entity.base().check_fresh(envelope.stamp_ms)?;
        entity.read(&envelope.payload, now)?;
        entity.base_mut().record_stamp(envelope.stamp_ms);
        Ok(())
    }

    /// Writes a snapshot of every entity this peer owns. Entities whose live
    /// state is not ready are skipped for this frame.
    pub fn collect_snapshots<C: Clock>(&mut self, session: &Session<C>) -> Vec<SnapshotEnvelope> {
        let stamp_ms = session.stamp_ms();
        let mut envelopes = Vec::new();

        for id in self.ids() {
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            if !entity.is_owner() {
                continue;
            }

            let mut writer = Writer::new();
            match entity.write(&mut writer) {
                Ok(()) => {
                    envelopes.push(SnapshotEnvelope {
                        entity_id: id.id(),
                        entity_type: entity.entity_type().tag(),
                        stamp_ms,
                        payload: writer.into_inner(),
                    });
                    self.stats.sent += 1;
                }
                Err(err) => {
                    debug!("skipping snapshot: {err}");
                    self.stats.skipped_writes += 1;
                }
            }
        }

        envelopes
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;
    use crate::codec::Snapshot;
    use crate::config::ReplicationConfig;
    use crate::entity::{Authority, EntityType};
    use crate::leviathan::{
        AnimFlags, AnimTrigger, BodyPart, HEAD_BITE, Leviathan, LeviathanPose, LeviathanRig,
        LeviathanSnapshot,
    };

    #[derive(Debug, Default)]
    struct Shared {
        live: Option<LeviathanSnapshot>,
        poses: usize,
        triggers: Vec<(BodyPart, AnimTrigger)>,
    }

    #[derive(Debug, Clone, Default)]
    struct SharedRig(Rc<RefCell<Shared>>);

    impl LeviathanRig for SharedRig {
        fn sample(&self) -> Option<LeviathanSnapshot> {
            self.0.borrow().live
        }

        fn initial_health(&self) -> f32 {
            100.0
        }

        fn set_simulated(&mut self, _simulated: bool) {}

        fn apply_pose(&mut self, _pose: &LeviathanPose) {
            self.0.borrow_mut().poses += 1;
        }

        fn set_flags(&mut self, _part: BodyPart, _flags: AnimFlags) {}

        fn trigger(&mut self, part: BodyPart, trigger: AnimTrigger) {
            self.0.borrow_mut().triggers.push((part, trigger));
        }
    }

    fn session(now: f64) -> Session<ManualClock> {
        Session::new(ManualClock::new(now), ReplicationConfig::default())
    }

    fn leviathan(id: u32, authority: Authority, rig: SharedRig) -> Box<dyn Entity> {
        Box::new(Leviathan::new(
            EntityId(id),
            authority,
            rig,
            &ReplicationConfig::default(),
        ))
    }

    fn envelope(id: u32, stamp_ms: u64, snapshot: &LeviathanSnapshot) -> SnapshotEnvelope {
        SnapshotEnvelope {
            entity_id: id,
            entity_type: EntityType::Leviathan.tag(),
            stamp_ms,
            payload: snapshot.to_bytes(),
        }
    }

    #[test]
    fn configure_is_idempotent() {
        let mut world = World::new();
        let rig = SharedRig::default();

        assert_eq!(world.configure(leviathan(1, Authority::Replica, rig.clone())), Ok(EntityId(1)));
        assert_eq!(world.configure(leviathan(1, Authority::Replica, rig)), Ok(EntityId(1)));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn stale_snapshot_is_dropped() {
        let mut world = World::new();
        let rig = SharedRig::default();
        world.configure(leviathan(1, Authority::Replica, rig.clone())).unwrap();

        let newer = LeviathanSnapshot {
            health: 50.0,
            head_phase: HEAD_BITE,
            ..Default::default()
        };
        let older = LeviathanSnapshot {
            health: 80.0,
            ..Default::default()
        };

        let session = session(1.0);
        world.on_snapshot_received(&session, &envelope(1, 200, &newer)).unwrap();
        let err = world
            .on_snapshot_received(&session, &envelope(1, 100, &older))
            .unwrap_err();

        assert!(err.is_stale());
        assert_eq!(world.stats().decoded, 1);
        assert_eq!(world.stats().rejected_stale, 1);
        assert_eq!(world.get(EntityId(1)).unwrap().base().last_stamp(), Some(200));

        world.tick(&session);
        assert_eq!(rig.0.borrow().triggers, vec![(BodyPart::Head, AnimTrigger::Bite)]);
    }

    #[test]
    fn bad_packets_touch_only_their_entity() {
        let mut world = World::new();
        world.configure(leviathan(1, Authority::Replica, SharedRig::default())).unwrap();
        world.configure(leviathan(2, Authority::Replica, SharedRig::default())).unwrap();
        let session = session(0.5);

        let mut short = envelope(1, 10, &LeviathanSnapshot::default());
        short.payload.pop();
        assert!(world.on_snapshot_received(&session, &short).unwrap_err().is_schema_mismatch());

        let mut wrong_type = envelope(2, 10, &LeviathanSnapshot::default());
        wrong_type.entity_type = 0;
        assert!(matches!(
            world.on_snapshot_received(&session, &wrong_type),
            Err(ReplicationError::TypeMismatch { .. })
        ));

        assert_eq!(
            world.on_snapshot_received(&session, &envelope(3, 10, &LeviathanSnapshot::default())),
            Err(ReplicationError::UnknownEntity(EntityId(3)))
        );

        world
            .on_snapshot_received(&session, &envelope(2, 10, &LeviathanSnapshot::default()))
            .unwrap();

        assert_eq!(world.get(EntityId(1)).unwrap().base().last_update(), None);
        assert_eq!(world.get(EntityId(2)).unwrap().base().last_update(), Some(0.5));
        assert_eq!(world.stats().rejected_schema, 1);
        assert_eq!(world.stats().rejected_other, 2);
    }

    #[test]
    fn owner_skips_entities_without_live_state() {
        let mut world = World::new();
        let ready = SharedRig::default();
        ready.0.borrow_mut().live = Some(LeviathanSnapshot {
            head: Vec3::X,
            ..Default::default()
        });
        world.configure(leviathan(1, Authority::Owner, ready)).unwrap();
        world.configure(leviathan(2, Authority::Owner, SharedRig::default())).unwrap();
        world.configure(leviathan(3, Authority::Replica, SharedRig::default())).unwrap();

        let envelopes = world.collect_snapshots(&session(2.0));

        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].entity(), EntityId(1));
        assert_eq!(envelopes[0].stamp_ms, 2000);
        assert_eq!(envelopes[0].payload.len(), LeviathanSnapshot::SIZE);
        assert_eq!(world.stats().skipped_writes, 1);
        assert_eq!(world.stats().sent, 1);
    }

    #[test]
    fn tick_drives_replicas_only() {
        let mut world = World::new();
        let owner_rig = SharedRig::default();
        owner_rig.0.borrow_mut().live = Some(LeviathanSnapshot::default());
        let replica_rig = SharedRig::default();
        world.configure(leviathan(1, Authority::Owner, owner_rig.clone())).unwrap();
        world.configure(leviathan(2, Authority::Replica, replica_rig.clone())).unwrap();

        let session = session(1.0);
        world
            .on_snapshot_received(&session, &envelope(2, 1, &LeviathanSnapshot::default()))
            .unwrap();
        world.tick(&session);
        world.tick(&session);

        assert_eq!(owner_rig.0.borrow().poses, 0);
        assert_eq!(replica_rig.0.borrow().poses, 2);
    }

    #[test]
    fn removed_entity_stops_receiving() {
        let mut world = World::new();
        world.configure(leviathan(4, Authority::Replica, SharedRig::default())).unwrap();
        world.get_mut(EntityId(4)).unwrap().base_mut().record_stamp(30);
        assert_eq!(world.get(EntityId(4)).unwrap().base().last_stamp(), Some(30));

        assert!(world.remove(EntityId(4)).is_some());
        assert!(world.is_empty());
        assert!(!world.contains(EntityId(4)));
    }
}
