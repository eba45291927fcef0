use crate::codec::Writer;
use crate::error::ReplicationError;

use super::kind::{Authority, EntityId, EntityType};

#[derive(Debug, Clone, PartialEq)]
pub struct EntityBase {
    id: EntityId,
    entity_type: EntityType,
    authority: Authority,
    last_update: Option<f64>,
    last_stamp: Option<u64>,
}

impl EntityBase {
    pub fn new(id: EntityId, entity_type: EntityType, authority: Authority) -> Self {
        Self {
            id,
            entity_type,
            authority,
            last_update: None,
            last_stamp: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn is_owner(&self) -> bool {
        self.authority == Authority::Owner
    }

    /// Local receive time of the last accepted snapshot.
    pub fn last_update(&self) -> Option<f64> {
        self.last_update
    }

    /// Owner-side stamp of the last accepted snapshot.
    pub fn last_stamp(&self) -> Option<u64> {
        self.last_stamp
    }

    pub fn check_fresh(&self, stamp: u64) -> Result<(), ReplicationError> {
        match self.last_stamp {
            Some(last) if stamp < last => Err(ReplicationError::Stale {
                entity: self.id,
                stamp,
                last,
            }),
            _ => Ok(()),
        }
    }

    pub fn mark_received(&mut self, now: f64) {
        self.last_update = Some(self.last_update.map_or(now, |last| last.max(now)));
    }

    pub fn record_stamp(&mut self, stamp: u64) {
        self.last_stamp = Some(self.last_stamp.map_or(stamp, |last| last.max(stamp)));
    }

    pub fn require_owner(&self) -> Result<(), ReplicationError> {
        if self.is_owner() {
            Ok(())
        } else {
            Err(ReplicationError::NotOwner(self.id))
        }
    }

    pub fn require_replica(&self) -> Result<(), ReplicationError> {
        if self.is_owner() {
            Err(ReplicationError::NotReplica(self.id))
        } else {
            Ok(())
        }
    }
}

/// A replicated game object.
///
/// The owner samples live state in `write`; replicas feed decoded samples in
/// through `read` and push the smoothed result into the local simulation
/// once per frame in `apply_tick`. A replica never drives its replicated
/// fields from local simulation.
pub trait Entity {
    fn base(&self) -> &EntityBase;

    fn base_mut(&mut self) -> &mut EntityBase;

    /// Appends one snapshot to `writer`, or nothing on error.
    fn write(&mut self, writer: &mut Writer) -> Result<(), ReplicationError>;

    /// Decodes one snapshot payload. The entity is unchanged on error.
    fn read(&mut self, payload: &[u8], now: f64) -> Result<(), ReplicationError>;

    fn apply_tick(&mut self, now: f64);

    fn id(&self) -> EntityId {
        self.base().id()
    }

    fn entity_type(&self) -> EntityType {
        self.base().entity_type()
    }

    fn is_owner(&self) -> bool {
        self.base().is_owner()
    }
}
