use crate::codec::DecodeError;
use crate::entity::{EntityId, EntityType};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplicationError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("stale snapshot for {entity}: stamp {stamp} older than {last}")]
    Stale {
        entity: EntityId,
        stamp: u64,
        last: u64,
    },
    #[error("live state of {0} is not available")]
    MissingLiveState(EntityId),
    #[error("{0} is not owned by this peer")]
    NotOwner(EntityId),
    #[error("{0} is owned by this peer")]
    NotReplica(EntityId),
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    #[error("unknown entity type tag {0}")]
    UnknownEntityType(u8),
    #[error("snapshot for {entity} tagged {actual}, expected {expected:?}")]
    TypeMismatch {
        entity: EntityId,
        expected: EntityType,
        actual: u8,
    },
    #[error("{entity} already registered as {existing:?}, cannot configure as {requested:?}")]
    TypeConflict {
        entity: EntityId,
        existing: EntityType,
        requested: EntityType,
    },
}

impl ReplicationError {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
