use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReplicationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Tag carried by the outer packet header; selects the snapshot schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityType {
    Leviathan = 0x1A,
}

impl EntityType {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for EntityType {
    type Error = ReplicationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x1A => Ok(Self::Leviathan),
            other => Err(ReplicationError::UnknownEntityType(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Authority {
    Owner,
    Replica,
}
