mod base;
mod kind;

pub use base::{Entity, EntityBase};
pub use kind::{Authority, EntityId, EntityType};
