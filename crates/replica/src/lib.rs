pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod interpolation;
pub mod leviathan;
pub mod net;
pub mod phase;
pub mod simulation;
pub mod world;

pub use codec::{DecodeError, Reader, Snapshot, Writer};
pub use config::{DEFAULT_SEND_RATE, DEFAULT_TICK_RATE, ReplicationConfig};
pub use entity::{Authority, Entity, EntityBase, EntityId, EntityType};
pub use error::ReplicationError;
pub use interpolation::{ScalarInterpolator, VectorInterpolator};
pub use leviathan::{
    AnimFlags, AnimTrigger, BodyPart, HEAD_BITE, HEAD_SURFACED, Leviathan, LeviathanPose,
    LeviathanRig, LeviathanSnapshot,
};
pub use net::{
    LinkConditions, LinkStats, Packet, PacketError, PacketHeader, PacketType, SimulatedLink,
    SnapshotEnvelope, Transport,
};
pub use phase::{PHASE_IDLE, PhaseField, PhaseTransition};
pub use simulation::FixedTimestep;
pub use world::{Clock, ManualClock, ReplicationStats, Session, SystemClock, World};
