mod link;
mod protocol;

pub use link::{LinkConditions, LinkStats, SimulatedLink, Transport};
pub use protocol::sequence_greater_than;
pub use protocol::{
    MAX_PACKET_SIZE, PROTOCOL_MAGIC, PROTOCOL_VERSION, Packet, PacketError, PacketHeader,
    PacketType, SnapshotEnvelope,
};
