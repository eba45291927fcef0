use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::entity::EntityId;

pub const MAX_PACKET_SIZE: usize = 1200;
pub const PROTOCOL_VERSION: u32 = 1;
pub const PROTOCOL_MAGIC: u32 = 0x4C455649;

const SEQUENCE_WRAP_THRESHOLD: u32 = u32::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
    pub sequence: u32,
}

impl PacketHeader {
    pub fn new(sequence: u32) -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
            sequence,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

#[inline]
pub fn sequence_greater_than(s1: u32, s2: u32) -> bool {
    ((s1 > s2) && (s1 - s2 <= SEQUENCE_WRAP_THRESHOLD))
        || ((s1 < s2) && (s2 - s1 > SEQUENCE_WRAP_THRESHOLD))
}

/// One entity snapshot as it travels between peers. The type tag selects the
/// payload schema; the stamp is the owner's clock in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct SnapshotEnvelope {
    pub entity_id: u32,
    pub entity_type: u8,
    pub stamp_ms: u64,
    pub payload: Vec<u8>,
}

impl SnapshotEnvelope {
    pub fn entity(&self) -> EntityId {
        EntityId(self.entity_id)
    }
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum PacketType {
    Snapshot(SnapshotEnvelope),
    /// Marker a player places in the world. Carried alongside snapshots but
    /// not interpreted by the replication core.
    Point {
        player_id: u32,
        position: [f32; 3],
        normal: [f32; 3],
    },
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: PacketType,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
    #[error("packet of {0} bytes exceeds maximum size")]
    TooLarge(usize),
    #[error("bad magic or protocol version")]
    InvalidHeader,
}

impl Packet {
    pub fn new(header: PacketHeader, payload: PacketType) -> Self {
        Self { header, payload }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        let bytes = rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)?;
        if bytes.len() > MAX_PACKET_SIZE {
            return Err(PacketError::TooLarge(bytes.len()));
        }
        Ok(bytes)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        let mut aligned = AlignedVec::<16>::with_capacity(data.len());
        aligned.extend_from_slice(data);
        let packet =
            rkyv::from_bytes::<Self, rancor::Error>(&aligned).map_err(PacketError::Deserialize)?;
        if !packet.header.is_valid() {
            return Err(PacketError::InvalidHeader);
        }
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_comparison() {
        assert!(sequence_greater_than(2, 1));
        assert!(!sequence_greater_than(1, 2));
        assert!(sequence_greater_than(0, u32::MAX));
        assert!(!sequence_greater_than(u32::MAX, 0));
    }

    #[test]
    fn test_snapshot_packet_serialization() {
        let envelope = SnapshotEnvelope {
            entity_id: 9,
            entity_type: 0x1A,
            stamp_ms: 1_500,
            payload: vec![7; 40],
        };
        let packet = Packet::new(PacketHeader::new(3), PacketType::Snapshot(envelope.clone()));

        let bytes = packet.serialize().unwrap();
        let decoded = Packet::deserialize(&bytes).unwrap();

        assert_eq!(decoded.header, packet.header);
        match decoded.payload {
            PacketType::Snapshot(received) => assert_eq!(received, envelope),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_foreign_header_rejected() {
        let mut header = PacketHeader::new(1);
        header.magic = 0;
        let packet = Packet::new(
            header,
            PacketType::Point {
                player_id: 1,
                position: [0.0; 3],
                normal: [0.0, 1.0, 0.0],
            },
        );

        let bytes = packet.serialize().unwrap();
        assert!(matches!(
            Packet::deserialize(&bytes),
            Err(PacketError::InvalidHeader)
        ));
    }

    #[test]
    fn test_oversized_packet_rejected() {
        let envelope = SnapshotEnvelope {
            entity_id: 1,
            entity_type: 0x1A,
            stamp_ms: 0,
            payload: vec![0; MAX_PACKET_SIZE],
        };
        let packet = Packet::new(PacketHeader::new(0), PacketType::Snapshot(envelope));
        assert!(matches!(packet.serialize(), Err(PacketError::TooLarge(_))));
    }
}
