use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::codec::{DecodeError, Reader, Snapshot, Writer};
use crate::phase::PHASE_IDLE;

/// One 40-byte capture of the boss. Field order is the wire schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeviathanSnapshot {
    pub health: f32,
    pub head: Vec3,
    pub tail: Vec3,
    /// Yaw in degrees.
    pub head_rotation: f32,
    pub tail_rotation: f32,
    pub head_active: bool,
    pub tail_active: bool,
    pub head_phase: u8,
    pub tail_phase: u8,
}

impl Default for LeviathanSnapshot {
    fn default() -> Self {
        Self {
            health: 0.0,
            head: Vec3::ZERO,
            tail: Vec3::ZERO,
            head_rotation: 0.0,
            tail_rotation: 0.0,
            head_active: false,
            tail_active: false,
            head_phase: PHASE_IDLE,
            tail_phase: PHASE_IDLE,
        }
    }
}

impl Snapshot for LeviathanSnapshot {
    const SIZE: usize = 4 + 12 + 12 + 4 + 4 + 1 + 1 + 1 + 1;

    fn encode(&self, writer: &mut Writer) {
        writer.f32(self.health);
        writer.vec3(self.head);
        writer.vec3(self.tail);
        writer.f32(self.head_rotation);
        writer.f32(self.tail_rotation);

        writer.bool(self.head_active);
        writer.bool(self.tail_active);

        writer.u8(self.head_phase);
        writer.u8(self.tail_phase);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            health: reader.f32()?,
            head: reader.vec3()?,
            tail: reader.vec3()?,
            head_rotation: reader.f32()?,
            tail_rotation: reader.f32()?,
            head_active: reader.bool()?,
            tail_active: reader.bool()?,
            head_phase: reader.u8()?,
            tail_phase: reader.u8()?,
        })
    }
}
