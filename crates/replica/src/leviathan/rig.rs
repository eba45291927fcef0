use bitflags::bitflags;
use glam::Vec3;

use super::snapshot::LeviathanSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Head,
    Tail,
}

bitflags! {
    /// Level-triggered animator booleans. Re-applying the same set is harmless.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnimFlags: u8 {
        const PROJECTILE_BURST = 1 << 0;
        const SUNKEN = 1 << 1;
    }
}

/// Edge-triggered animator events; each must fire once per phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTrigger {
    Bite,
    Reposition,
}

/// Continuous state pushed into the engine every replica frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeviathanPose {
    pub health: f32,
    /// Presentation only; the owner decides when the boss actually dies.
    pub defeated: bool,
    pub head: Vec3,
    pub tail: Vec3,
    pub head_rotation: f32,
    pub tail_rotation: f32,
    pub head_active: bool,
    pub tail_active: bool,
}

/// Boundary between the replication core and the engine objects that make
/// up the boss. Implemented once per engine integration.
pub trait LeviathanRig {
    /// Live state on the owner. `None` while a body part is not set up yet.
    fn sample(&self) -> Option<LeviathanSnapshot>;

    fn initial_health(&self) -> f32;

    /// Turns the local boss AI on or off.
    fn set_simulated(&mut self, simulated: bool);

    fn apply_pose(&mut self, pose: &LeviathanPose);

    fn set_flags(&mut self, part: BodyPart, flags: AnimFlags);

    fn trigger(&mut self, part: BodyPart, trigger: AnimTrigger);
}
