use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use replica::{
    AnimFlags, AnimTrigger, BodyPart, HEAD_BITE, HEAD_SURFACED, LeviathanPose, LeviathanRig,
    LeviathanSnapshot, PHASE_IDLE,
};

const SPAWN_DELAY: f64 = 0.2;
const HEAD_CYCLE: [(u8, f64); 3] = [(HEAD_SURFACED, 3.0), (HEAD_BITE, 1.5), (PHASE_IDLE, 2.0)];
const TAIL_SPOTS: u8 = 4;
const TAIL_PERIOD: f64 = 4.5;

/// Owner-side stand-in for the engine's boss controller.
#[derive(Debug)]
pub struct BossSim {
    pub time: f64,
    pub health: f32,
    pub head_phase: u8,
    pub tail_phase: u8,
    pub bites: u32,
    pub repositions: u32,
    drain_per_second: f32,
}

impl BossSim {
    pub fn new(health: f32, drain_per_second: f32) -> Self {
        Self {
            time: 0.0,
            health,
            head_phase: PHASE_IDLE,
            tail_phase: PHASE_IDLE,
            bites: 0,
            repositions: 0,
            drain_per_second,
        }
    }

    pub fn update(&mut self, dt: f64) {
        self.time += dt;
        self.health = (self.health - self.drain_per_second * dt as f32).max(0.0);

        let head_phase = head_phase_at(self.time);
        if head_phase != self.head_phase && head_phase == HEAD_BITE {
            self.bites += 1;
        }
        self.head_phase = head_phase;

        let tail_phase = ((self.time / TAIL_PERIOD) as u64 % TAIL_SPOTS as u64) as u8;
        if self.time >= SPAWN_DELAY && tail_phase != self.tail_phase {
            self.repositions += 1;
            self.tail_phase = tail_phase;
        }
    }

    fn head(&self) -> Vec3 {
        let angle = self.time as f32 * 0.6;
        Vec3::new(angle.cos() * 40.0, 12.0 + (angle * 2.0).sin() * 4.0, angle.sin() * 40.0)
    }

    fn tail(&self) -> Vec3 {
        let spot = self.tail_phase as f32 * std::f32::consts::FRAC_PI_2;
        Vec3::new(spot.cos() * 55.0, 6.0, spot.sin() * 55.0)
    }
}

fn head_phase_at(time: f64) -> u8 {
    let period: f64 = HEAD_CYCLE.iter().map(|(_, length)| length).sum();
    let mut offset = time % period;
    for (phase, length) in HEAD_CYCLE {
        if offset < length {
            return phase;
        }
        offset -= length;
    }
    PHASE_IDLE
}

#[derive(Debug, Clone)]
pub struct ScriptedRig(pub Rc<RefCell<BossSim>>);

impl LeviathanRig for ScriptedRig {
    fn sample(&self) -> Option<LeviathanSnapshot> {
        let sim = self.0.borrow();
        if sim.time < SPAWN_DELAY {
            return None;
        }
        let head = sim.head();
        Some(LeviathanSnapshot {
            health: sim.health,
            head,
            tail: sim.tail(),
            head_rotation: head.x.atan2(head.z).to_degrees(),
            tail_rotation: sim.tail_phase as f32 * 90.0,
            head_active: sim.head_phase != PHASE_IDLE,
            tail_active: true,
            head_phase: sim.head_phase,
            tail_phase: sim.tail_phase,
        })
    }

    fn initial_health(&self) -> f32 {
        self.0.borrow().health
    }

    fn set_simulated(&mut self, _simulated: bool) {}

    fn apply_pose(&mut self, _pose: &LeviathanPose) {}

    fn set_flags(&mut self, _part: BodyPart, _flags: AnimFlags) {}

    fn trigger(&mut self, _part: BodyPart, _trigger: AnimTrigger) {}
}

#[derive(Debug, Default)]
pub struct Observed {
    pub simulated: bool,
    pub pose: Option<LeviathanPose>,
    pub bites: u32,
    pub repositions: u32,
    pub max_step: f32,
}

/// Replica-side rig that records what the engine would be told to do.
#[derive(Debug, Clone)]
pub struct LoggingRig {
    pub observed: Rc<RefCell<Observed>>,
    initial_health: f32,
}

impl LoggingRig {
    pub fn new(initial_health: f32) -> Self {
        Self {
            observed: Rc::new(RefCell::new(Observed {
                simulated: true,
                ..Default::default()
            })),
            initial_health,
        }
    }
}

impl LeviathanRig for LoggingRig {
    fn sample(&self) -> Option<LeviathanSnapshot> {
        None
    }

    fn initial_health(&self) -> f32 {
        self.initial_health
    }

    fn set_simulated(&mut self, simulated: bool) {
        self.observed.borrow_mut().simulated = simulated;
    }

    fn apply_pose(&mut self, pose: &LeviathanPose) {
        let mut observed = self.observed.borrow_mut();
        if let Some(previous) = observed.pose {
            let step = previous.head.distance(pose.head);
            observed.max_step = observed.max_step.max(step);
            if pose.defeated && !previous.defeated {
                log::info!("boss defeated");
            }
        }
        observed.pose = Some(*pose);
    }

    fn set_flags(&mut self, part: BodyPart, flags: AnimFlags) {
        log::debug!("{part:?} flags {flags:?}");
    }

    fn trigger(&mut self, part: BodyPart, trigger: AnimTrigger) {
        log::info!("{part:?} {trigger:?}");
        let mut observed = self.observed.borrow_mut();
        match trigger {
            AnimTrigger::Bite => observed.bites += 1,
            AnimTrigger::Reposition => observed.repositions += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_cycle_wraps() {
        assert_eq!(head_phase_at(0.0), HEAD_SURFACED);
        assert_eq!(head_phase_at(3.5), HEAD_BITE);
        assert_eq!(head_phase_at(5.0), PHASE_IDLE);
        assert_eq!(head_phase_at(6.6), HEAD_SURFACED);
    }

    #[test]
    fn not_sampled_while_spawning() {
        let sim = Rc::new(RefCell::new(BossSim::new(100.0, 0.0)));
        let rig = ScriptedRig(sim.clone());
        assert!(rig.sample().is_none());

        sim.borrow_mut().update(0.5);
        assert!(rig.sample().is_some());
    }
}
