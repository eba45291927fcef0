/// Reserved phase value meaning "no discrete state". The owner encodes `-1`
/// as a byte, which is this value.
pub const PHASE_IDLE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    Idle,
    Enter(u8),
}

impl PhaseTransition {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn phase(&self) -> u8 {
        match self {
            Self::Idle => PHASE_IDLE,
            Self::Enter(phase) => *phase,
        }
    }
}

/// A byte-valued discrete channel whose changes, not its level, drive
/// one-shot effects.
///
/// `set` runs on decode and only records the latest value. `poll` runs once
/// per tick and reports a transition at most once per change, no matter how
/// many snapshots repeat the same value or how many ticks pass. The first
/// decoded value is always applied, even when it is the idle sentinel, so a
/// replica that joins mid-fight picks up the owner's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseField {
    current: Option<u8>,
    latest: Option<u8>,
}

impl Default for PhaseField {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseField {
    pub fn new() -> Self {
        Self {
            current: None,
            latest: None,
        }
    }

    pub fn set(&mut self, value: u8) {
        self.latest = Some(value);
    }

    pub fn poll(&mut self) -> Option<PhaseTransition> {
        if !self.is_pending() {
            return None;
        }
        let latest = self.latest?;
        self.current = Some(latest);
        Some(if latest == PHASE_IDLE {
            PhaseTransition::Idle
        } else {
            PhaseTransition::Enter(latest)
        })
    }

    pub fn current(&self) -> u8 {
        self.current.unwrap_or(PHASE_IDLE)
    }

    pub fn latest(&self) -> u8 {
        self.latest.unwrap_or(PHASE_IDLE)
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some() && self.current != self.latest
    }
}
