/// Longest frame delta that is fed into the accumulator at once.
const MAX_FRAME_DELTA: f64 = 0.25;

/// Turns variable frame deltas into a whole number of fixed steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimestep {
    rate: u32,
    dt: f64,
    accumulator: f64,
}

impl FixedTimestep {
    pub fn new(rate: u32) -> Self {
        let rate = rate.max(1);
        Self {
            rate,
            dt: 1.0 / rate as f64,
            accumulator: 0.0,
        }
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn accumulate(&mut self, delta: f64) {
        self.accumulator += delta.clamp(0.0, MAX_FRAME_DELTA);
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }

    /// Accumulates `delta` and returns how many steps are due.
    pub fn advance(&mut self, delta: f64) -> u32 {
        self.accumulate(delta);
        let mut steps = 0;
        while self.consume_tick() {
            steps += 1;
        }
        steps
    }

    pub fn alpha(&self) -> f64 {
        self.accumulator / self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_timestep_accumulation() {
        let mut ts = FixedTimestep::new(16);
        assert_eq!(ts.rate(), 16);

        ts.accumulate(1.0 / 8.0);
        assert!(ts.consume_tick());
        assert!(ts.consume_tick());
        assert!(!ts.consume_tick());
    }

    #[test]
    fn advance_counts_steps() {
        let mut ts = FixedTimestep::new(4);
        assert_eq!(ts.advance(0.1), 0);
        assert_eq!(ts.advance(0.2), 1);
        assert!((ts.alpha() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn huge_delta_is_clamped() {
        let mut ts = FixedTimestep::new(16);
        assert_eq!(ts.advance(10.0), 4);
    }
}
