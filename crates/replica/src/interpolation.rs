use glam::Vec3;

/// Blends the two most recent samples of a scalar over a fixed nominal
/// window (the owner's send interval).
///
/// `get` is pure; state only advances in `read`. When samples stop arriving
/// the value settles on the last target and stays there.
///
/// A channel built with `new` snaps to its first sample. One built with
/// `with_initial` blends from the seed value instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarInterpolator {
    previous: f32,
    target: f32,
    sample_time: f64,
    interval: f64,
    primed: bool,
}

impl ScalarInterpolator {
    pub fn new(interval: f64) -> Self {
        Self {
            primed: false,
            ..Self::with_initial(0.0, interval)
        }
    }

    pub fn with_initial(value: f32, interval: f64) -> Self {
        Self {
            previous: value,
            target: value,
            sample_time: 0.0,
            interval,
            primed: true,
        }
    }

    pub fn read(&mut self, value: f32, now: f64) {
        self.previous = if self.primed { self.target } else { value };
        self.primed = true;
        self.target = value;
        self.sample_time = now;
    }

    pub fn get(&self, now: f64) -> f32 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.target;
        }
        let value = self.previous + (self.target - self.previous) * t as f32;
        // rounding must not carry the blend past the target
        if self.target >= self.previous {
            value.min(self.target)
        } else {
            value.max(self.target)
        }
    }

    fn progress(&self, now: f64) -> f64 {
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return 1.0;
        }
        let t = (now - self.sample_time) / self.interval;
        if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) }
    }

    pub fn previous(&self) -> f32 {
        self.previous
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn sample_time(&self) -> f64 {
        self.sample_time
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorInterpolator {
    x: ScalarInterpolator,
    y: ScalarInterpolator,
    z: ScalarInterpolator,
}

impl VectorInterpolator {
    pub fn new(interval: f64) -> Self {
        Self {
            x: ScalarInterpolator::new(interval),
            y: ScalarInterpolator::new(interval),
            z: ScalarInterpolator::new(interval),
        }
    }

    pub fn with_initial(value: Vec3, interval: f64) -> Self {
        Self {
            x: ScalarInterpolator::with_initial(value.x, interval),
            y: ScalarInterpolator::with_initial(value.y, interval),
            z: ScalarInterpolator::with_initial(value.z, interval),
        }
    }

    pub fn read(&mut self, value: Vec3, now: f64) {
        self.x.read(value.x, now);
        self.y.read(value.y, now);
        self.z.read(value.z, now);
    }

    pub fn get(&self, now: f64) -> Vec3 {
        Vec3::new(self.x.get(now), self.y.get(now), self.z.get(now))
    }

    pub fn target(&self) -> Vec3 {
        Vec3::new(self.x.target(), self.y.target(), self.z.target())
    }
}
