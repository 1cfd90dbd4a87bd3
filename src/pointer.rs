use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dist(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Snapshot of both followers, as handed out by the control surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PointerState {
    pub fast: Point,
    pub slow: Point,
    pub speed: f32,
}

/// Two exponential followers chasing the raw pointer.
///
/// `fast_lag` and `slow_lag` are the divisors of the per-step correction, so a
/// lag of 1 snaps straight to the input and larger values trail further behind.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    state: PointerState,
    seeded: bool,
    fast_lag: f32,
    slow_lag: f32,
}

impl PointerTracker {
    pub fn new(fast_lag: f32, slow_lag: f32) -> Self {
        Self {
            state: PointerState::default(),
            seeded: false,
            fast_lag: fast_lag.max(1.0),
            slow_lag: slow_lag.max(1.0),
        }
    }

    pub fn set_lags(&mut self, fast_lag: f32, slow_lag: f32) {
        self.fast_lag = fast_lag.max(1.0);
        self.slow_lag = slow_lag.max(1.0);
    }

    pub fn lags(&self) -> (f32, f32) {
        (self.fast_lag, self.slow_lag)
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn update(&mut self, raw: Point) {
        if !self.seeded {
            // no fly-in from the origin
            self.state = PointerState {
                fast: raw,
                slow: raw,
                speed: 0.0,
            };
            self.seeded = true;
            return;
        }

        let prev_fast = self.state.fast;
        let s = &mut self.state;
        s.fast.x += (raw.x - s.fast.x) / self.fast_lag;
        s.fast.y += (raw.y - s.fast.y) / self.fast_lag;
        s.slow.x += (raw.x - s.slow.x) / self.slow_lag;
        s.slow.y += (raw.y - s.slow.y) / self.slow_lag;
        s.speed = prev_fast.dist(s.fast);
    }
}
