use crate::pointer::Point;
use crate::theme::Rgb;
use std::time::Duration;
use tracing::debug;

/// Straight-alpha stroke colour; `a` is 0..=255.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn from_rgb(c: Rgb, a: f32) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: a.clamp(0.0, 255.0),
        }
    }
}

/// Full-viewport drawing target, in the same pixel space as the pointer.
pub trait Surface {
    fn size(&self) -> (f32, f32);
    fn clear(&mut self, bg: Rgb);
    fn line(&mut self, from: Point, to: Point, color: Rgba);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub color: Rgba,
}

/// Surface that remembers what was drawn. Handy for headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub clears: usize,
    pub strokes: Vec<Stroke>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, _bg: Rgb) {
        self.clears += 1;
        self.strokes.clear();
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba) {
        self.strokes.push(Stroke { from, to, color });
    }
}

/// Poll `attempt` until it yields a value, sleeping `retry` between attempts.
///
/// There is no attempt cap; the host guarantees the surface shows up.
pub fn wait_for<T>(mut attempt: impl FnMut() -> Option<T>, retry: Duration) -> T {
    let mut attempts = 0u32;
    loop {
        if let Some(v) = attempt() {
            if attempts > 0 {
                debug!(attempts, "surface became available");
            }
            return v;
        }
        attempts = attempts.saturating_add(1);
        std::thread::sleep(retry);
    }
}
