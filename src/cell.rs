use crate::noise::NoiseField;
use crate::pointer::Point;
use crate::surface::{Rgba, Surface};
use crate::theme::ThemeState;

/// Canvas-relative positions of the two fixed content anchors.
pub const CONTENT_ANCHORS: [(f32, f32); 2] = [(0.3, 0.2), (0.4, 0.6)];

const THRESHOLD_DRIFT: f64 = 0.0005;
const THRESHOLD_JITTER: f32 = 0.1;
const ALPHA_RANGE: f32 = 1500.0;
const ALPHA_STEP: f32 = 20.0;
/// Largest multiple of the alpha step that still fits a byte.
pub const ALPHA_CEIL: u8 = 240;
const HIGHLIGHT_MAX_ALPHA: f32 = 80.0;
const HIGHLIGHT_FADE: f32 = 200.0;

/// Linear remap of `v` from `[a1, b1]` onto `[a2, b2]`, unclamped.
pub fn map_range(v: f32, a1: f32, b1: f32, a2: f32, b2: f32) -> f32 {
    a2 + (v - a1) * (b2 - a2) / (b1 - a1)
}

/// Everything the per-cell pass reads that is constant for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameParams {
    pub scale: f32,
    pub increment: f32,
    pub z_depth: f64,
    pub frame_count: u64,
    pub slow_pointer: Point,
    pub content: [Point; 2],
    pub nearest_distance: f32,
}

/// Distances and noise values for one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSample {
    pub perlin: f32,
    pub noisy_threshold: f32,
    pub d_mouse: f32,
    pub d_content: f32,
    pub d_content2: f32,
    pub d_nearest: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProximityFlags {
    pub near_content3: bool,
    pub near_content2: bool,
    pub near_content: bool,
    pub mouse_near: bool,
    pub mouse_kinda_near: bool,
}

impl ProximityFlags {
    pub fn of(s: &CellSample) -> Self {
        let nt = s.noisy_threshold;
        let near_content3 = s.d_content2 > 900.0 * nt;
        let near_content2 = s.d_content2 > 800.0 * nt;
        let near_content = near_content2 && s.d_content > 700.0 * nt;
        Self {
            near_content3,
            near_content2,
            near_content,
            mouse_near: near_content && s.d_mouse > 700.0 * nt,
            mouse_kinda_near: near_content && s.d_mouse > 500.0 * nt,
        }
    }
}

/// Which strokes a cell gets. `down` is top-left to bottom-right, `up` is
/// bottom-left to top-right.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellDecision {
    pub alpha: u8,
    pub highlight_alpha: Option<f32>,
    pub down: bool,
    pub up: bool,
}

impl CellDecision {
    pub fn stroke_count(&self) -> usize {
        self.highlight_alpha.is_some() as usize + self.down as usize + self.up as usize
    }
}

/// Posterized pattern opacity, a multiple of 20 in `[0, ALPHA_CEIL]`.
pub fn banded_alpha(d_mouse: f32, perlin: f32) -> u8 {
    let raw = map_range(d_mouse * perlin, 0.0, ALPHA_RANGE, 0.0, 255.0);
    if !raw.is_finite() {
        return if raw > 0.0 { ALPHA_CEIL } else { 0 };
    }
    ((raw / ALPHA_STEP).round() * ALPHA_STEP).clamp(0.0, ALPHA_CEIL as f32) as u8
}

pub fn classify(s: &CellSample) -> CellDecision {
    let flags = ProximityFlags::of(s);
    let p = s.perlin;
    let mut d = CellDecision {
        alpha: banded_alpha(s.d_mouse, p),
        ..CellDecision::default()
    };

    if p > 0.5 && s.d_nearest < 1000.0 * s.noisy_threshold {
        let near = s.d_nearest.clamp(0.0, HIGHLIGHT_FADE);
        let a = map_range(near, 0.0, HIGHLIGHT_FADE, HIGHLIGHT_MAX_ALPHA, 0.0);
        d.highlight_alpha = Some(a.clamp(0.0, HIGHLIGHT_MAX_ALPHA));
    }

    if p > 0.5 && p < 0.55 && flags.mouse_near {
        d.down = true;
    } else if (0.55..0.6).contains(&p) && flags.mouse_kinda_near {
        d.up = true;
    }

    if (0.6..0.85).contains(&p) && flags.mouse_near {
        if flags.near_content3 {
            d.down = true;
        }
        d.up = true;
    } else if p >= 0.65 && flags.mouse_kinda_near {
        d.up = true;
    }
    d
}

/// Per-frame view of the grid: samples and paints one cell at a time.
pub struct CellRenderer<'a> {
    noise: &'a NoiseField,
    frame: FrameParams,
}

impl<'a> CellRenderer<'a> {
    pub fn new(noise: &'a NoiseField, frame: FrameParams) -> Self {
        Self { noise, frame }
    }

    pub fn origin(&self, i: u32, j: u32) -> Point {
        Point::new(i as f32 * self.frame.scale, j as f32 * self.frame.scale)
    }

    pub fn sample(&self, i: u32, j: u32) -> CellSample {
        let f = &self.frame;
        let at = self.origin(i, j);
        let xoff = i as f32 * f.increment;
        let yoff = j as f32 * f.increment;

        let noisy_threshold = self
            .noise
            .sample(xoff, yoff, f.frame_count as f64 * THRESHOLD_DRIFT);
        let perlin = self.noise.sample(xoff, yoff, f.z_depth) + THRESHOLD_JITTER * noisy_threshold;

        CellSample {
            perlin,
            noisy_threshold,
            d_mouse: at.dist(f.slow_pointer),
            d_content: at.dist(f.content[0]),
            d_content2: at.dist(f.content[1]),
            d_nearest: f.nearest_distance,
        }
    }

    /// Draws cell `(i, j)` and returns how many strokes it produced.
    pub fn render(&self, surface: &mut impl Surface, theme: &ThemeState, i: u32, j: u32) -> usize {
        let decision = classify(&self.sample(i, j));
        paint(surface, self.origin(i, j), self.frame.scale, &decision, theme);
        decision.stroke_count()
    }
}

pub fn paint(
    surface: &mut impl Surface,
    at: Point,
    scale: f32,
    d: &CellDecision,
    theme: &ThemeState,
) {
    let top_left = at;
    let bottom_right = Point::new(at.x + scale, at.y + scale);
    let bottom_left = Point::new(at.x, at.y + scale);
    let top_right = Point::new(at.x + scale, at.y);

    if let Some(a) = d.highlight_alpha {
        let c = Rgba::from_rgb(theme.highlight, a * theme.highlight_alpha);
        surface.line(top_left, bottom_right, c);
    }

    let c = Rgba::from_rgb(theme.accent, d.alpha as f32 * theme.accent_alpha);
    if d.down {
        surface.line(top_left, bottom_right, c);
    }
    if d.up {
        surface.line(bottom_left, top_right, c);
    }
}
