use crate::anchor::{find_nearest, AnchorSource, NearestAnchor};
use crate::cell::{map_range, CellRenderer, FrameParams, CONTENT_ANCHORS};
use crate::noise::NoiseField;
use crate::pointer::{Point, PointerTracker};
use crate::surface::Surface;
use crate::theme::{ThemeAdapter, ThemeSource, ThemeState};
use serde::Serialize;
use tracing::debug;

const INITIAL_Z: f64 = 10.0;
const SPEED_COUPLING: f64 = 0.000_000_2;
/// Nearest-anchor distance at which breathing fades out completely.
const BREATH_REACH: f32 = 36.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineConfig {
    pub seed: u64,
    pub scale: f32,
    pub noise_increment: f32,
    pub fast_lag: f32,
    pub slow_lag: f32,
    pub breathing_intensity: f32,
    /// Recompute the nearest anchor once every this many frames.
    pub nearest_every: u32,
    pub reduced_motion: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            scale: 15.0,
            noise_increment: 0.02,
            fast_lag: 10.0,
            slow_lag: 75.0,
            breathing_intensity: 0.0001,
            nearest_every: 3,
            reduced_motion: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunState {
    Uninitialized,
    Running,
    Paused,
    ReducedMotionRendered,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AnimationClock {
    /// Noise depth. Per-frame steps are around 1e-7, well under an `f32` ulp
    /// at the starting depth, so this accumulates in `f64`.
    pub z_depth: f64,
    pub frame_count: u64,
}

/// Breathing term for a frame: a warped sine that is strongest with the
/// pointer on an anchor and dies out `BREATH_REACH` pixels away from it.
/// With no anchors (infinite distance) the field does not breathe.
pub fn breath(frame_count: u64, intensity: f32, nearest_distance: f32) -> f32 {
    let t = frame_count as f32 * 0.1;
    let wave = (2.0 * t + 1.2 * (2.0 * t).sin()).sin();
    let d = nearest_distance.clamp(0.0, BREATH_REACH);
    let reach = map_range(d, 0.0, BREATH_REACH, 0.0, 1.0);
    wave * intensity * (1.0 - reach.min(1.0))
}

/// One animated background bound to one surface.
///
/// The host owns the frame loop: it forwards pointer and resize events, then
/// calls [`Engine::tick`] once per display refresh.
pub struct Engine<S> {
    pub(crate) config: EngineConfig,
    pub(crate) state: RunState,
    pub(crate) pointer: PointerTracker,
    noise: NoiseField,
    theme: ThemeAdapter<S>,
    clock: AnimationClock,
    nearest: NearestAnchor,
    raw_pointer: Option<Point>,
    width: f32,
    height: f32,
    content: [Point; 2],
    frames_rendered: u64,
}

impl<S: ThemeSource> Engine<S> {
    pub fn new(mut config: EngineConfig, theme: S) -> Self {
        config.nearest_every = config.nearest_every.max(1);
        let defaults = EngineConfig::default();
        if !(config.scale.is_finite() && config.scale > 5.0) {
            config.scale = defaults.scale;
        }
        if !(config.noise_increment.is_finite() && config.noise_increment > 0.0) {
            config.noise_increment = defaults.noise_increment;
        }
        if !(config.fast_lag.is_finite() && config.fast_lag >= 1.0) {
            config.fast_lag = defaults.fast_lag;
        }
        if !(config.slow_lag.is_finite() && config.slow_lag >= 1.0) {
            config.slow_lag = defaults.slow_lag;
        }
        Self {
            noise: NoiseField::new(config.seed),
            pointer: PointerTracker::new(config.fast_lag, config.slow_lag),
            theme: ThemeAdapter::new(theme),
            state: RunState::Uninitialized,
            clock: AnimationClock {
                z_depth: INITIAL_Z,
                frame_count: 0,
            },
            nearest: NearestAnchor::NONE,
            raw_pointer: None,
            width: 0.0,
            height: 0.0,
            content: [Point::default(); 2],
            frames_rendered: 0,
            config,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> AnimationClock {
        self.clock
    }

    pub fn nearest(&self) -> NearestAnchor {
        self.nearest
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn theme_source(&self) -> &S {
        self.theme.source()
    }

    pub fn theme(&mut self) -> ThemeState {
        self.theme.resolve()
    }

    pub fn notify_theme_changed(&mut self) {
        self.theme.invalidate();
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.raw_pointer = Some(Point::new(x, y));
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn content_anchors(&self) -> [Point; 2] {
        self.content
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self.height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        for (slot, (fx, fy)) in self.content.iter_mut().zip(CONTENT_ANCHORS) {
            *slot = Point::new(self.width * fx, self.height * fy);
        }
        debug!(width = self.width, height = self.height, "engine resized");
    }

    /// Leaves `Uninitialized`. With reduced motion this draws the one static
    /// frame and parks the engine for good.
    pub fn setup<A, D>(&mut self, anchors: &A, surface: &mut D)
    where
        A: AnchorSource + ?Sized,
        D: Surface,
    {
        if self.state != RunState::Uninitialized {
            return;
        }
        let (w, h) = surface.size();
        self.resize(w, h);

        if self.config.reduced_motion {
            let target = self.pointer_target();
            self.pointer.update(target);
            self.refresh_nearest(anchors);
            self.draw(surface);
            self.state = RunState::ReducedMotionRendered;
            debug!("reduced motion: rendered static frame");
        } else {
            self.state = RunState::Running;
            debug!("engine running");
        }
    }

    /// Advances one frame when running. Returns whether anything was drawn.
    pub fn tick<A, D>(&mut self, anchors: &A, surface: &mut D) -> bool
    where
        A: AnchorSource + ?Sized,
        D: Surface,
    {
        if self.state != RunState::Running {
            return false;
        }

        let target = self.pointer_target();
        self.pointer.update(target);
        if self.clock.frame_count % u64::from(self.config.nearest_every) == 0 {
            self.refresh_nearest(anchors);
        }

        let b = breath(
            self.clock.frame_count,
            self.config.breathing_intensity,
            self.nearest.distance,
        );

        self.draw(surface);

        let speed = self.pointer.state().speed;
        self.clock.z_depth += f64::from(b) + SPEED_COUPLING * f64::from(speed);
        self.clock.frame_count += 1;
        true
    }

    fn pointer_target(&self) -> Point {
        self.raw_pointer
            .unwrap_or(Point::new(self.width * 0.5, self.height * 0.5))
    }

    fn refresh_nearest<A: AnchorSource + ?Sized>(&mut self, anchors: &A) {
        let rects = anchors.anchor_rects();
        self.nearest = find_nearest(self.pointer.state().fast, &rects);
    }

    fn draw<D: Surface>(&mut self, surface: &mut D) -> usize {
        let theme = self.theme.resolve();
        surface.clear(theme.background);

        let scale = self.config.scale;
        let cols = (self.width / scale).ceil() as u32;
        let rows = (self.height / scale).ceil() as u32;

        let renderer = CellRenderer::new(
            &self.noise,
            FrameParams {
                scale,
                increment: self.config.noise_increment,
                z_depth: self.clock.z_depth,
                frame_count: self.clock.frame_count,
                slow_pointer: self.pointer.state().slow,
                content: self.content,
                nearest_distance: self.nearest.distance,
            },
        );

        let mut strokes = 0;
        for j in 0..rows {
            for i in 0..cols {
                strokes += renderer.render(surface, &theme, i, j);
            }
        }
        self.frames_rendered += 1;
        strokes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Rect;
    use crate::surface::RecordingSurface;
    use crate::theme::StaticTheme;

    const NO_ANCHORS: &[Rect] = &[];

    fn engine() -> Engine<StaticTheme> {
        Engine::new(EngineConfig::default(), StaticTheme::default())
    }

    #[test]
    fn tick_before_setup_does_nothing() {
        let mut e = engine();
        let mut s = RecordingSurface::new(300.0, 200.0);
        assert!(!e.tick(NO_ANCHORS, &mut s));
        assert_eq!(e.frames_rendered(), 0);
    }

    #[test]
    fn running_tick_advances_clock() {
        let mut e = engine();
        let mut s = RecordingSurface::new(300.0, 200.0);
        let anchors: Vec<Rect> = Vec::new();
        e.setup(&anchors, &mut s);
        assert_eq!(e.state(), RunState::Running);

        for _ in 0..5 {
            assert!(e.tick(&anchors, &mut s));
        }
        assert_eq!(e.clock().frame_count, 5);
        assert_eq!(e.frames_rendered(), 5);
        assert_eq!(s.clears, 5);
        assert!(e.clock().z_depth.is_finite());
    }

    #[test]
    fn resize_moves_content_anchors() {
        let mut e = engine();
        e.resize(1000.0, 500.0);
        assert_eq!(
            e.content_anchors(),
            [Point::new(300.0, 100.0), Point::new(400.0, 300.0)]
        );
        e.resize(-4.0, f32::NAN);
        assert_eq!(e.size(), (0.0, 0.0));
    }

    #[test]
    fn empty_canvas_renders_no_cells() {
        let mut e = engine();
        let mut s = RecordingSurface::new(0.0, 0.0);
        e.setup(NO_ANCHORS, &mut s);
        assert!(e.tick(NO_ANCHORS, &mut s));
        assert!(s.strokes.is_empty());
    }

    #[test]
    fn nearest_anchor_is_throttled() {
        let mut e = engine();
        let mut s = RecordingSurface::new(400.0, 300.0);
        e.pointer_moved(50.0, 50.0);
        let mut anchors = vec![Rect::new(60.0, 40.0, 20.0, 20.0)];
        e.setup(&anchors, &mut s);

        e.tick(&anchors, &mut s);
        assert_eq!(e.nearest().index, Some(0));

        anchors.clear();
        e.tick(&anchors, &mut s);
        e.tick(&anchors, &mut s);
        assert_eq!(e.nearest().index, Some(0));

        e.tick(&anchors, &mut s);
        assert!(e.nearest().distance.is_infinite());
    }

    #[test]
    fn breathing_only_near_an_anchor() {
        assert_eq!(breath(7, 0.0001, f32::INFINITY), 0.0);
        assert_eq!(breath(7, 0.0001, 36.0), 0.0);
        let on = breath(7, 0.0001, 0.0);
        assert!(on.abs() > 0.0);
        assert!(on.abs() <= 0.0001);
        assert!(breath(7, 0.0001, 18.0).abs() < on.abs());
    }

    #[test]
    fn pointer_speed_drives_depth_without_anchors() {
        let mut e = engine();
        let mut s = RecordingSurface::new(30.0, 30.0);
        e.pointer_moved(0.0, 0.0);
        e.setup(NO_ANCHORS, &mut s);
        let z0 = e.clock().z_depth;

        let mut expected = 0.0;
        for k in 0..600 {
            e.pointer_moved(2.0 * k as f32, 0.0);
            e.tick(NO_ANCHORS, &mut s);
            assert!(e.nearest().distance.is_infinite());
            expected += SPEED_COUPLING * f64::from(e.pointer.state().speed);
        }
        let advance = e.clock().z_depth - z0;

        assert!((e.pointer.state().speed - 2.0).abs() < 1e-3);
        assert!((advance - expected).abs() < 1e-12, "advance {advance} vs {expected}");
        // 600 frames at 2 px/frame, less the follower's warm-up
        assert!(advance > 2.2e-4 && advance < 2.4e-4, "advance {advance}");
    }

    #[test]
    fn breathing_drives_depth_on_an_anchor() {
        let mut e = engine();
        let mut s = RecordingSurface::new(300.0, 200.0);
        let anchors = vec![Rect::new(100.0, 100.0, 50.0, 20.0)];
        e.pointer_moved(120.0, 100.0);
        e.setup(&anchors, &mut s);
        let z0 = e.clock().z_depth;

        let mut expected = 0.0;
        for k in 0..40 {
            e.tick(&anchors, &mut s);
            assert_eq!(e.nearest().distance, 0.0);
            assert_eq!(e.pointer.state().speed, 0.0);
            expected += f64::from(breath(k, e.config().breathing_intensity, 0.0));
        }
        let advance = e.clock().z_depth - z0;

        assert!(expected != 0.0);
        assert!((advance - expected).abs() < 1e-12, "advance {advance} vs {expected}");
    }

    #[test]
    fn pointer_defaults_to_canvas_centre() {
        let mut e = engine();
        let mut s = RecordingSurface::new(400.0, 300.0);
        e.setup(NO_ANCHORS, &mut s);
        e.tick(NO_ANCHORS, &mut s);
        assert_eq!(e.pointer.state().fast, Point::new(200.0, 150.0));
    }
}
