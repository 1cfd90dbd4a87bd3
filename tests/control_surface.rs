use backdrop::{
    find_nearest, Engine, EngineConfig, Options, Point, RecordingSurface, Rect, RunState,
    StaticTheme,
};

const NO_LINKS: &[Rect] = &[];

fn running(config: EngineConfig) -> (Engine<StaticTheme>, RecordingSurface) {
    running_on(config, 640.0, 480.0)
}

fn running_on(config: EngineConfig, w: f32, h: f32) -> (Engine<StaticTheme>, RecordingSurface) {
    let mut e = Engine::new(config, StaticTheme::default());
    let mut s = RecordingSurface::new(w, h);
    e.setup(NO_LINKS, &mut s);
    (e, s)
}

#[test]
fn set_scale_then_info_reports_it() {
    let (mut e, _) = running(EngineConfig::default());
    e.set(&Options {
        scale: Some(20.0),
        ..Options::default()
    });
    assert_eq!(e.info().scale, 20.0);
}

#[test]
fn scale_at_or_below_five_is_rejected() {
    let (mut e, _) = running(EngineConfig::default());
    let before = e.info().scale;
    e.set_json(r#"{"scale": 3}"#);
    assert_eq!(e.info().scale, before);
    e.set_json(r#"{"scale": 5}"#);
    assert_eq!(e.info().scale, before);
}

#[test]
fn reduced_motion_renders_exactly_once() {
    let mut e = Engine::new(
        EngineConfig {
            reduced_motion: true,
            ..EngineConfig::default()
        },
        StaticTheme::default(),
    );
    let mut s = RecordingSurface::new(640.0, 480.0);
    e.pointer_moved(100.0, 100.0);
    e.setup(NO_LINKS, &mut s);

    assert_eq!(e.state(), RunState::ReducedMotionRendered);
    assert_eq!(e.frames_rendered(), 1);
    assert_eq!(s.clears, 1);

    let clock = e.clock();
    let pointer = e.pointer_state();

    e.resume();
    e.toggle();
    e.set(&Options {
        pause: Some(false),
        ..Options::default()
    });
    e.pointer_moved(500.0, 400.0);
    for _ in 0..10 {
        assert!(!e.tick(NO_LINKS, &mut s));
    }

    assert_eq!(e.state(), RunState::ReducedMotionRendered);
    assert_eq!(e.frames_rendered(), 1);
    assert_eq!(s.clears, 1);
    assert_eq!(e.clock(), clock);
    assert_eq!(e.pointer_state(), pointer);
    assert!(!e.info().paused);
    assert!(e.info().reduced_motion);
}

#[test]
fn held_pointer_pulls_both_followers_in() {
    let (mut e, mut s) = running_on(EngineConfig::default(), 120.0, 90.0);
    e.pointer_moved(0.0, 0.0);
    e.tick(NO_LINKS, &mut s);

    e.pointer_moved(400.0, 300.0);
    for _ in 0..1500 {
        e.tick(NO_LINKS, &mut s);
    }
    let p = e.pointer_state();
    let target = Point::new(400.0, 300.0);
    assert!(p.fast.dist(target) < 0.01);
    assert!(p.slow.dist(target) < 0.05);
    assert!(p.speed < 0.01);
}

#[test]
fn nearest_point_on_rect_edge() {
    let r = Rect::from_edges(100.0, 100.0, 200.0, 150.0);
    let n = find_nearest(Point::new(150.0, 90.0), &[r]);
    assert_eq!(n.point, Point::new(150.0, 100.0));
    assert!((n.distance - 10.0).abs() < 1e-4);
}

#[test]
fn toggle_twice_round_trips() {
    let (mut e, _) = running(EngineConfig::default());
    assert_eq!(e.state(), RunState::Running);
    e.toggle();
    assert_eq!(e.state(), RunState::Paused);
    assert!(e.info().paused);
    e.toggle();
    assert_eq!(e.state(), RunState::Running);
}

#[test]
fn pause_and_resume_are_idempotent() {
    let (mut e, mut s) = running(EngineConfig::default());
    e.resume();
    assert_eq!(e.state(), RunState::Running);

    e.pause();
    e.pause();
    assert_eq!(e.state(), RunState::Paused);

    let frames = e.frames_rendered();
    assert!(!e.tick(NO_LINKS, &mut s));
    assert_eq!(e.frames_rendered(), frames);

    e.set_json(r#"{"pause": false}"#);
    assert_eq!(e.state(), RunState::Running);
    assert!(e.tick(NO_LINKS, &mut s));
}

#[test]
fn options_apply_together() {
    let (mut e, _) = running(EngineConfig::default());
    e.set_json(r#"{"scale": 24, "speed": 0.05, "fastLag": 6, "slowLag": 40, "pause": true}"#);
    let i = e.info();
    assert_eq!(i.scale, 24.0);
    assert_eq!(i.speed, 0.05);
    assert_eq!(i.fast_lag, 6.0);
    assert_eq!(i.slow_lag, 40.0);
    assert!(i.paused);
}

#[test]
fn link_near_pointer_gets_highlight_strokes() {
    let (mut e, mut s) = running(EngineConfig::default());
    let links = vec![Rect::new(300.0, 220.0, 80.0, 16.0)];
    e.pointer_moved(320.0, 228.0);
    e.tick(&links, &mut s);

    assert_eq!(e.nearest().index, Some(0));
    let red = s.strokes.iter().filter(|st| st.color.r == 255 && st.color.g == 0).count();
    assert!(red > 0, "expected highlight strokes near the link");
}

#[test]
fn theme_change_applies_after_notification() {
    use backdrop::ThemeSource;
    use std::cell::Cell;

    struct Switch(Cell<bool>);
    impl ThemeSource for Switch {
        fn is_light(&self) -> bool {
            self.0.get()
        }
    }

    let mut e = Engine::new(EngineConfig::default(), Switch(Cell::new(false)));
    let mut s = RecordingSurface::new(100.0, 100.0);
    e.setup(NO_LINKS, &mut s);
    assert!(!e.theme().is_light);

    e.theme_source().0.set(true);
    assert!(!e.theme().is_light);
    e.notify_theme_changed();
    assert!(e.theme().is_light);
}
