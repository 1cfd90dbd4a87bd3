use crate::config::Args;
use crate::input::{collect_input_nonblocking, map_key, Action, InputEvent};
use crate::page::{Page, ThemeFlag};
use crate::render::{canvas_to_cells, cell_center_px, draw_text, rgb_color, Terminal};
use anyhow::Context;
use backdrop::{surface::wait_for, Engine, Options, RunState, Surface};
use crossterm::{style::Color, terminal};
use std::time::{Duration, Instant};
use tracing::{info, warn};

const SURFACE_RETRY: Duration = Duration::from_millis(50);
const SCALE_STEP: f32 = 3.0;
const SPEED_FACTOR: f32 = 1.25;

pub(crate) struct App {
    engine: Engine<ThemeFlag>,
    term: Terminal,
    page: Page,
    frame_dt: Duration,
    show_hud: bool,
    show_info: bool,
    should_quit: bool,
}

impl App {
    fn init(args: &Args) -> anyhow::Result<Self> {
        let (cols, rows) = wait_for(
            || match terminal::size() {
                Ok((c, r)) if c > 0 && r > 0 => Some((c, r)),
                _ => None,
            },
            SURFACE_RETRY,
        );

        let mut engine = Engine::new(args.engine_config(), ThemeFlag::new(args.light));
        engine.set(&args.tunables());
        if let Some(raw) = &args.options {
            engine.set_json(raw);
        }

        let term = Terminal::begin(cols, rows).context("could not set up the terminal")?;
        let page = Page::layout(cols, rows);

        let fps = args.fps.clamp(10, 240);
        Ok(Self {
            engine,
            term,
            page,
            frame_dt: Duration::from_secs_f32(1.0 / fps as f32),
            show_hud: true,
            show_info: false,
            should_quit: false,
        })
    }

    fn run(&mut self, args: &Args) -> anyhow::Result<()> {
        self.engine.setup(&self.page, &mut self.term.surface);
        if args.start_paused() {
            self.engine.pause();
        }
        info!(state = ?self.engine.state(), cols = self.term.cols, rows = self.term.rows, "started");

        while !self.should_quit {
            let frame_start = Instant::now();

            for ev in collect_input_nonblocking(self.frame_dt)? {
                self.handle(ev);
            }

            self.engine.tick(&self.page, &mut self.term.surface);
            self.render_frame()?;

            spin_sleep(self.frame_dt, frame_start);
        }

        info!(frames = self.engine.frames_rendered(), "shutting down");
        Ok(())
    }

    fn handle(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::PointerMoved { col, row } => {
                let p = cell_center_px(col, row);
                self.engine.pointer_moved(p.x, p.y);
            }
            InputEvent::Click { col, row } => {
                let p = cell_center_px(col, row);
                self.engine.pointer_moved(p.x, p.y);
                if self.page.button_hit(col, row) {
                    self.engine.toggle();
                }
            }
            InputEvent::Resize { cols, rows } => {
                if self.term.resize(cols.max(1), rows.max(1)) {
                    let (w, h) = self.term.surface.size();
                    self.engine.resize(w, h);
                    self.page = Page::layout(self.term.cols, self.term.rows);
                }
            }
            InputEvent::Key { key, mods } => {
                if let Some(action) = map_key(key, mods) {
                    self.apply(action);
                }
            }
        }
    }

    fn apply(&mut self, action: Action) {
        let info = self.engine.info();
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePause => self.engine.toggle(),
            Action::FlipTheme => {
                self.engine.theme_source().flip();
                self.engine.notify_theme_changed();
            }
            Action::ScaleDown => self.engine.set(&Options {
                scale: Some(info.scale - SCALE_STEP),
                ..Options::default()
            }),
            Action::ScaleUp => self.engine.set(&Options {
                scale: Some(info.scale + SCALE_STEP),
                ..Options::default()
            }),
            Action::SpeedDown => self.engine.set(&Options {
                speed: Some(info.speed / SPEED_FACTOR),
                ..Options::default()
            }),
            Action::SpeedUp => self.engine.set(&Options {
                speed: Some(info.speed * SPEED_FACTOR),
                ..Options::default()
            }),
            Action::InfoToggle => self.show_info = !self.show_info,
            Action::HudToggle => self.show_hud = !self.show_hud,
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let theme = self.engine.theme();
        if self.engine.state() != RunState::Running {
            // a parked engine leaves its last frame in place; keep the page
            // palette in step with theme flips anyway
            self.term.surface.bg = theme.background;
        }
        canvas_to_cells(&self.term.surface, &mut self.term.cur);

        let nearest = self.engine.nearest().index;
        let paused = self.engine.state() == RunState::Paused;
        self.page.draw(&mut self.term.cur, &theme, nearest, paused);

        if self.show_hud {
            let fg = rgb_color(theme.background);
            let bg = if theme.is_light {
                Color::Rgb { r: 40, g: 40, b: 48 }
            } else {
                Color::Rgb {
                    r: 220,
                    g: 220,
                    b: 230,
                }
            };
            let last = self.term.rows.saturating_sub(1);
            draw_text(
                &mut self.term.cur,
                0,
                last,
                " q quit | P pause | t theme | [ ] scale | - + speed | i info | h hud ",
                fg,
                bg,
            );
            if self.show_info {
                let line = match (
                    serde_json::to_string(&self.engine.info()),
                    serde_json::to_string(&self.engine.pointer_state()),
                ) {
                    (Ok(i), Ok(p)) => format!(" {i} {p} "),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!(error = %e, "could not serialize engine info");
                        String::new()
                    }
                };
                draw_text(&mut self.term.cur, 0, last.saturating_sub(1), &line, fg, bg);
            }
        }

        self.term.present(true)?;
        Ok(())
    }
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    let mut app = App::init(&args)?;
    let result = app.run(&args);
    app.term.end()?;
    result
}

/// Sleeps off what is left of the frame budget, then spins the last stretch
/// since `thread::sleep` tends to overshoot by a millisecond or so.
fn spin_sleep(budget: Duration, frame_start: Instant) {
    const SPIN_WINDOW: Duration = Duration::from_millis(2);
    let deadline = frame_start + budget;
    if let Some(coarse) = deadline
        .checked_duration_since(Instant::now())
        .and_then(|left| left.checked_sub(SPIN_WINDOW))
    {
        std::thread::sleep(coarse);
    }
    while Instant::now() < deadline {
        std::hint::spin_loop();
    }
}
