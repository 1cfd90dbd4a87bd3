use backdrop::{EngineConfig, Options};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "backdrop")]
#[command(about = "Pointer-reactive noise-field background for the terminal", long_about = None)]
pub(crate) struct Args {
    /// FPS cap
    #[arg(long, default_value_t = 60)]
    pub(crate) fps: u32,

    /// grid cell size in pixels (must be > 5; a cell is 8x16 pixels)
    #[arg(long, default_value_t = 15.0)]
    pub(crate) scale: f32,

    /// noise increment between neighbouring cells
    #[arg(long, default_value_t = 0.02)]
    pub(crate) speed: f32,

    /// fast pointer follower lag (steps)
    #[arg(long, default_value_t = 10.0)]
    pub(crate) fast_lag: f32,

    /// slow pointer follower lag (steps)
    #[arg(long, default_value_t = 75.0)]
    pub(crate) slow_lag: f32,

    /// noise seed; the same seed gives the same field
    #[arg(long, default_value_t = 1)]
    pub(crate) seed: u64,

    /// recompute the nearest link every N frames
    #[arg(long, default_value_t = 3)]
    pub(crate) nearest_every: u32,

    /// draw one static frame and stop animating
    #[arg(long, env = "BACKDROP_REDUCED_MOTION", default_value_t = false)]
    pub(crate) reduced_motion: bool,

    /// start in the light theme
    #[arg(long, default_value_t = false)]
    pub(crate) light: bool,

    /// start paused
    #[arg(long, default_value_t = false)]
    pub(crate) paused: bool,

    /// extra control options as a JSON object, e.g. '{"scale":20}'
    #[arg(long)]
    pub(crate) options: Option<String>,

    /// write logs to this file (the terminal is busy drawing)
    #[arg(long, env = "BACKDROP_LOG_FILE")]
    pub(crate) log_file: Option<PathBuf>,
}

impl Args {
    /// Fixed-at-start part of the engine configuration. Tunables go through
    /// [`Args::tunables`] so they get the same checks as live updates.
    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            seed: self.seed,
            nearest_every: self.nearest_every.max(1),
            reduced_motion: self.reduced_motion,
            ..EngineConfig::default()
        }
    }

    /// `--paused`, or a `"pause": true` inside `--options`. Pausing only takes
    /// effect once the engine is running, so the host applies this after setup.
    pub(crate) fn start_paused(&self) -> bool {
        let from_options = self
            .options
            .as_deref()
            .and_then(|raw| Options::from_json(raw).0.pause);
        from_options.unwrap_or(self.paused)
    }

    pub(crate) fn tunables(&self) -> Options {
        Options {
            scale: Some(self.scale),
            speed: Some(self.speed),
            fast_lag: Some(self.fast_lag),
            slow_lag: Some(self.slow_lag),
            pause: None,
        }
    }
}
