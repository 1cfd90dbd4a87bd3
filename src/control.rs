//! Host-facing controls: pause, resume, live reconfiguration and introspection.

use crate::engine::{Engine, RunState};
use crate::error::OptionError;
use crate::pointer::PointerState;
use crate::theme::ThemeSource;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// A partial update; absent fields leave the current value alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Options {
    pub scale: Option<f32>,
    /// Noise increment between neighbouring cells.
    pub speed: Option<f32>,
    pub fast_lag: Option<f32>,
    pub slow_lag: Option<f32>,
    pub pause: Option<bool>,
}

impl Options {
    /// Reads whatever fields are usable out of a JSON object.
    ///
    /// Fields of the wrong type are dropped and reported; the rest still apply.
    pub fn from_value(v: &Value) -> (Options, Vec<OptionError>) {
        let mut errors = Vec::new();
        let Some(obj) = v.as_object() else {
            return (Options::default(), vec![OptionError::NotAnObject]);
        };
        let opts = Options {
            scale: number(obj, &["scale"], &mut errors),
            speed: number(obj, &["speed"], &mut errors),
            fast_lag: number(obj, &["fastLag", "fast_lag"], &mut errors),
            slow_lag: number(obj, &["slowLag", "slow_lag"], &mut errors),
            pause: match obj.get("pause") {
                None => None,
                Some(Value::Bool(b)) => Some(*b),
                Some(_) => {
                    errors.push(OptionError::WrongType { key: "pause" });
                    None
                }
            },
        };
        (opts, errors)
    }

    pub fn from_json(raw: &str) -> (Options, Vec<OptionError>) {
        match serde_json::from_str::<Value>(raw) {
            Ok(v) => Self::from_value(&v),
            Err(e) => (Options::default(), vec![OptionError::from(e)]),
        }
    }
}

fn number(obj: &Map<String, Value>, keys: &[&'static str], errors: &mut Vec<OptionError>) -> Option<f32> {
    let (key, v) = keys.iter().find_map(|k| obj.get(*k).map(|v| (*k, v)))?;
    match v.as_f64() {
        Some(n) => Some(n as f32),
        None => {
            errors.push(OptionError::WrongType { key });
            None
        }
    }
}

fn check_scale(v: f32) -> Result<f32, OptionError> {
    if !v.is_finite() {
        return Err(OptionError::NotFinite { key: "scale" });
    }
    if v <= 5.0 {
        return Err(OptionError::ScaleTooSmall(v));
    }
    Ok(v)
}

fn check_positive(key: &'static str, v: f32) -> Result<f32, OptionError> {
    if !v.is_finite() {
        return Err(OptionError::NotFinite { key });
    }
    if v <= 0.0 {
        return Err(OptionError::NonPositive { key, value: v });
    }
    Ok(v)
}

fn check_lag(key: &'static str, v: f32) -> Result<f32, OptionError> {
    if !v.is_finite() {
        return Err(OptionError::NotFinite { key });
    }
    if v < 1.0 {
        return Err(OptionError::LagTooSmall { key, value: v });
    }
    Ok(v)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Info {
    pub scale: f32,
    pub speed: f32,
    pub fast_lag: f32,
    pub slow_lag: f32,
    pub paused: bool,
    pub reduced_motion: bool,
    pub state: RunState,
    pub frame_count: u64,
}

impl<S: ThemeSource> Engine<S> {
    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            debug!("paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            debug!("resumed");
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Uninitialized | RunState::ReducedMotionRendered => {}
        }
    }

    /// Applies every valid field of `opts` in one step. Invalid fields are
    /// logged and skipped; nothing is ever reported back to the caller.
    pub fn set(&mut self, opts: &Options) {
        let mut next = self.config.clone();
        let mut rejected = Vec::new();

        let mut take = |r: Result<f32, OptionError>, slot: &mut f32| match r {
            Ok(v) => *slot = v,
            Err(e) => rejected.push(e),
        };
        if let Some(v) = opts.scale {
            take(check_scale(v), &mut next.scale);
        }
        if let Some(v) = opts.speed {
            take(check_positive("speed", v), &mut next.noise_increment);
        }
        if let Some(v) = opts.fast_lag {
            take(check_lag("fastLag", v), &mut next.fast_lag);
        }
        if let Some(v) = opts.slow_lag {
            take(check_lag("slowLag", v), &mut next.slow_lag);
        }

        for e in &rejected {
            warn!(error = %e, "ignoring option");
        }

        self.pointer.set_lags(next.fast_lag, next.slow_lag);
        self.config = next;

        match opts.pause {
            Some(true) => self.pause(),
            Some(false) => self.resume(),
            None => {}
        }
    }

    /// JSON flavour of [`Engine::set`]; malformed payloads are ignored.
    pub fn set_json(&mut self, raw: &str) {
        let (opts, errors) = Options::from_json(raw);
        for e in &errors {
            warn!(error = %e, "ignoring option");
        }
        self.set(&opts);
    }

    pub fn info(&self) -> Info {
        Info {
            scale: self.config.scale,
            speed: self.config.noise_increment,
            fast_lag: self.config.fast_lag,
            slow_lag: self.config.slow_lag,
            paused: self.state == RunState::Paused,
            reduced_motion: self.config.reduced_motion,
            state: self.state,
            frame_count: self.clock().frame_count,
        }
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer.state()
    }
}
