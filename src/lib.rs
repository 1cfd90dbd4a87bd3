//! Pointer-reactive noise-field background.
//!
//! A coarse grid is sampled from a smooth noise field every frame; each cell
//! draws zero to three diagonal strokes depending on its noise value and how
//! close it sits to the smoothed pointer, to two fixed content anchors and to
//! the nearest link on the page. The host drives everything through
//! [`Engine::tick`] and talks to it through the control surface.

pub mod anchor;
pub mod cell;
pub mod control;
pub mod engine;
pub mod error;
pub mod noise;
pub mod pointer;
pub mod surface;
pub mod theme;

pub use anchor::{find_nearest, AnchorSource, NearestAnchor, Rect};
pub use control::{Info, Options};
pub use engine::{Engine, EngineConfig, RunState};
pub use error::OptionError;
pub use noise::NoiseField;
pub use pointer::{Point, PointerState, PointerTracker};
pub use surface::{RecordingSurface, Rgba, Surface};
pub use theme::{Rgb, StaticTheme, ThemeSource, ThemeState};
