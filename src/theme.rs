use serde::Serialize;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Host-provided theme signal.
pub trait ThemeSource {
    fn is_light(&self) -> bool;

    /// Accent override published by the host, if any.
    fn accent_token(&self) -> Option<Rgb> {
        None
    }
}

/// Fixed theme, for hosts without a theme switch.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticTheme {
    pub light: bool,
}

impl ThemeSource for StaticTheme {
    fn is_light(&self) -> bool {
        self.light
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ThemeState {
    pub is_light: bool,
    pub background: Rgb,
    pub accent: Rgb,
    pub highlight: Rgb,
    /// Multiplier applied to the pattern alpha.
    pub accent_alpha: f32,
    /// Multiplier applied to the highlight alpha.
    pub highlight_alpha: f32,
}

impl ThemeState {
    pub fn dark() -> Self {
        Self {
            is_light: false,
            background: Rgb::new(0, 0, 0),
            accent: Rgb::new(120, 100, 200),
            highlight: Rgb::new(255, 0, 0),
            accent_alpha: 1.0,
            highlight_alpha: 1.0,
        }
    }

    pub fn light() -> Self {
        Self {
            is_light: true,
            background: Rgb::new(0xfd, 0xfd, 0xfd),
            accent: Rgb::new(50, 80, 150),
            highlight: Rgb::new(220, 50, 50),
            accent_alpha: 0.6,
            highlight_alpha: 0.8,
        }
    }
}

/// Caches the resolved palette until the host says the theme changed.
pub struct ThemeAdapter<S> {
    source: S,
    cached: Option<ThemeState>,
}

impl<S: ThemeSource> ThemeAdapter<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn resolve(&mut self) -> ThemeState {
        if let Some(t) = self.cached {
            return t;
        }
        let mut t = if self.source.is_light() {
            ThemeState::light()
        } else {
            ThemeState::dark()
        };
        if let Some(accent) = self.source.accent_token() {
            t.accent = accent;
        }
        debug!(light = t.is_light, "theme resolved");
        self.cached = Some(t);
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Flag<'a>(&'a Cell<bool>);

    impl ThemeSource for Flag<'_> {
        fn is_light(&self) -> bool {
            self.0.get()
        }
    }

    #[test]
    fn resolves_palette_from_flag() {
        let mut a = ThemeAdapter::new(StaticTheme { light: true });
        let t = a.resolve();
        assert!(t.is_light);
        assert_eq!(t.background, Rgb::new(253, 253, 253));
        assert_eq!(t.accent_alpha, 0.6);
    }

    #[test]
    fn cached_until_invalidated() {
        let flag = Cell::new(false);
        let mut a = ThemeAdapter::new(Flag(&flag));
        assert!(!a.resolve().is_light);

        flag.set(true);
        assert!(!a.resolve().is_light);

        a.invalidate();
        assert!(a.resolve().is_light);
    }

    #[test]
    fn accent_token_overrides_accent_only() {
        struct Branded;
        impl ThemeSource for Branded {
            fn is_light(&self) -> bool {
                false
            }
            fn accent_token(&self) -> Option<Rgb> {
                Some(Rgb::new(1, 2, 3))
            }
        }
        let t = ThemeAdapter::new(Branded).resolve();
        assert_eq!(t.accent, Rgb::new(1, 2, 3));
        assert_eq!(t.highlight, ThemeState::dark().highlight);
    }
}
