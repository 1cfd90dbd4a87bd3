use crate::render::{draw_text_over, rgb_color, CellBuffer, CELL_H_PX, CELL_W_PX};
use backdrop::{AnchorSource, Rect, Rgb, ThemeSource, ThemeState};
use std::cell::Cell;

/// Light/dark switch shared between the page and the engine.
#[derive(Debug, Default)]
pub(crate) struct ThemeFlag {
    light: Cell<bool>,
}

impl ThemeFlag {
    pub(crate) fn new(light: bool) -> Self {
        Self {
            light: Cell::new(light),
        }
    }

    pub(crate) fn flip(&self) {
        self.light.set(!self.light.get());
    }
}

impl ThemeSource for ThemeFlag {
    fn is_light(&self) -> bool {
        self.light.get()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Link {
    pub(crate) label: &'static str,
    pub(crate) col: u16,
    pub(crate) row: u16,
}

impl Link {
    fn width(&self) -> u16 {
        self.label.chars().count() as u16
    }

    fn rect(&self) -> Rect {
        Rect::new(
            self.col as f32 * CELL_W_PX,
            self.row as f32 * CELL_H_PX,
            self.width() as f32 * CELL_W_PX,
            CELL_H_PX,
        )
    }
}

const TITLE: &str = "~/backdrop";
const BODY: [&str; 3] = [
    "Noise-field background that follows the pointer.",
    "Move the mouse around; links light up as you get close.",
    "Shift+P or the button pauses, t flips the theme.",
];
const LINKS: [&str; 4] = ["[ about ]", "[ projects ]", "[ notes ]", "[ contact ]"];

/// The foreground "document": a few lines of text, a row of links and a
/// play/pause button. Links double as the engine's anchor source.
pub(crate) struct Page {
    pub(crate) links: Vec<Link>,
    title_at: (u16, u16),
    body_at: (u16, u16),
    button_at: (u16, u16),
}

impl Page {
    pub(crate) const BUTTON_W: u16 = 9;

    pub(crate) fn layout(cols: u16, rows: u16) -> Self {
        let title_at = ((cols as f32 * 0.3) as u16, (rows as f32 * 0.2) as u16);
        let body_at = (title_at.0, title_at.1.saturating_add(2));
        let links_row = body_at.1.saturating_add(BODY.len() as u16 + 1);

        let mut col = body_at.0;
        let links = LINKS
            .iter()
            .map(|&label| {
                let l = Link {
                    label,
                    col,
                    row: links_row,
                };
                col = col.saturating_add(l.width() + 2);
                l
            })
            .filter(|l| l.col + l.width() <= cols && l.row < rows)
            .collect();

        Self {
            links,
            title_at,
            body_at,
            button_at: (cols.saturating_sub(Self::BUTTON_W + 1), 0),
        }
    }

    pub(crate) fn button_hit(&self, col: u16, row: u16) -> bool {
        let (bx, by) = self.button_at;
        row == by && col >= bx && col < bx + Self::BUTTON_W
    }

    pub(crate) fn draw(
        &self,
        buf: &mut CellBuffer,
        theme: &ThemeState,
        nearest: Option<usize>,
        paused: bool,
    ) {
        let text = if theme.is_light {
            Rgb::new(30, 30, 40)
        } else {
            Rgb::new(220, 220, 230)
        };
        let muted = if theme.is_light {
            Rgb::new(90, 90, 110)
        } else {
            Rgb::new(150, 150, 170)
        };

        draw_text_over(buf, self.title_at.0, self.title_at.1, TITLE, rgb_color(text));
        for (i, line) in BODY.iter().enumerate() {
            draw_text_over(
                buf,
                self.body_at.0,
                self.body_at.1 + i as u16,
                line,
                rgb_color(muted),
            );
        }

        for (i, l) in self.links.iter().enumerate() {
            let fg = if Some(i) == nearest {
                theme.highlight
            } else {
                theme.accent
            };
            draw_text_over(buf, l.col, l.row, l.label, rgb_color(fg));
        }

        let label = if paused { "[ play  ]" } else { "[ pause ]" };
        draw_text_over(buf, self.button_at.0, self.button_at.1, label, rgb_color(text));
    }
}

impl AnchorSource for Page {
    fn anchor_rects(&self) -> Vec<Rect> {
        self.links.iter().map(Link::rect).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_become_pixel_rects() {
        let page = Page::layout(120, 40);
        let rects = page.anchor_rects();
        assert_eq!(rects.len(), LINKS.len());
        let first = &page.links[0];
        assert_eq!(rects[0].left, first.col as f32 * 8.0);
        assert_eq!(rects[0].height, 16.0);
    }

    #[test]
    fn narrow_terminal_drops_links_that_do_not_fit() {
        let page = Page::layout(30, 40);
        assert!(page.links.len() < LINKS.len());
    }

    #[test]
    fn button_sits_in_top_right() {
        let page = Page::layout(80, 24);
        assert!(page.button_hit(71, 0));
        assert!(page.button_hit(79 - 1, 0));
        assert!(!page.button_hit(10, 0));
        assert!(!page.button_hit(75, 1));
    }

    #[test]
    fn theme_flag_flips() {
        let f = ThemeFlag::new(false);
        f.flip();
        assert!(f.is_light());
    }
}
