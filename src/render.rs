use backdrop::{Point, Rgb, Rgba, Surface};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

/// Engine pixels per braille dot. A cell is 2x4 dots, so 8x16 engine pixels.
pub(crate) const PX_PER_DOT: f32 = 4.0;
pub(crate) const CELL_W_PX: f32 = 2.0 * PX_PER_DOT;
pub(crate) const CELL_H_PX: f32 = 4.0 * PX_PER_DOT;

/// Dots fainter than this stay blank.
const INK_ALPHA: u8 = 6;

pub(crate) fn rgb_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Centre of a terminal cell in engine pixels.
pub(crate) fn cell_center_px(col: u16, row: u16) -> Point {
    Point::new(
        col as f32 * CELL_W_PX + CELL_W_PX * 0.5,
        row as f32 * CELL_H_PX + CELL_H_PX * 0.5,
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Braille dot canvas that the engine draws into.
///
/// Dots start transparent on every clear; the background colour is kept
/// aside and only mixed in when dots are folded into terminal cells.
pub(crate) struct BrailleSurface {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
    pub(crate) bg: Rgb,
}

impl BrailleSurface {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        let w = cols as u32 * 2;
        let h = rows as u32 * 4;
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
            bg: Rgb::default(),
        }
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
}

impl Surface for BrailleSurface {
    fn size(&self) -> (f32, f32) {
        (self.w as f32 * PX_PER_DOT, self.h as f32 * PX_PER_DOT)
    }

    fn clear(&mut self, bg: Rgb) {
        self.bg = bg;
        self.px.fill(Pixel::default());
    }

    /// Rasterises a stroke in dot space, compositing each dot "over" what
    /// earlier strokes left there this frame.
    fn line(&mut self, from: Point, to: Point, color: Rgba) {
        let sa = (color.a / 255.0).clamp(0.0, 1.0);
        if !(sa * 255.0 >= 0.5) {
            return;
        }
        let ink = [color.r, color.g, color.b].map(|c| c as f32 / 255.0);

        let (x0, y0) = (from.x / PX_PER_DOT, from.y / PX_PER_DOT);
        let (dx, dy) = (to.x / PX_PER_DOT - x0, to.y / PX_PER_DOT - y0);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;

        for k in 0..steps {
            let t = k as f32 / steps as f32;
            let (x, y) = ((x0 + dx * t).floor(), (y0 + dy * t).floor());
            if x < 0.0 || y < 0.0 || x >= self.w as f32 || y >= self.h as f32 {
                continue;
            }
            let i = self.idx(x as u32, y as u32);
            let dst = self.px[i];
            let da = dst.a as f32 / 255.0;
            let keep = da * (1.0 - sa);
            let out_a = sa + keep;

            let over = |src: f32, under: u8| {
                let v = (src * sa + under as f32 / 255.0 * keep) / out_a;
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            };
            self.px[i] = Pixel {
                r: over(ink[0], dst.r),
                g: over(ink[1], dst.g),
                b: over(ink[2], dst.b),
                a: (out_a.min(1.0) * 255.0).round() as u8,
            };
        }
    }
}

/* -----------------------------
   Braille encoding: 2×4 dots -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

fn mix(bg: Rgb, r: u32, g: u32, b: u32, a: f32) -> Color {
    let m = |fg: u32, bg: u8| -> u8 {
        let v = bg as f32 + (fg as f32 - bg as f32) * a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Color::Rgb {
        r: m(r, bg.r),
        g: m(g, bg.g),
        b: m(b, bg.b),
    }
}

/// Folds dots into braille cells. Stroke opacity becomes the blend between
/// the ink colour and the background, since a terminal cell has one colour.
pub(crate) fn canvas_to_cells(canvas: &BrailleSurface, out: &mut CellBuffer) {
    let cols = out.w as u32;
    let rows = out.h as u32;
    let bg = rgb_color(canvas.bg);

    for cy in 0..rows {
        for cx in 0..cols {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut mask: u8 = 0;
            let mut sum_r: u32 = 0;
            let mut sum_g: u32 = 0;
            let mut sum_b: u32 = 0;
            let mut sum_a: u32 = 0;
            let mut ink_count: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = px0 + dx;
                    let y = py0 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[canvas.idx(x, y)];
                    if p.a >= INK_ALPHA {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        sum_a += p.a as u32;
                        ink_count += 1;
                    }
                }
            }

            let cell = if ink_count == 0 {
                Cell {
                    ch: ' ',
                    fg: bg,
                    bg,
                }
            } else {
                let n = ink_count;
                let a = (sum_a / n) as f32 / 255.0;
                Cell {
                    ch: char::from_u32(0x2800 + (mask as u32)).unwrap_or(' '),
                    fg: mix(canvas.bg, sum_r / n, sum_g / n, sum_b / n, a),
                    bg,
                }
            };
            out.set(cx as u16, cy as u16, cell);
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

/// Text over the animation: keeps the background of whatever is underneath.
pub(crate) fn draw_text_over(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        let Some(under) = buf.get(xx, y) else {
            break;
        };
        buf.set(xx, y, Cell { ch, fg, bg: under.bg });
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) surface: BrailleSurface,
}

impl Terminal {
    pub(crate) fn begin(cols: u16, rows: u16) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            EnableMouseCapture,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            surface: BrailleSurface::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            DisableMouseCapture,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize(&mut self, c: u16, r: u16) -> bool {
        if c == self.cols && r == self.rows {
            return false;
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        let bg = self.surface.bg;
        self.surface = BrailleSurface::new(c, r);
        self.surface.bg = bg;
        true
    }

    /// Writes the current buffer, skipping cells unchanged since the last
    /// present when `diff_only` is set. Cursor moves are only queued when a
    /// run of written cells breaks.
    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let cols = self.cols.max(1) as usize;
        let mut pen: Option<(Color, Color)> = None;
        let mut cursor_at: Option<usize> = None;

        for (i, (c, old)) in self.cur.cells.iter().zip(&self.prev.cells).enumerate() {
            if diff_only && c == old {
                continue;
            }
            if cursor_at != Some(i) {
                queue!(self.out, cursor::MoveTo((i % cols) as u16, (i / cols) as u16))?;
            }
            match pen {
                Some((fg, bg)) if fg == c.fg && bg == c.bg => {}
                Some((fg, _)) if fg == c.fg => queue!(self.out, SetBackgroundColor(c.bg))?,
                Some((_, bg)) if bg == c.bg => queue!(self.out, SetForegroundColor(c.fg))?,
                _ => queue!(
                    self.out,
                    SetForegroundColor(c.fg),
                    SetBackgroundColor(c.bg)
                )?,
            }
            pen = Some((c.fg, c.bg));
            queue!(self.out, Print(c.ch))?;
            // a cell written in the last column wraps nowhere (line wrap is off)
            cursor_at = if (i + 1) % cols == 0 { None } else { Some(i + 1) };
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_reports_engine_pixels() {
        let s = BrailleSurface::new(10, 5);
        assert_eq!(s.size(), (80.0, 80.0));
    }

    #[test]
    fn diagonal_stroke_inks_dots() {
        let mut s = BrailleSurface::new(4, 2);
        s.clear(Rgb::new(0, 0, 0));
        let c = Rgba::from_rgb(Rgb::new(120, 100, 200), 200.0);
        s.line(Point::new(0.0, 0.0), Point::new(16.0, 16.0), c);

        let mut cells = CellBuffer::new(4, 2);
        canvas_to_cells(&s, &mut cells);
        let first = cells.get(0, 0).map(|c| c.ch);
        assert_ne!(first, Some(' '));
    }

    #[test]
    fn transparent_stroke_is_skipped() {
        let mut s = BrailleSurface::new(2, 2);
        s.clear(Rgb::default());
        s.line(
            Point::new(0.0, 0.0),
            Point::new(8.0, 8.0),
            Rgba::from_rgb(Rgb::new(255, 255, 255), 0.0),
        );
        assert!(s.px.iter().all(|p| p.a == 0));
    }

    #[test]
    fn overlapping_strokes_composite_over() {
        let mut s = BrailleSurface::new(2, 2);
        s.clear(Rgb::default());
        let dot = (Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        s.line(dot.0, dot.1, Rgba::from_rgb(Rgb::new(255, 0, 0), 102.0));
        assert_eq!(s.px[0].a, 102);

        s.line(dot.0, dot.1, Rgba::from_rgb(Rgb::new(0, 0, 255), 102.0));
        let p = s.px[0];
        assert_eq!(p.a, 163);
        assert!(p.r > 0 && p.b > p.r);
        assert!(s.px[1..].iter().all(|p| p.a == 0));
    }
}
