//! Truecolor pixel buffer shown two pixels per terminal cell.

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    pub const fn halved(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }

    fn term(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

pub struct PixelBuf {
    w: usize,
    h: usize,
    px: Vec<Rgb>,
}

impl PixelBuf {
    /// `rows` terminal rows hold `rows * 2` pixels.
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        let (w, h) = (cols as usize, rows as usize * 2);
        Self {
            w,
            h,
            px: vec![Rgb(0, 0, 0); w * h],
        }
    }

    pub fn resize_terminal(&mut self, cols: u16, rows: u16) {
        self.w = cols as usize;
        self.h = rows as usize * 2;
        self.px.resize(self.w * self.h, Rgb(0, 0, 0));
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for py in y.max(0)..(y + h).min(self.h as i32) {
            for px in x.max(0)..(x + w).min(self.w as i32) {
                self.px[py as usize * self.w + px as usize] = c;
            }
        }
    }

    /// Apply `f` to every pixel.
    pub fn map(&mut self, f: impl Fn(Rgb) -> Rgb) {
        for p in &mut self.px {
            *p = f(*p);
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        for row in 0..rows {
            let mut pen = Pen::default();
            for col in 0..self.w {
                let upper = self.get(col, row * 2);
                let lower = self.get(col, row * 2 + 1);
                if upper == lower {
                    pen.background(out, upper)?;
                    queue!(out, style::Print(' '))?;
                } else {
                    pen.foreground(out, upper)?;
                    pen.background(out, lower)?;
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

/// Remembers the colours already sent on the current row.
#[derive(Default)]
struct Pen {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
}

impl Pen {
    fn foreground(&mut self, out: &mut impl Write, c: Rgb) -> io::Result<()> {
        if self.fg != Some(c) {
            queue!(out, style::SetForegroundColor(c.term()))?;
            self.fg = Some(c);
        }
        Ok(())
    }

    fn background(&mut self, out: &mut impl Write, c: Rgb) -> io::Result<()> {
        if self.bg != Some(c) {
            queue!(out, style::SetBackgroundColor(c.term()))?;
            self.bg = Some(c);
        }
        Ok(())
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

pub const DIGIT_H: i32 = 5;

/// Draw `n` centred on `cx` with a one-pixel drop shadow.
pub fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb, shadow: Rgb) {
    let text = n.to_string();
    let left = cx - (text.len() as i32 * 4 - 1) / 2;
    for (i, d) in text.bytes().map(|b| (b - b'0') as usize).enumerate() {
        let gx = left + i as i32 * 4;
        for (cell, on) in DIGITS[d].iter().enumerate() {
            if *on == 1 {
                let (px, py) = (gx + (cell % 3) as i32, y + (cell / 3) as i32);
                buf.set(px + 1, py + 1, shadow);
                buf.set(px, py, fg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_rows_double() {
        let buf = PixelBuf::for_terminal(10, 4);
        assert_eq!((buf.width(), buf.height()), (10, 8));
    }

    #[test]
    fn test_set_ignores_out_of_range() {
        let mut buf = PixelBuf::for_terminal(2, 1);
        buf.set(-1, 0, Rgb(1, 1, 1));
        buf.set(2, 0, Rgb(1, 1, 1));
        buf.set(0, 2, Rgb(1, 1, 1));
        buf.fill_rect(-5, -5, 100, 1, Rgb(9, 9, 9));
        assert!((0..2).all(|x| (0..2).all(|y| buf.get(x, y) == Rgb(0, 0, 0))));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut buf = PixelBuf::for_terminal(4, 2);
        buf.fill_rect(2, 2, 10, 10, Rgb(5, 5, 5));
        assert_eq!(buf.get(3, 3), Rgb(5, 5, 5));
        assert_eq!(buf.get(1, 3), Rgb(0, 0, 0));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb(0, 100, 200);
        let b = Rgb(200, 100, 0);
        assert_eq!(Rgb::lerp(a, b, 0), a);
        assert_eq!(Rgb::lerp(a, b, 256), b);
    }

    #[test]
    fn test_render_uses_half_blocks() {
        let mut buf = PixelBuf::for_terminal(2, 1);
        buf.set(0, 0, Rgb(255, 0, 0));
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{2580}'));
        assert!(text.contains(' '));
    }

    #[test]
    fn test_draw_number_marks_pixels() {
        let mut buf = PixelBuf::for_terminal(20, 5);
        draw_number(&mut buf, 10, 1, 10, Rgb(255, 255, 255), Rgb(1, 1, 1));
        let lit = (0..20)
            .flat_map(|x| (0..10).map(move |y| (x, y)))
            .filter(|&(x, y)| buf.get(x, y) == Rgb(255, 255, 255))
            .count();
        // "1" has 8 lit cells and "0" has 12.
        assert_eq!(lit, 20);
    }
}
