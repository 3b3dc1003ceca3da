//! Depth-tested cell buffer with diff flushing

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
};
use unicode_width::UnicodeWidthChar;

pub const BACKGROUND: Color = Color::Rgb { r: 5, g: 7, b: 12 };

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    symbol: char,
    fg: Color,
    bg: Color,
    depth: f32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: ' ',
            fg: Color::White,
            bg: BACKGROUND,
            depth: f32::MAX,
        }
    }
}

/// Two frames of cells; only changed cells are written on flush
#[derive(Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    buffer: Vec<Cell>,
    prev_buffer: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            buffer: vec![Cell::default(); size],
            prev_buffer: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize and force a full redraw on the next flush
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if (x as u32) < self.width && (y as u32) < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.buffer {
            *cell = Cell::default();
        }
    }

    /// Set a cell if it is nearer than what is already there
    pub fn plot(&mut self, x: u16, y: u16, symbol: char, fg: Color, depth: f32) {
        if let Some(idx) = self.index(x, y) {
            let cell = &mut self.buffer[idx];
            if depth < cell.depth {
                cell.symbol = symbol;
                cell.fg = fg;
                cell.depth = depth;
            }
        }
    }

    /// Draw a depth-interpolated line; `symbol` overrides the slope glyphs
    pub fn line(
        &mut self,
        (x1, y1, d1): (u16, u16, f32),
        (x2, y2, d2): (u16, u16, f32),
        symbol: Option<char>,
        fg: Color,
    ) {
        let dx = (x2 as i32 - x1 as i32).abs();
        let dy = -(y2 as i32 - y1 as i32).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x1 as i32;
        let mut y = y1 as i32;
        let steps = dx.max(-dy) as f32;
        let glyph = symbol.unwrap_or(if dx > -dy * 2 {
            '─'
        } else if -dy > dx * 2 {
            '│'
        } else if (sx > 0) == (sy > 0) {
            '╲'
        } else {
            '╱'
        });

        loop {
            let t = if steps > 0.0 {
                ((x - x1 as i32).abs().max((y - y1 as i32).abs())) as f32 / steps
            } else {
                0.0
            };
            if x >= 0 && y >= 0 {
                self.plot(x as u16, y as u16, glyph, fg, d1 + (d2 - d1) * t);
            }

            if x == x2 as i32 && y == y2 as i32 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Overlay text on top of everything; wide glyphs take two cells
    pub fn text(&mut self, x: u16, y: u16, text: &str, fg: Color) {
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if col as u32 + w as u32 > self.width {
                break;
            }
            if let Some(idx) = self.index(col, y) {
                let cell = &mut self.buffer[idx];
                cell.symbol = ch;
                cell.fg = fg;
                cell.depth = 0.0;
            }
            col += w;
        }
    }

    pub fn symbol_at(&self, x: u16, y: u16) -> Option<char> {
        self.index(x, y).map(|idx| self.buffer[idx].symbol)
    }

    /// Write changed cells to `out` and keep this frame for the next diff
    pub fn flush(&mut self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::Hide)?;
        for y in 0..self.height as u16 {
            for x in 0..self.width as u16 {
                let Some(idx) = self.index(x, y) else {
                    continue;
                };
                let cell = &self.buffer[idx];
                let changed = self.prev_buffer.get(idx).map_or(true, |prev| {
                    prev.symbol != cell.symbol || prev.fg != cell.fg || prev.bg != cell.bg
                });
                if changed {
                    queue!(
                        out,
                        cursor::MoveTo(x, y),
                        SetForegroundColor(cell.fg),
                        SetBackgroundColor(cell.bg),
                        Print(cell.symbol)
                    )?;
                }
            }
        }
        out.flush()?;
        self.prev_buffer = self.buffer.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut canvas = Canvas::new(4, 2);
        canvas.plot(1, 1, 'a', Color::White, 0.5);
        canvas.plot(1, 1, 'b', Color::White, 0.8);
        canvas.plot(1, 1, 'c', Color::White, 0.2);
        assert_eq!(canvas.symbol_at(1, 1), Some('c'));
    }

    #[test]
    fn test_line_reaches_both_ends() {
        let mut canvas = Canvas::new(10, 5);
        canvas.line((0, 0, 0.5), (9, 4, 0.5), None, Color::White);
        assert_ne!(canvas.symbol_at(0, 0), Some(' '));
        assert_ne!(canvas.symbol_at(9, 4), Some(' '));
    }

    #[test]
    fn test_text_clips_at_edge() {
        let mut canvas = Canvas::new(3, 1);
        canvas.text(1, 0, "abc", Color::White);
        assert_eq!(canvas.symbol_at(1, 0), Some('a'));
        assert_eq!(canvas.symbol_at(2, 0), Some('b'));
    }

    #[test]
    fn test_second_flush_writes_nothing_new() {
        let mut canvas = Canvas::new(3, 1);
        canvas.text(0, 0, "hi", Color::White);
        let mut first = Vec::new();
        canvas.flush(&mut first).unwrap();

        let mut second = Vec::new();
        canvas.flush(&mut second).unwrap();
        assert!(second.len() < first.len());
    }
}
