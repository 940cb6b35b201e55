//! Text frame the views draw into.
//!
//! A frame is a rows-of-glyphs grid filled by a view each render pass and
//! handed to `TerminalRenderer` whole. Styles reuse crossterm's `Color`
//! directly so no conversion sits between the views and the terminal.

use crossterm::style::Color;

/// Style applied to one glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub dim: bool,
}

impl TextStyle {
    pub const fn plain() -> Self {
        Self {
            fg: Color::Rgb {
                r: 210,
                g: 210,
                b: 214,
            },
            bg: Color::Reset,
            bold: false,
            dim: false,
        }
    }

    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Self::plain()
        }
    }

    pub fn on(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::plain()
    }
}

/// One styled character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub style: TextStyle,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph {
        ch: ' ',
        style: TextStyle::plain(),
    };
}

/// The drawing surface: `rows` lines of `cols` glyphs each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    cols: u16,
    rows: u16,
    lines: Vec<Vec<Glyph>>,
}

impl Frame {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            lines: vec![vec![Glyph::BLANK; cols as usize]; rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// One full line of glyphs; the renderer consumes these row by row.
    pub fn line(&self, y: u16) -> &[Glyph] {
        &self.lines[y as usize]
    }

    pub fn glyph(&self, x: u16, y: u16) -> Option<Glyph> {
        self.lines
            .get(y as usize)
            .and_then(|line| line.get(x as usize))
            .copied()
    }

    /// Place one glyph. Writes outside the frame are dropped.
    pub fn put(&mut self, x: u16, y: u16, ch: char, style: TextStyle) {
        if let Some(slot) = self
            .lines
            .get_mut(y as usize)
            .and_then(|line| line.get_mut(x as usize))
        {
            *slot = Glyph { ch, style };
        }
    }

    /// Write a string left to right from (x, y), clipped at the right edge.
    pub fn text(&mut self, x: u16, y: u16, s: &str, style: TextStyle) {
        for (i, ch) in s.chars().enumerate() {
            self.put(x.saturating_add(i as u16), y, ch, style);
        }
    }

    /// Fill a rectangle with one glyph.
    pub fn rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, style: TextStyle) {
        for dy in 0..h {
            for dx in 0..w {
                self.put(x.saturating_add(dx), y.saturating_add(dy), ch, style);
            }
        }
    }

    /// Every character in row order, concatenated. Test helper, mostly.
    pub fn contents(&self) -> String {
        self.lines
            .iter()
            .flat_map(|line| line.iter().map(|g| g.ch))
            .collect()
    }
}
