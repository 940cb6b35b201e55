//! GameView: maps a `GameSnapshot` into a frame.
//!
//! Pure snapshot-to-frame mapping, no I/O.

use crossterm::style::Color;

use crate::core::snapshot::GameSnapshot;
use crate::term::fb::{Frame, TextStyle};
use crate::term::Viewport;
use crate::types::PieceKind;

const WELL_BG: Color = Color::Rgb {
    r: 18,
    g: 18,
    b: 26,
};

fn kind_color(kind: PieceKind) -> Color {
    let (r, g, b) = match kind {
        PieceKind::I => (90, 200, 220),
        PieceKind::O => (230, 210, 90),
        PieceKind::T => (180, 110, 220),
        PieceKind::S => (110, 210, 120),
        PieceKind::Z => (225, 100, 100),
        PieceKind::J => (100, 130, 230),
        PieceKind::L => (235, 160, 80),
    };
    Color::Rgb { r, g, b }
}

/// Renders the well, the ghost, the active piece, and the score sidebar.
pub struct GameView {
    /// Terminal columns per board cell; 2 compensates for glyph aspect.
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        Self { cell_w: 2 }
    }
}

impl GameView {
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> Frame {
        let mut frame = Frame::new(viewport.width, viewport.height);

        let well_w = snap.cols as u16 * self.cell_w;
        let well_h = snap.rows as u16;
        let ox = viewport.width.saturating_sub(well_w + 2) / 2;
        let oy = viewport.height.saturating_sub(well_h + 2) / 2;

        self.frame_well(&mut frame, ox, oy, well_w, well_h);

        // Locked cells.
        for y in 0..snap.rows {
            for x in 0..snap.cols {
                if let Some(kind) = snap.cell(x, y) {
                    self.block(&mut frame, ox, oy, x, y, '█', TextStyle::fg(kind_color(kind)).on(WELL_BG));
                }
            }
        }

        // Ghost first so the active piece paints over it when they meet.
        let ghost = TextStyle::fg(Color::Rgb {
            r: 120,
            g: 120,
            b: 135,
        })
        .on(WELL_BG)
        .dim();
        if let (Some(active), Some(ghost_y)) = (&snap.active, snap.ghost_row) {
            for (c, r) in active.shape.cells() {
                let gx = active.x + c as i8;
                let gy = ghost_y + r as i8;
                if gx >= 0 && gy >= 0 {
                    self.block(&mut frame, ox, oy, gx as u8, gy as u8, '░', ghost);
                }
            }
        }
        if let Some(active) = &snap.active {
            let style = TextStyle::fg(kind_color(active.kind)).on(WELL_BG).bold();
            for (c, r) in active.shape.cells() {
                let gx = active.x + c as i8;
                let gy = active.y + r as i8;
                if gx >= 0 && gy >= 0 {
                    self.block(&mut frame, ox, oy, gx as u8, gy as u8, '█', style);
                }
            }
        }

        self.sidebar(&mut frame, snap, ox + well_w + 4, oy + 1);

        if snap.game_over {
            self.banner(&mut frame, viewport, " game over - r to restart ");
        } else if snap.paused {
            self.banner(&mut frame, viewport, " paused - p to resume ");
        }

        frame
    }

    /// Border box plus the well interior background.
    fn frame_well(&self, frame: &mut Frame, x: u16, y: u16, well_w: u16, well_h: u16) {
        let border = TextStyle::fg(Color::Rgb {
            r: 190,
            g: 190,
            b: 190,
        });
        let w = well_w + 2;
        let h = well_h + 2;

        for dx in 1..w - 1 {
            frame.put(x + dx, y, '─', border);
            frame.put(x + dx, y + h - 1, '─', border);
        }
        for dy in 1..h - 1 {
            frame.put(x, y + dy, '│', border);
            frame.put(x + w - 1, y + dy, '│', border);
        }
        frame.put(x, y, '┌', border);
        frame.put(x + w - 1, y, '┐', border);
        frame.put(x, y + h - 1, '└', border);
        frame.put(x + w - 1, y + h - 1, '┘', border);

        frame.rect(
            x + 1,
            y + 1,
            well_w,
            well_h,
            ' ',
            TextStyle::fg(Color::Rgb {
                r: 70,
                g: 70,
                b: 85,
            })
            .on(WELL_BG),
        );
    }

    /// One board cell, widened to `cell_w` terminal columns.
    fn block(&self, frame: &mut Frame, ox: u16, oy: u16, x: u8, y: u8, ch: char, style: TextStyle) {
        let px = ox + 1 + x as u16 * self.cell_w;
        let py = oy + 1 + y as u16;
        for dx in 0..self.cell_w {
            frame.put(px + dx, py, ch, style);
        }
    }

    fn sidebar(&self, frame: &mut Frame, snap: &GameSnapshot, x: u16, y: u16) {
        let label = TextStyle::plain().dim();
        let value = TextStyle::plain().bold();

        for (i, (name, amount)) in [
            ("score", snap.score),
            ("lines", snap.lines),
            ("level", snap.level),
        ]
        .into_iter()
        .enumerate()
        {
            let row = y + 3 * i as u16;
            frame.text(x, row, name, label);
            frame.text(x, row + 1, &amount.to_string(), value);
        }
    }

    fn banner(&self, frame: &mut Frame, viewport: Viewport, text: &str) {
        let style = TextStyle::fg(Color::Rgb {
            r: 240,
            g: 240,
            b: 240,
        })
        .on(Color::Rgb {
            r: 120,
            g: 40,
            b: 40,
        })
        .bold();
        let x = viewport.width.saturating_sub(text.len() as u16) / 2;
        frame.text(x, viewport.height / 2, text, style);
    }
}
