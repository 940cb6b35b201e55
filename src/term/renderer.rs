//! Pushes frames to the real terminal.
//!
//! Full redraw per frame, printed as one run of text per style change
//! rather than per glyph. The frames here are small enough that diffing
//! buys nothing.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use crate::term::fb::{Frame, TextStyle};

pub struct TerminalRenderer {
    out: io::Stdout,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }

    /// Switch to raw mode on the alternate screen with the cursor hidden.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        queue!(
            self.out,
            terminal::EnterAlternateScreen,
            terminal::DisableLineWrap,
            cursor::Hide
        )?;
        self.out.flush()?;
        Ok(())
    }

    /// Undo everything `enter` did. Safe to call on any exit path.
    pub fn exit(&mut self) -> Result<()> {
        queue!(
            self.out,
            ResetColor,
            SetAttribute(Attribute::Reset),
            terminal::EnableLineWrap,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Write a frame to the terminal, row by row.
    pub fn present(&mut self, frame: &Frame) -> Result<()> {
        let mut active: Option<TextStyle> = None;
        let mut run = String::with_capacity(frame.cols() as usize);

        for y in 0..frame.rows() {
            queue!(self.out, cursor::MoveTo(0, y))?;

            for glyph in frame.line(y) {
                if active != Some(glyph.style) {
                    if !run.is_empty() {
                        queue!(self.out, Print(run.as_str()))?;
                        run.clear();
                    }
                    self.switch_style(glyph.style)?;
                    active = Some(glyph.style);
                }
                run.push(glyph.ch);
            }
            if !run.is_empty() {
                queue!(self.out, Print(run.as_str()))?;
                run.clear();
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn switch_style(&mut self, style: TextStyle) -> Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            queue!(self.out, SetAttribute(Attribute::Dim))?;
        }
        queue!(
            self.out,
            SetForegroundColor(style.fg),
            SetBackgroundColor(style.bg)
        )?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}
