//! HomeView: renders the rotating content cards.
//!
//! Pure content-to-frame mapping, same contract as `GameView`.

use crossterm::style::Color;
use serde_json::Value;

use crate::content::ContentItem;
use crate::term::fb::{Frame, TextStyle};
use crate::term::Viewport;

/// What the home screen shows this session.
#[derive(Debug, Clone, Default)]
pub struct HomeContent {
    pub quote: Option<ContentItem>,
    pub exercise: Option<ContentItem>,
    pub status: String,
}

#[derive(Default)]
pub struct HomeView;

impl HomeView {
    pub fn render(&self, content: &HomeContent, viewport: Viewport) -> Frame {
        let mut frame = Frame::new(viewport.width, viewport.height);

        let title = TextStyle::fg(Color::Rgb {
            r: 150,
            g: 200,
            b: 180,
        })
        .bold();
        let body = TextStyle::plain();
        let dim = TextStyle::plain().dim();

        let margin = 4u16;
        let width = viewport.width.saturating_sub(margin * 2) as usize;
        let mut y = 2;

        frame.text(margin, y, "respite", title);
        y += 2;

        if let Some(quote) = &content.quote {
            y = wrap_text(&mut frame, margin, y, width, &quote.display_text(), body);
            if let Some(author) = quote.payload.get("author").and_then(Value::as_str) {
                frame.text(margin + 2, y, &format!("— {author}"), dim);
                y += 1;
            }
            y += 1;
        }

        if let Some(exercise) = &content.exercise {
            frame.text(margin, y, "try this:", title);
            y += 1;
            y = wrap_text(&mut frame, margin, y, width, &exercise.display_text(), body);
            if let Some(prompt) = exercise.payload.get("prompt").and_then(Value::as_str) {
                y = wrap_text(&mut frame, margin + 2, y, width.saturating_sub(2), prompt, dim);
            }
            y += 1;
        }

        if !content.status.is_empty() {
            frame.text(margin, y + 1, &content.status, dim);
        }

        let hints = "tab: play  ·  n: more content  ·  q: quit";
        frame.text(margin, viewport.height.saturating_sub(2), hints, dim);

        frame
    }
}

/// Greedy word wrap; returns the row after the last printed line.
fn wrap_text(
    frame: &mut Frame,
    x: u16,
    mut y: u16,
    width: usize,
    text: &str,
    style: TextStyle,
) -> u16 {
    if width == 0 {
        return y;
    }
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            frame.text(x, y, &line, style);
            y += 1;
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        frame.text(x, y, &line, style);
        y += 1;
    }
    y
}
