//! TUI rendering — orchestrates all screens.

pub mod discover;
pub mod profile;
pub mod settings;

use std::time::Instant;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};
use spark_core::source::ProfileSource;
use spark_discover::card::Rgb;

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: ProfileSource + 'static>(f: &mut Frame, app: &App<S>, now: Instant) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::Discover => discover::draw(f, rows[1], &app.view(now)),
    Screen::Profile => profile::draw(f, rows[1], app),
    Screen::Settings => settings::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

pub(crate) fn rgb(c: Rgb) -> Color { Color::Rgb(c.r, c.g, c.b) }

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S: ProfileSource + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " spark  [p] profile  [s] settings  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{}  {date} ", app.viewer.email),
    Style::default().fg(Color::Gray),
  );

  let pad = header_padding(area.width, left.width(), right.width());
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

/// Spaces between the left and right header text so the right side sits
/// flush with the edge.
fn header_padding(width: u16, left: usize, right: usize) -> usize {
  usize::from(width).saturating_sub(left).saturating_sub(right)
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: ProfileSource + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match app.screen {
    Screen::Discover => (
      "DISCOVER",
      "drag or ←/→ (h/l) swipe  r reload  L log out  q quit",
    ),
    Screen::Profile => ("PROFILE", "Esc back  L log out  q quit"),
    Screen::Settings => ("SETTINGS", "Esc back  L log out  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Magenta)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_padding_never_wraps() {
    assert_eq!(header_padding(80, 30, 20), 30);
    assert_eq!(header_padding(40, 30, 20), 0);
    // Widths past u16::MAX must not truncate into a bogus pad.
    assert_eq!(header_padding(80, 65_540, 0), 0);
  }
}
