//! Settings — connection details and logout.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use spark_core::source::ProfileSource;

use crate::app::App;

pub fn draw<S: ProfileSource + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let block = Block::default()
    .title(" Settings ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let key = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let profile_id = app
    .viewer
    .id
    .as_ref()
    .map_or_else(|| "(not found)".to_string(), ToString::to_string);

  let lines = vec![
    Line::from(vec![
      Span::styled(format!("{:<14}", "Signed in as"), key),
      Span::raw(app.viewer.email.clone()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<14}", "Profile id"), key),
      Span::raw(profile_id),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<14}", "Profiles from"), key),
      Span::raw(app.source_label.clone()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<14}", "In feed"), key),
      Span::raw(app.discover.queue().len().to_string()),
    ]),
    Line::from(""),
    Line::from(Span::styled(
      "[L] Log out",
      Style::default().fg(Color::Red),
    )),
  ];

  f.render_widget(Paragraph::new(lines), inner);
}
