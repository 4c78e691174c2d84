//! The viewer's own profile, kept live by its listener.

use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use spark_core::{age::age_label, source::ProfileSource};
use spark_discover::card::{ANONYMOUS_NAME, NO_BANNERS_MESSAGE, Rgb};

use super::rgb;
use crate::app::App;

pub fn draw<S: ProfileSource + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let block = Block::default()
    .title(" My profile ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();

  // Background swatch first: it is known even before the profile arrives.
  let swatch = app.background.as_deref().and_then(Rgb::parse);
  let source = if app.background_is_cached { "  (cached)" } else { "" };
  lines.push(match (app.background.as_deref(), swatch) {
    (Some(raw), Some(c)) => Line::from(vec![
      label("Background"),
      Span::styled("      ", Style::default().bg(rgb(c))),
      Span::raw(format!(" {raw}")),
      Span::styled(source, Style::default().fg(Color::DarkGray)),
    ]),
    (Some(raw), None) => Line::from(vec![label("Background"), Span::raw(raw.to_string())]),
    (None, _) => Line::from(vec![label("Background"), dim("not set")]),
  });

  let Some(profile) = &app.own_profile else {
    lines.push(Line::from(""));
    lines.push(Line::from(dim("Your profile has not loaded yet.")));
    f.render_widget(Paragraph::new(lines), inner);
    return;
  };

  let today = Local::now().date_naive();
  lines.push(Line::from(vec![
    label("Name"),
    Span::styled(
      profile
        .display_name()
        .unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
      Style::default().add_modifier(Modifier::BOLD),
    ),
  ]));
  lines.push(Line::from(vec![
    label("Age"),
    Span::raw(age_label(profile.birth_date.as_deref(), today)),
  ]));
  lines.push(Line::from(vec![
    label("Email"),
    Span::raw(profile.email.clone().unwrap_or_default()),
  ]));
  lines.push(Line::from(vec![
    label("Photo"),
    match &profile.profile_photo_url {
      Some(url) => Span::raw(url.clone()),
      None => dim("none"),
    },
  ]));

  lines.push(Line::from(""));
  lines.push(Line::from(label("Banners")));
  if profile.selected_profile_banners.is_empty() {
    lines.push(Line::from(dim(NO_BANNERS_MESSAGE)));
  }
  for banner in &profile.selected_profile_banners {
    let fg = banner
      .text_color
      .as_deref()
      .and_then(Rgb::parse)
      .map_or(Color::White, rgb);
    let bg = banner
      .gradient_colors
      .first()
      .and_then(|c| Rgb::parse(c))
      .map_or(Color::DarkGray, rgb);
    lines.push(Line::from(Span::styled(
      format!(" {}: {} ", banner.label, banner.value),
      Style::default().fg(fg).bg(bg),
    )));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn label(text: &str) -> Span<'static> {
  Span::styled(
    format!("{text:<12}"),
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )
}

fn dim(text: &str) -> Span<'static> {
  Span::styled(text.to_string(), Style::default().fg(Color::DarkGray))
}
