//! Discover screen — the swipeable card and its empty/error states.

use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use spark_discover::{
  card::{BannerSlot, CardView, ErrorCard, NO_MORE_PROFILES, PhotoSlot},
  gesture::Offset,
  screen::DiscoverView,
};

use super::rgb;

const CARD_WIDTH: u16 = 44;
const CARD_HEIGHT: u16 = 18;

// ─── Public entry ─────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, area: Rect, view: &DiscoverView) {
  match view {
    DiscoverView::Loading => draw_notice(f, area, "Loading profiles…", None),
    DiscoverView::Card { card, offset, scale } => {
      if let Some(rect) = card_rect(area, *offset, *scale) {
        draw_card(f, rect, card, *offset);
      }
    }
    DiscoverView::Exhausted => draw_notice(f, area, NO_MORE_PROFILES, Some("Reload [r]")),
    DiscoverView::LoadFailed(card) | DiscoverView::RenderFailed(card) => {
      draw_error(f, area, card);
    }
  }
}

/// Where the card lands once dragged by `offset` and scaled by `scale`,
/// clipped to `area`. `None` when it has left the area entirely.
fn card_rect(area: Rect, offset: Offset, scale: f32) -> Option<Rect> {
  let base_w = CARD_WIDTH.min(area.width.saturating_sub(2));
  let base_h = CARD_HEIGHT.min(area.height);
  let w = (f32::from(base_w) * scale).round() as i32;
  let h = (f32::from(base_h) * scale).round() as i32;

  let x = i32::from(area.x) + (i32::from(area.width) - w) / 2 + offset.x.round() as i32;
  let y = i32::from(area.y) + (i32::from(area.height) - h) / 2 + offset.y.round() as i32;

  let left = x.max(i32::from(area.x));
  let top = y.max(i32::from(area.y));
  let right = (x + w).min(i32::from(area.right()));
  let bottom = (y + h).min(i32::from(area.bottom()));
  if right <= left || bottom <= top {
    return None;
  }
  Some(Rect::new(
    left as u16,
    top as u16,
    (right - left) as u16,
    (bottom - top) as u16,
  ))
}

// ─── Card ─────────────────────────────────────────────────────────────────────

fn draw_card(f: &mut Frame, area: Rect, card: &CardView, offset: Offset) {
  let background = rgb(card.background);

  // Tint the border with the direction the card is heading.
  let border = if offset.x > 0.5 {
    Color::Green
  } else if offset.x < -0.5 {
    Color::Red
  } else {
    Color::White
  };

  let block = Block::default()
    .borders(Borders::ALL)
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border))
    .style(Style::default().bg(background).fg(Color::White));
  let inner = block.inner(area);
  f.render_widget(Clear, area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();

  lines.push(match &card.photo {
    PhotoSlot::Url(url) => Line::from(Span::styled(
      format!("▣ {url}"),
      Style::default().fg(Color::Gray),
    )),
    PhotoSlot::Placeholder => Line::from(Span::styled(
      "◯  no photo",
      Style::default().fg(Color::Gray),
    )),
  });
  lines.push(Line::from(""));

  lines.push(Line::from(Span::styled(
    card.name.clone(),
    Style::default().add_modifier(Modifier::BOLD),
  )));
  lines.push(Line::from(format!("Age: {}", card.age)));
  lines.push(Line::from(""));

  match &card.banners {
    BannerSlot::Chips(chips) => {
      for chip in chips {
        let bg = chip.gradient.first().copied().map_or(background, rgb);
        lines.push(Line::from(Span::styled(
          format!(" {}: {} ", chip.label, chip.value),
          Style::default().fg(rgb(chip.text)).bg(bg),
        )));
      }
    }
    BannerSlot::Empty(message) => lines.push(Line::from(Span::styled(
      *message,
      Style::default().add_modifier(Modifier::ITALIC),
    ))),
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    card.instructions,
    Style::default().fg(Color::Gray),
  )));

  f.render_widget(
    Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true }),
    inner,
  );
}

// ─── States ───────────────────────────────────────────────────────────────────

fn draw_notice(f: &mut Frame, area: Rect, message: &str, action: Option<&str>) {
  let mut lines = vec![Line::from(Span::styled(
    message.to_string(),
    Style::default().add_modifier(Modifier::BOLD),
  ))];
  if let Some(action) = action {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      action.to_string(),
      Style::default().fg(Color::Cyan),
    )));
  }
  f.render_widget(
    Paragraph::new(lines).alignment(Alignment::Center),
    centered_rows(area, 3),
  );
}

fn draw_error(f: &mut Frame, area: Rect, card: &ErrorCard) {
  let lines = vec![
    Line::from(Span::styled(
      card.message.clone(),
      Style::default().fg(Color::Red),
    )),
    Line::from(""),
    Line::from(Span::styled(
      format!("{} [r]", card.action),
      Style::default().fg(Color::Cyan),
    )),
  ];
  f.render_widget(
    Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true }),
    centered_rows(area, 5),
  );
}

fn centered_rows(area: Rect, height: u16) -> Rect {
  let height = height.min(area.height);
  Rect::new(area.x, area.y + (area.height - height) / 2, area.width, height)
}

#[cfg(test)]
mod tests {
  use super::*;

  const AREA: Rect = Rect { x: 0, y: 1, width: 80, height: 24 };

  #[test]
  fn resting_card_is_centred() {
    let rect = card_rect(AREA, Offset::ZERO, 1.0).unwrap();
    assert_eq!(rect, Rect::new(18, 4, 44, 18));
  }

  #[test]
  fn dragged_card_is_clipped_to_the_body() {
    let rect = card_rect(AREA, Offset::new(30.0, 0.0), 1.0).unwrap();
    assert_eq!(rect.x, 48);
    assert_eq!(rect.right(), 80);
  }

  #[test]
  fn card_past_the_edge_is_not_drawn() {
    assert_eq!(card_rect(AREA, Offset::new(120.0, 0.0), 1.0), None);
    assert_eq!(card_rect(AREA, Offset::new(-120.0, 0.0), 1.0), None);
  }

  #[test]
  fn lifted_card_grows() {
    let rect = card_rect(AREA, Offset::ZERO, 1.05).unwrap();
    assert_eq!(rect.width, 46);
    assert_eq!(rect.height, 19);
  }
}
