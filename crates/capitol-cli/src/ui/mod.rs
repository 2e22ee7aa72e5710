//! TUI rendering — orchestrates all panes.

pub mod application_detail;
pub mod claim_detail;
pub mod table;

use capitol_core::{details::RiskLevel, record::StatusTone};
use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S>(f: &mut Frame, app: &App<S>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Shared styles ────────────────────────────────────────────────────────────

/// Badge style for a status label.
pub fn status_style(label: &str) -> Style {
  let color = match StatusTone::for_label(label) {
    StatusTone::Positive => Color::Green,
    StatusTone::Waiting => Color::Yellow,
    StatusTone::Negative => Color::Red,
    StatusTone::Review => Color::Magenta,
  };
  Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn risk_style(score: Option<f64>) -> Style {
  let color = match score.map(RiskLevel::from_score) {
    Some(RiskLevel::High) => Color::Red,
    Some(RiskLevel::Medium) => Color::Yellow,
    Some(RiskLevel::Low) => Color::Green,
    None => Color::DarkGray,
  };
  Style::default().fg(color)
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let tab = |label: &'static str, active: bool| {
    let style = if active {
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::White)
    };
    Span::styled(format!(" {label} "), style)
  };
  let on_claims = matches!(app.screen, Screen::Claims | Screen::ClaimDetail(_));

  let left = vec![
    Span::styled(
      " capitol  ",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    tab("Applications", !on_claims),
    tab("Claims", on_claims),
  ];
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::DarkGray));

  let left_width: usize = left.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.len());

  let mut spans = left;
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  match app.screen {
    Screen::Applications => table::draw(
      f,
      area,
      " Insurance Applications ",
      &app.application_render(),
      app.application_list.cursor,
      app.filter_active,
    ),
    Screen::Claims => table::draw(
      f,
      area,
      " Liability Claims ",
      &app.claim_render(),
      app.claim_list.cursor,
      app.filter_active,
    ),
    Screen::ApplicationDetail(id) => application_detail::draw(f, area, app, id),
    Screen::ClaimDetail(id) => claim_detail::draw(f, area, app, id),
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match &app.screen {
    Screen::Applications | Screen::Claims if app.filter_active => {
      ("SEARCH", "Type to filter  Esc clear  Enter done")
    }
    Screen::Applications | Screen::Claims => (
      "LIST",
      "jk move  [ ] page  1-9 sort (Alt: add)  / search  Enter open  Tab switch  r refresh  q quit",
    ),
    Screen::ApplicationDetail(_) => (
      "DETAIL",
      "a approve  d decline  v request review  r refresh  Esc back  q quit",
    ),
    Screen::ClaimDetail(_) => (
      "DETAIL",
      "a approve  d reject  v request review  r refresh  Esc back  q quit",
    ),
  };

  let status = if app.mutation_pending {
    "Saving…".to_string()
  } else if !app.status_msg.is_empty() {
    app.status_msg.clone()
  } else {
    hints.to_string()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}
