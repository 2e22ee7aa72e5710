//! Application detail — vehicle and driver risk assessment plus decisions.

use capitol_core::{
  details::{ApplicationDetails, DriverRiskAssessment, VehicleRiskAssessment, format_risk_score},
  record::ApplicationStatus,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{risk_style, status_style};
use crate::app::App;

// ─── Public entry ─────────────────────────────────────────────────────────────

pub fn draw<S>(f: &mut Frame, area: Rect, app: &App<S>, id: u64) {
  let block = Block::default()
    .title(format!(" Application {id} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let query = &app.application_detail;
  let Some(details) = query.data.as_ref().filter(|_| query.error.is_none()) else {
    let message = if query.error.is_some() {
      "Error loading application details."
    } else {
      "Loading application details..."
    };
    f.render_widget(
      Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(2), // status
      Constraint::Min(0),    // assessments
      Constraint::Length(2), // actions
    ])
    .split(inner);

  draw_status(f, rows[0], details, app.notification.as_deref());

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(rows[1]);
  draw_vehicle(f, cols[0], &details.vehicle_risk_assessment);
  draw_driver(f, cols[1], &details.driver_risk_assessment);

  draw_actions(f, rows[2], app.mutation_pending);
}

// ─── Sections ─────────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, details: &ApplicationDetails, notification: Option<&str>) {
  let status = details.status.unwrap_or(ApplicationStatus::Pending);
  let mut spans = vec![
    Span::styled("Status: ", label_style()),
    Span::styled(status.to_string(), status_style(status.as_str())),
  ];
  if let Some(note) = notification {
    spans.push(Span::raw("   "));
    spans.push(Span::styled(
      format!("Status updated: {note}"),
      status_style(note).add_modifier(Modifier::ITALIC),
    ));
  }
  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_vehicle(f: &mut Frame, area: Rect, vehicle: &VehicleRiskAssessment) {
  let lines = vec![
    field("Vehicle", vehicle.vehicle_name.clone()),
    field("Age", format!("{} years", vehicle.construction_year_diff)),
    field("VIN", vehicle.vin.clone()),
    field("CO2", vehicle.co2_emissions.clone()),
    Line::from(""),
    score_line(vehicle.risk_score),
  ];
  draw_section(f, area, " Vehicle Risk Assessment ", lines);
}

fn draw_driver(f: &mut Frame, area: Rect, driver: &DriverRiskAssessment) {
  let age = driver
    .age
    .map_or_else(|| "N/A".to_string(), |age| age.to_string());
  let lines = vec![
    field("Name", driver.name.clone()),
    field("License", driver.license.clone()),
    field("Age", age),
    field(
      "Past claims",
      format!("{} ({})", driver.past_claims.incidents, driver.past_claims.period),
    ),
    Line::from(""),
    score_line(driver.risk_score),
  ];
  draw_section(f, area, " Driver Risk Assessment ", lines);
}

fn draw_actions(f: &mut Frame, area: Rect, pending: bool) {
  let style = if pending {
    Style::default().fg(Color::DarkGray)
  } else {
    Style::default().fg(Color::White)
  };
  let line = Line::from(vec![
    Span::styled("[a] Approve   ", style),
    Span::styled("[d] Decline   ", style),
    Span::styled("[v] Request Review", style),
  ]);
  f.render_widget(Paragraph::new(line), area);
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn draw_section(f: &mut Frame, area: Rect, title: &'static str, lines: Vec<Line<'static>>) {
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
    area,
  );
}

fn label_style() -> Style {
  Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD)
}

fn field(label: &'static str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{label:<14}"), label_style()),
    Span::raw(value),
  ])
}

fn score_line(score: Option<f64>) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{:<14}", "Risk score"), label_style()),
    Span::styled(format_risk_score(score), risk_style(score)),
  ])
}
