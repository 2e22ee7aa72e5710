//! Claim detail pane.

use capitol_core::record::ClaimStatus;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::status_style;
use crate::app::App;

pub fn draw<S>(f: &mut Frame, area: Rect, app: &App<S>, id: u64) {
  let block = Block::default()
    .title(format!(" Claim {id} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let query = &app.claim_detail;
  let Some(claim) = query.data.as_ref().filter(|_| query.error.is_none()) else {
    let message = if query.error.is_some() {
      "Error loading claim details."
    } else {
      "Loading claim details..."
    };
    f.render_widget(
      Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let label = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let field = |name: &'static str, value: String| {
    Line::from(vec![Span::styled(format!("{name:<18}"), label), Span::raw(value)])
  };

  let status = claim
    .approval_status
    .clone()
    .unwrap_or_else(|| ClaimStatus::Pending.to_string());

  let mut lines = vec![
    Line::from(vec![
      Span::styled(format!("{:<18}", "Status"), label),
      Span::styled(status.clone(), status_style(&status)),
    ]),
  ];
  if let Some(note) = &app.notification {
    lines.push(Line::from(Span::styled(
      format!("Status updated: {note}"),
      status_style(note).add_modifier(Modifier::ITALIC),
    )));
  }
  lines.extend([
    Line::from(""),
    field("Claimant", claim.claimant_name.clone()),
    field("Claim type", claim.claim_type.clone()),
    field("Insurance type", claim.insurance_type.clone()),
    field("Insurance ID", claim.insurance_id.to_string()),
    field(
      "Coverage ends",
      claim
        .insurance_end_date
        .clone()
        .unwrap_or_else(|| "N/A".to_string()),
    ),
    Line::from(""),
    Line::from(Span::styled("Accident description", label)),
    Line::from(claim.accident_description.clone()),
    Line::from(""),
  ]);

  let action_style = if app.mutation_pending {
    Style::default().fg(Color::DarkGray)
  } else {
    Style::default().fg(Color::White)
  };
  lines.push(Line::from(Span::styled(
    "[a] Approve   [d] Reject   [v] Request Review",
    action_style,
  )));

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
