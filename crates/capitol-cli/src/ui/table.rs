//! Paged table pane shared by the application and claim lists.

use capitol_core::table::{HeaderCell, SortDirection, TablePage, TableRender};
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::status_style;

/// Columns whose cells are drawn as status badges.
const STATUS_COLUMNS: [&str; 2] = ["status", "approval_status"];

/// Render `render` into `area` with a bordered block titled `title`.
pub fn draw(
  f: &mut Frame,
  area: Rect,
  title: &str,
  render: &TableRender,
  cursor: usize,
  filter_active: bool,
) {
  let block = Block::default()
    .title(title.to_string())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let TableRender::Loaded(page) = render else {
    let style = match render {
      TableRender::Error => Style::default().fg(Color::Red),
      _ => Style::default().fg(Color::DarkGray),
    };
    f.render_widget(
      Paragraph::new(render.placeholder().unwrap_or_default())
        .style(style)
        .alignment(Alignment::Center),
      inner,
    );
    return;
  };

  let parts = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // search
      Constraint::Min(0),    // rows
      Constraint::Length(1), // pagination
    ])
    .split(inner);

  draw_search(f, parts[0], page, filter_active);
  draw_rows(f, parts[1], page, cursor);
  draw_pagination(f, parts[2], page);
}

fn draw_search(f: &mut Frame, area: Rect, page: &TablePage, filter_active: bool) {
  let text = page.search.as_deref().unwrap_or_default();
  let line = if filter_active {
    Line::from(vec![
      Span::styled("Search: ", Style::default().fg(Color::Yellow)),
      Span::raw(format!("{text}_")),
    ])
  } else if text.is_empty() {
    Line::from(Span::styled(
      "Search by name… (/)",
      Style::default().fg(Color::DarkGray),
    ))
  } else {
    Line::from(vec![
      Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
      Span::raw(text.to_string()),
    ])
  };
  f.render_widget(Paragraph::new(line), area);
}

fn header_label(position: usize, header: &HeaderCell) -> String {
  let arrow = match header.direction {
    Some(SortDirection::Asc) => " ▲",
    Some(SortDirection::Desc) => " ▼",
    None => "",
  };
  if header.sortable {
    format!("{} {}{arrow}", position + 1, header.label)
  } else {
    header.label.to_string()
  }
}

fn draw_rows(f: &mut Frame, area: Rect, page: &TablePage, cursor: usize) {
  if page.rows.is_empty() {
    f.render_widget(
      Paragraph::new("No results.")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center),
      area,
    );
    return;
  }

  let header = Row::new(
    page
      .headers
      .iter()
      .enumerate()
      .map(|(i, h)| Cell::from(header_label(i, h))),
  )
  .style(
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let rows = page.rows.iter().map(|row| {
    Row::new(row.cells.iter().zip(&page.headers).map(|(text, header)| {
      if STATUS_COLUMNS.contains(&header.id) {
        Cell::from(Span::styled(text.clone(), status_style(text)))
      } else {
        Cell::from(text.clone())
      }
    }))
  });

  let widths = vec![Constraint::Fill(1); page.headers.len()];
  let mut state = TableState::default();
  state.select(Some(cursor));

  f.render_stateful_widget(
    Table::new(rows, widths).header(header).row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}

fn draw_pagination(f: &mut Frame, area: Rect, page: &TablePage) {
  let nav = |label: &'static str, enabled: bool| {
    let style = if enabled {
      Style::default().fg(Color::White)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    Span::styled(label, style)
  };

  let line = Line::from(vec![
    Span::raw(page.summary()),
    Span::raw("   "),
    nav("[ prev", page.can_previous),
    Span::raw("  "),
    nav("next ]", page.can_next),
  ]);
  f.render_widget(Paragraph::new(line), area);
}
