//! Application state machine and event dispatcher.
//!
//! Key and focus handlers are synchronous: they update view state and return
//! a [`Command`] describing any I/O to perform. The event loop marks the
//! affected query as loading, draws a frame, and then awaits [`App::run`].

use std::sync::Arc;

use anyhow::Context;
use capitol_core::{
  columns::{application_view, claim_view},
  details::{ApplicationDetails, ClaimDetails},
  normalize::{Normalizer, StatusCache},
  record::{ApplicationRecord, ApplicationStatus, ClaimStatus, RawClaim},
  retry::RetryPolicy,
  source::InsuranceSource,
  table::{TableEvent, TablePage, TableRender, TableRow, TableView, ViewState},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;

use crate::fetch::{Query, QueryOptions, fetch_with_retry};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Applications,
  Claims,
  ApplicationDetail(u64),
  ClaimDetail(u64),
}

// ─── Command ──────────────────────────────────────────────────────────────────

/// I/O requested by a key or focus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  None,
  Quit,
  FetchApplications,
  FetchClaims,
  FetchApplication(u64),
  FetchClaim(u64),
  UpdateApplicationStatus { id: u64, status: ApplicationStatus },
  UpdateClaimStatus { id: u64, status: ClaimStatus },
}

// ─── List pane ────────────────────────────────────────────────────────────────

/// A table view together with its interaction state and row cursor.
pub struct ListPane<T> {
  pub view:   TableView<T>,
  pub state:  ViewState,
  /// Row under the cursor, relative to the current page.
  pub cursor: usize,
}

impl<T: TableRow> ListPane<T> {
  fn new(view: TableView<T>) -> Self {
    let state = view.initial_state();
    Self {
      view,
      state,
      cursor: 0,
    }
  }

  /// Feed `event` through the reducer. Anything but a row refresh moves the
  /// cursor back to the top of the page.
  pub fn apply(&mut self, event: TableEvent, rows: &[T]) {
    let keep_cursor = event == TableEvent::RowsChanged;
    self.state = self.view.reduce(self.state.clone(), event, rows);
    if !keep_cursor {
      self.cursor = 0;
    }
    self.clamp_cursor(rows);
  }

  pub fn search(&mut self, text: String, rows: &[T]) {
    self.state = self.view.search(self.state.clone(), text, rows);
    self.cursor = 0;
  }

  /// Current text of the search filter.
  pub fn search_text(&self) -> &str {
    self
      .view
      .search_column()
      .and_then(|column| self.state.filter(column))
      .unwrap_or_default()
  }

  pub fn page(&self, rows: &[T]) -> TablePage { self.view.page(rows, &self.state) }

  pub fn render<E: ?Sized>(&self, rows: &[T], is_loading: bool, error: Option<&E>) -> TableRender {
    self.view.render(rows, &self.state, is_loading, error)
  }

  /// Index into `rows` of the row under the cursor.
  pub fn selected(&self, rows: &[T]) -> Option<usize> {
    self.page(rows).rows.get(self.cursor).map(|row| row.index)
  }

  fn move_cursor(&mut self, down: bool, rows: &[T]) {
    let len = self.page(rows).rows.len();
    if down {
      if self.cursor + 1 < len {
        self.cursor += 1;
      }
    } else {
      self.cursor = self.cursor.saturating_sub(1);
    }
  }

  fn clamp_cursor(&mut self, rows: &[T]) {
    let len = self.page(rows).rows.len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  /// Digit keys toggle the sort of the matching column; `multi` keeps the
  /// existing sort keys.
  fn toggle_sort(&mut self, digit: char, multi: bool, rows: &[T]) {
    let Some(position) = digit.to_digit(10).and_then(|d| (d as usize).checked_sub(1)) else {
      return;
    };
    if let Some(column) = self.view.columns().get(position).map(|c| c.id) {
      self.apply(TableEvent::ToggleSort { column, multi }, rows);
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Records as served, decoded by the normalizer.
  pub applications:     Query<Vec<Value>>,
  /// Normalized rows of `applications`.
  pub application_rows: Vec<ApplicationRecord>,
  pub application_list: ListPane<ApplicationRecord>,
  /// Statuses first seen per application id; outlives refetches.
  pub status_cache:     StatusCache,

  pub claims:     Query<Vec<RawClaim>>,
  pub claim_list: ListPane<RawClaim>,

  pub application_detail: Query<ApplicationDetails>,
  pub claim_detail:       Query<ClaimDetails>,

  /// Whether the user is typing a search query.
  pub filter_active: bool,

  /// Decision just taken on the open detail screen.
  pub notification: Option<String>,

  /// A status update is in flight.
  pub mutation_pending: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub mutation_retry: RetryPolicy,

  pub source: Arc<S>,
}

impl<S> App<S>
where
  S: InsuranceSource,
  S::Error: Into<anyhow::Error>,
{
  /// Create an [`App`] with default query caching and retry behaviour.
  pub fn new(source: S, page_size: usize) -> anyhow::Result<Self> {
    Self::with_options(source, page_size, QueryOptions::default(), RetryPolicy::mutations())
  }

  pub fn with_options(
    source: S,
    page_size: usize,
    options: QueryOptions,
    mutation_retry: RetryPolicy,
  ) -> anyhow::Result<Self> {
    let application_view = application_view(page_size).context("building application table")?;
    let claim_view = claim_view(page_size).context("building claim table")?;
    Ok(Self {
      screen: Screen::Applications,
      applications: Query::new(options),
      application_rows: Vec::new(),
      application_list: ListPane::new(application_view),
      status_cache: StatusCache::new(),
      claims: Query::new(options),
      claim_list: ListPane::new(claim_view),
      application_detail: Query::new(options),
      claim_detail: Query::new(QueryOptions {
        refetch_on_focus: false,
        ..options
      }),
      filter_active: false,
      notification: None,
      mutation_pending: false,
      status_msg: String::new(),
      mutation_retry,
      source: Arc::new(source),
    })
  }

  // ── Mount / focus ─────────────────────────────────────────────────────────

  /// The fetch needed to show the current screen, if its data is stale.
  pub fn mount(&self) -> Command {
    match self.screen {
      Screen::Applications if self.applications.should_fetch_on_mount() => {
        Command::FetchApplications
      }
      Screen::Claims if self.claims.should_fetch_on_mount() => Command::FetchClaims,
      Screen::ApplicationDetail(id) if self.application_detail.should_fetch_on_mount() => {
        Command::FetchApplication(id)
      }
      Screen::ClaimDetail(id) if self.claim_detail.should_fetch_on_mount() => {
        Command::FetchClaim(id)
      }
      _ => Command::None,
    }
  }

  /// The terminal regained focus; refetch the visible data if stale.
  pub fn handle_focus(&self) -> Command {
    match self.screen {
      Screen::Applications if self.applications.should_fetch_on_focus() => {
        Command::FetchApplications
      }
      Screen::Claims if self.claims.should_fetch_on_focus() => Command::FetchClaims,
      Screen::ApplicationDetail(id) if self.application_detail.should_fetch_on_focus() => {
        Command::FetchApplication(id)
      }
      Screen::ClaimDetail(id) if self.claim_detail.should_fetch_on_focus() => {
        Command::FetchClaim(id)
      }
      _ => Command::None,
    }
  }

  /// The fetch behind the current screen, regardless of staleness.
  fn refresh(&self) -> Command {
    match self.screen {
      Screen::Applications => Command::FetchApplications,
      Screen::Claims => Command::FetchClaims,
      Screen::ApplicationDetail(id) => Command::FetchApplication(id),
      Screen::ClaimDetail(id) => Command::FetchClaim(id),
    }
  }

  fn switch_to(&mut self, screen: Screen) -> Command {
    self.screen = screen;
    self.filter_active = false;
    self.mount()
  }

  // ── Commands ──────────────────────────────────────────────────────────────

  /// Mark the query `cmd` will fetch as loading, so the next frame shows it.
  pub fn prepare(&mut self, cmd: &Command) {
    match cmd {
      Command::FetchApplications => self.applications.begin(),
      Command::FetchClaims => self.claims.begin(),
      Command::FetchApplication(_) => self.application_detail.begin(),
      Command::FetchClaim(_) => self.claim_detail.begin(),
      Command::UpdateApplicationStatus { status, .. } => {
        self.mutation_pending = true;
        self.notification = Some(status.to_string());
      }
      Command::UpdateClaimStatus { status, .. } => {
        self.mutation_pending = true;
        self.notification = Some(status.to_string());
      }
      Command::None | Command::Quit => {}
    }
  }

  /// Perform `cmd`. Returns `false` to quit.
  pub async fn run(&mut self, cmd: Command) -> bool {
    self.prepare(&cmd);
    match cmd {
      Command::None => {}
      Command::Quit => return false,
      Command::FetchApplications => self.fetch_applications().await,
      Command::FetchClaims => self.fetch_claims().await,
      Command::FetchApplication(id) => self.fetch_application(id).await,
      Command::FetchClaim(id) => self.fetch_claim(id).await,
      Command::UpdateApplicationStatus { id, status } => {
        self.update_application_status(id, status).await
      }
      Command::UpdateClaimStatus { id, status } => self.update_claim_status(id, status).await,
    }
    true
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  async fn fetch_applications(&mut self) {
    let source = Arc::clone(&self.source);
    let result: anyhow::Result<Vec<Value>> =
      fetch_with_retry(&self.applications.options.retry, "GET /applications", || {
        source.list_applications()
      })
      .await
      .map_err(Into::into);

    match result {
      Ok(raw) => {
        self.application_rows =
          Normalizer::new().normalize_or_empty(&raw, &mut self.status_cache);
        self.applications.resolve(Ok(raw));
      }
      Err(e) => {
        tracing::error!(error = %e, "loading applications failed");
        self.application_rows.clear();
        self.applications.resolve(Err(e));
      }
    }
    self
      .application_list
      .apply(TableEvent::RowsChanged, &self.application_rows);
  }

  async fn fetch_claims(&mut self) {
    let source = Arc::clone(&self.source);
    let result: anyhow::Result<Vec<RawClaim>> =
      fetch_with_retry(&self.claims.options.retry, "GET /claims", || {
        source.list_claims()
      })
      .await
      .map_err(Into::into);

    if let Err(e) = &result {
      tracing::error!(error = %e, "loading claims failed");
    }
    self.claims.resolve(result);
    let rows = self.claims.data.as_deref().unwrap_or_default();
    self.claim_list.apply(TableEvent::RowsChanged, rows);
  }

  async fn fetch_application(&mut self, id: u64) {
    let source = Arc::clone(&self.source);
    let label = format!("GET /applications/{id}");
    let result: anyhow::Result<ApplicationDetails> =
      fetch_with_retry(&self.application_detail.options.retry, &label, || {
        source.get_application(id)
      })
      .await
      .map_err(Into::into);

    if let Err(e) = &result {
      tracing::error!(id, error = %e, "loading application failed");
    }
    self.application_detail.resolve(result);
  }

  async fn fetch_claim(&mut self, id: u64) {
    let source = Arc::clone(&self.source);
    let label = format!("GET /claims/{id}");
    let result: anyhow::Result<ClaimDetails> =
      fetch_with_retry(&self.claim_detail.options.retry, &label, || {
        source.get_claim(id)
      })
      .await
      .map_err(Into::into);

    if let Err(e) = &result {
      tracing::error!(id, error = %e, "loading claim failed");
    }
    self.claim_detail.resolve(result);
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  async fn update_application_status(&mut self, id: u64, status: ApplicationStatus) {
    let source = Arc::clone(&self.source);
    let result: anyhow::Result<ApplicationStatus> =
      fetch_with_retry(&self.mutation_retry, "update application status", || {
        source.update_application_status(id, status)
      })
      .await
      .map_err(Into::into);
    self.mutation_pending = false;

    match result {
      Ok(status) => {
        tracing::info!(id, %status, "application status updated");
        self.applications.invalidate();
        self.application_detail.update(|d| d.status = Some(status));
        self.status_msg = format!("Application {id} marked {status}");
      }
      Err(e) => {
        tracing::error!(id, error = %e, "application status update failed");
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  async fn update_claim_status(&mut self, id: u64, status: ClaimStatus) {
    let source = Arc::clone(&self.source);
    let result: anyhow::Result<ClaimStatus> =
      fetch_with_retry(&self.mutation_retry, "update claim status", || {
        source.update_claim_status(id, status)
      })
      .await
      .map_err(Into::into);
    self.mutation_pending = false;

    match result {
      Ok(status) => {
        tracing::info!(id, %status, "claim status updated");
        self.claims.invalidate();
        self
          .claim_detail
          .update(|d| d.approval_status = Some(status.to_string()));
        self.status_msg = format!("Claim {id} marked {status}");
      }
      Err(e) => {
        tracing::error!(id, error = %e, "claim status update failed");
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event and return the I/O it calls for.
  pub fn handle_key(&mut self, key: KeyEvent) -> Command {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Command::Quit;
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Command::None;
    }

    self.status_msg.clear();
    match self.screen {
      Screen::Applications | Screen::Claims => self.handle_list_key(key),
      Screen::ApplicationDetail(id) => self.handle_application_key(id, key),
      Screen::ClaimDetail(id) => self.handle_claim_key(id, key),
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    let mut text = match self.screen {
      Screen::Claims => self.claim_list.search_text().to_string(),
      _ => self.application_list.search_text().to_string(),
    };
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        text.clear();
      }
      KeyCode::Enter => {
        self.filter_active = false;
        return;
      }
      KeyCode::Backspace => {
        text.pop();
      }
      KeyCode::Char(c) => text.push(c),
      _ => return,
    }
    match self.screen {
      Screen::Claims => {
        let rows = self.claims.data.as_deref().unwrap_or_default();
        self.claim_list.search(text, rows);
      }
      _ => self.application_list.search(text, &self.application_rows),
    }
  }

  fn handle_list_key(&mut self, key: KeyEvent) -> Command {
    let event = match key.code {
      KeyCode::Char('q') => return Command::Quit,
      KeyCode::Char('r') => return self.refresh(),
      KeyCode::Tab => {
        let next = match self.screen {
          Screen::Claims => Screen::Applications,
          _ => Screen::Claims,
        };
        return self.switch_to(next);
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        return Command::None;
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => return self.open_detail(),

      KeyCode::Down | KeyCode::Char('j') | KeyCode::Up | KeyCode::Char('k') => {
        let down = matches!(key.code, KeyCode::Down | KeyCode::Char('j'));
        match self.screen {
          Screen::Claims => {
            let rows = self.claims.data.as_deref().unwrap_or_default();
            self.claim_list.move_cursor(down, rows);
          }
          _ => self.application_list.move_cursor(down, &self.application_rows),
        }
        return Command::None;
      }
      KeyCode::Char(c @ '1'..='9') => {
        let multi = key.modifiers.contains(KeyModifiers::ALT);
        match self.screen {
          Screen::Claims => {
            let rows = self.claims.data.as_deref().unwrap_or_default();
            self.claim_list.toggle_sort(c, multi, rows);
          }
          _ => self
            .application_list
            .toggle_sort(c, multi, &self.application_rows),
        }
        return Command::None;
      }

      KeyCode::Char(']') | KeyCode::PageDown => TableEvent::NextPage,
      KeyCode::Char('[') | KeyCode::PageUp => TableEvent::PreviousPage,
      KeyCode::Home => TableEvent::FirstPage,
      KeyCode::End => TableEvent::LastPage,
      KeyCode::Char('s') => TableEvent::ClearSort,
      KeyCode::Char('x') => TableEvent::ClearFilters,
      _ => return Command::None,
    };

    match self.screen {
      Screen::Claims => {
        let rows = self.claims.data.as_deref().unwrap_or_default();
        self.claim_list.apply(event, rows);
      }
      _ => self.application_list.apply(event, &self.application_rows),
    }
    Command::None
  }

  /// Open the record under the cursor.
  fn open_detail(&mut self) -> Command {
    let screen = match self.screen {
      Screen::Claims => {
        let rows = self.claims.data.as_deref().unwrap_or_default();
        match self.claim_list.selected(rows) {
          Some(index) => Screen::ClaimDetail(rows[index].claim_id),
          None => return Command::None,
        }
      }
      _ => {
        let Some(index) = self.application_list.selected(&self.application_rows) else {
          return Command::None;
        };
        match self.application_rows[index].id.parse() {
          Ok(id) => Screen::ApplicationDetail(id),
          Err(_) => return Command::None,
        }
      }
    };

    self.notification = None;
    match screen {
      Screen::ClaimDetail(_) => self.claim_detail.reset(),
      _ => self.application_detail.reset(),
    }
    self.switch_to(screen)
  }

  fn handle_application_key(&mut self, id: u64, key: KeyEvent) -> Command {
    let status = match key.code {
      KeyCode::Char('q') => return Command::Quit,
      KeyCode::Char('r') => return self.refresh(),
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        return self.switch_to(Screen::Applications);
      }
      KeyCode::Char('a') => ApplicationStatus::Approved,
      KeyCode::Char('d') => ApplicationStatus::Declined,
      KeyCode::Char('v') => ApplicationStatus::FurtherReviewRequired,
      _ => return Command::None,
    };
    if self.mutation_pending || self.application_detail.data.is_none() {
      return Command::None;
    }
    Command::UpdateApplicationStatus { id, status }
  }

  fn handle_claim_key(&mut self, id: u64, key: KeyEvent) -> Command {
    let status = match key.code {
      KeyCode::Char('q') => return Command::Quit,
      KeyCode::Char('r') => return self.refresh(),
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        return self.switch_to(Screen::Claims);
      }
      KeyCode::Char('a') => ClaimStatus::Approved,
      KeyCode::Char('d') => ClaimStatus::Rejected,
      KeyCode::Char('v') => ClaimStatus::ReviewRequired,
      _ => return Command::None,
    };
    if self.mutation_pending || self.claim_detail.data.is_none() {
      return Command::None;
    }
    Command::UpdateClaimStatus { id, status }
  }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

impl<S> App<S> {
  /// Claims as listed by the API; empty until the first successful fetch.
  pub fn claim_rows(&self) -> &[RawClaim] { self.claims.data.as_deref().unwrap_or_default() }

  pub fn application_render(&self) -> TableRender {
    self.application_list.render(
      &self.application_rows,
      self.applications.is_loading,
      self.applications.error.as_ref(),
    )
  }

  pub fn claim_render(&self) -> TableRender {
    self.claim_list.render(
      self.claim_rows(),
      self.claims.is_loading,
      self.claims.error.as_ref(),
    )
  }
}
