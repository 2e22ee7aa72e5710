//! `capitol` — terminal back-office dashboard for insurance applications
//! and liability claims.
//!
//! # Usage
//!
//! ```text
//! capitol --url http://localhost:5001 --db-url https://db.example.com --db-key KEY
//! capitol --config ~/.config/capitol/config.toml --log-file /tmp/capitol.log
//! ```

mod app;
mod client;
mod fetch;
mod ui;

#[cfg(test)]
mod tests;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result};
use app::{App, Command};
use capitol_core::table::DEFAULT_PAGE_SIZE;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, DisableFocusChange, EnableFocusChange, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_API_URL: &str = "http://localhost:5001";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "capitol", about = "Back-office dashboard for insurance applications and claims")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the insurance API (default: http://localhost:5001).
  #[arg(long, env = "CAPITOL_API_URL")]
  url: Option<String>,

  /// Base URL of the database that stores review statuses.
  #[arg(long, env = "SUPABASE_URL")]
  db_url: Option<String>,

  /// API key for the status database.
  #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
  db_key: Option<String>,

  /// Rows per table page (default: 6).
  #[arg(long)]
  page_size: Option<usize>,

  /// Write logs to this file; without one, logs are discarded.
  #[arg(long, env = "CAPITOL_LOG_FILE", value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug, PartialEq)]
struct ConfigFile {
  api_url:   Option<String>,
  db_url:    Option<String>,
  db_key:    Option<String>,
  page_size: Option<usize>,
  log_file:  Option<PathBuf>,
}

impl ConfigFile {
  fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }
}

/// Effective settings after merging flags, config file and defaults.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
  api:       ApiSettings,
  page_size: usize,
  log_file:  Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
struct ApiSettings {
  base_url:     String,
  database_url: Option<String>,
  database_key: Option<String>,
}

impl Settings {
  /// Flags (and their env vars) override the config file, which overrides
  /// defaults.
  fn resolve(args: Args, file: ConfigFile) -> Self {
    Self {
      api:       ApiSettings {
        base_url:     args
          .url
          .or(file.api_url)
          .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        database_url: args.db_url.or(file.db_url),
        database_key: args.db_key.or(file.db_key),
      },
      page_size: args
        .page_size
        .or(file.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE),
      log_file:  args.log_file.or(file.log_file),
    }
  }
}

impl From<ApiSettings> for ApiConfig {
  fn from(api: ApiSettings) -> Self {
    Self {
      base_url:     api.base_url,
      database_url: api.database_url,
      database_key: api.database_key,
    }
  }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// The terminal is in raw mode, so logs go to a file or nowhere.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_ansi(false);

  match log_file {
    Some(path) => {
      let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      builder.with_writer(Arc::new(file)).init();
    }
    None => builder.with_writer(io::sink).init(),
  }
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let mut args = Args::parse();

  let file_cfg = match args.config.take() {
    Some(path) => ConfigFile::load(&path)?,
    None => ConfigFile::default(),
  };
  let settings = Settings::resolve(args, file_cfg);

  init_logging(settings.log_file.as_deref())?;
  tracing::info!(
    url = %settings.api.base_url,
    page_size = settings.page_size,
    "starting capitol"
  );

  let client = ApiClient::new(settings.api.into())?;
  let mut app = App::new(client, settings.page_size)?;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableFocusChange)
    .context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<ApiClient>,
) -> Result<()> {
  let mut pending = app.mount();

  loop {
    if pending != Command::None {
      // Draw the loading state before blocking on the request.
      app.prepare(&pending);
      terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;
      if !app.run(pending).await {
        break;
      }
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    pending = match maybe_event {
      Some(Event::Key(key)) => app.handle_key(key),
      Some(Event::FocusGained) => app.handle_focus(),
      _ => Command::None,
    };
  }

  Ok(())
}
