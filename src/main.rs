//! # Veil CLI Entry Point
//!
//! This is the main entry point for the veil TUI application.
//!
//! ## Overview
//!
//! Veil is a terminal front-end for a document-anonymization service mesh.
//! Pick a local document, let the remote services extract its text and label
//! the sensitive entities, review the findings, and request a redacted copy.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive: enter the document path in the TUI
//! veil
//!
//! # Preselect a document, skipping path entry
//! veil --file ./contract.pdf
//!
//! # Debug mode - print resolved endpoints and label table, then exit
//! veil --debug
//! ```
//!
//! ## Architecture
//!
//! 1. **Config**: endpoints, theme, and label meanings load from
//!    `~/.config/veil/config.json`
//! 2. **UI**: a single event loop drives the animations and polls background
//!    pipeline tasks
//! 3. **Pipeline**: upload → extraction → labelling → grouping runs on a
//!    background tokio task; anonymization runs the same way on request
//!
//! ## Key Bindings
//!
//! ### Auth screen
//! - `←` / `→` / `Tab` - Switch between the login and register panels
//! - `Enter` - Continue to the workspace
//! - `q` / `Q` - Quit
//!
//! ### Workspace
//! - Type a document path, `Enter` to select, `Enter` again to upload
//! - `j` / `k` / `↑` / `↓` - Move between anonymization categories
//! - `Space` - Toggle a category
//! - `Enter` - Request anonymization
//! - `q` / `Q` - Quit

use veil::ui;
use veil::ui::app::{Screen, UploadPhase};
use veil::ui::auth::AuthPanelKind;
use veil::ui::config::Config;
use veil::ui::App;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(
                event::read().context("Failed to read keyboard event")?,
            ))
        } else {
            Ok(None)
        }
    }
}

/// Veil - anonymize documents from your terminal
#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Anonymize your documents for free", long_about = None)]
struct Args {
    /// Path to a document to preselect, skipping interactive path entry
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print resolved endpoints and the label-meaning table, then exit
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The TUI owns stdout, so diagnostics go to a log file.
    let _log_guard = init_logging();

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    // Restore panic hook
    let _ = panic::take_hook();

    result
}

/// Initialize file logging under the platform data directory. Returns the
/// appender guard, which must stay alive for buffered lines to flush.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dirs = directories::ProjectDirs::from("", "", "veil")?;
    let log_dir = dirs.data_dir().join("logs");
    if std::fs::create_dir_all(&log_dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::daily(&log_dir, "veil.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    Some(guard)
}

async fn run_application(args: Args) -> Result<()> {
    let config = Config::load();

    // Debug mode: print the resolved configuration and exit
    if args.debug {
        println!("=== Endpoints ===");
        println!("  upload:    {}", config.endpoints.upload);
        println!("  extract:   {}", config.endpoints.extract);
        println!("  label:     {}", config.endpoints.label);
        println!("  anonymize: {}", config.endpoints.anonymize);
        println!("\n=== Label meanings ===");
        let mut labels: Vec<_> = config.label_meanings.iter().collect();
        labels.sort();
        for (label, meaning) in labels {
            println!("  {label}: {meaning}");
        }
        return Ok(());
    }

    // Validate a preselected file before taking over the terminal
    let preselected = match args.file {
        Some(path) => Some(
            path.canonicalize()
                .with_context(|| format!("Failed to access file: {}", path.display()))?,
        ),
        None => None,
    };

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(config, Instant::now());
    if let Some(path) = preselected {
        app.path_input = path.display().to_string();
        app.select_file(path);
        app.proceed_to_workspace();
    }

    // Run the app and ensure cleanup happens even on error
    let mut event_reader = CrosstermEventReader;
    let run_result = run_app(&mut terminal, &mut app, &mut event_reader).await;

    // Restore terminal (always runs, even if run_app failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    run_result?;
    cleanup_result?;

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_reader: &mut dyn EventReader,
) -> Result<()> {
    let mut rng = rand::rng();

    loop {
        app.tick(Instant::now(), &mut rng);

        terminal
            .draw(|f| ui::render(f, app))
            .context("Failed to draw terminal UI")?;

        // Short timeout while something animates or a pipeline runs, so the
        // next frame lands promptly; relaxed otherwise.
        let poll_timeout = if app.has_active_animation() {
            Duration::from_millis(33)
        } else {
            Duration::from_millis(100)
        };

        let event = event_reader.read_event(poll_timeout)?;

        // If no event, continue the loop (re-render for animations/polling)
        let event = match event {
            Some(e) => e,
            None => continue,
        };

        if let Event::Key(key) = event {
            handle_key(app, key, Instant::now());
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Route a key event to the app based on the active screen and phase.
fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    // Alert modal captures input until dismissed
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return;
    }

    match app.screen {
        Screen::Auth => match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
            KeyCode::Left => {
                app.auth.request_toggle(AuthPanelKind::Login, now);
            }
            KeyCode::Right => {
                app.auth.request_toggle(AuthPanelKind::Register, now);
            }
            KeyCode::Tab => {
                let to = app.auth.active().other();
                app.auth.request_toggle(to, now);
            }
            KeyCode::Enter => app.proceed_to_workspace(),
            _ => {}
        },
        Screen::Workspace => match app.upload_phase {
            UploadPhase::PickFile => match key.code {
                // Free text entry: 'q' is part of the path here
                KeyCode::Enter => app.confirm_path_input(),
                KeyCode::Backspace => {
                    app.path_input.pop();
                }
                KeyCode::Esc => app.should_quit = true,
                KeyCode::Char(c) => app.path_input.push(c),
                _ => {}
            },
            UploadPhase::Confirm => match key.code {
                KeyCode::Enter => app.submit_upload(),
                KeyCode::Esc => app.cancel_selection(),
                KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
                _ => {}
            },
            UploadPhase::Findings | UploadPhase::Redacted => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
                KeyCode::Down | KeyCode::Char('j') => app.checkbox_next(),
                KeyCode::Up | KeyCode::Char('k') => app.checkbox_previous(),
                KeyCode::Char(' ') => app.toggle_checkbox(),
                KeyCode::Enter => app.submit_anonymize(),
                _ => {}
            },
            UploadPhase::Analyzing | UploadPhase::Collapsing { .. } | UploadPhase::Redacting => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                    app.should_quit = true;
                }
            }
        },
    }
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::collections::VecDeque;

    /// Mock event reader for testing that returns a predetermined sequence of events
    struct MockEventReader {
        events: VecDeque<Event>,
    }

    impl MockEventReader {
        fn new(events: Vec<Event>) -> Self {
            Self {
                events: VecDeque::from(events),
            }
        }
    }

    impl EventReader for MockEventReader {
        fn read_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
            Ok(self.events.pop_front())
        }
    }

    /// Helper to create a key event
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn test_app() -> App {
        App::new(Config::default(), Instant::now())
    }

    #[test]
    fn test_mock_event_reader() {
        let events = vec![
            Event::Key(key_event(KeyCode::Char('a'))),
            Event::Key(key_event(KeyCode::Enter)),
        ];

        let mut reader = MockEventReader::new(events);

        assert!(matches!(
            reader.read_event(Duration::from_millis(10)).unwrap(),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Char('a'),
                ..
            }))
        ));
        assert!(matches!(
            reader.read_event(Duration::from_millis(10)).unwrap(),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Enter,
                ..
            }))
        ));
        assert!(reader
            .read_event(Duration::from_millis(10))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_crossterm_event_reader_type() {
        let _reader: Box<dyn EventReader> = Box::new(CrosstermEventReader);
    }

    #[test]
    fn test_quit_from_auth_screen() {
        let mut app = test_app();
        handle_key(&mut app, key_event(KeyCode::Char('q')), Instant::now());
        assert!(app.should_quit);
    }

    #[test]
    fn test_enter_proceeds_to_workspace() {
        let mut app = test_app();
        handle_key(&mut app, key_event(KeyCode::Enter), Instant::now());
        assert_eq!(app.screen, Screen::Workspace);
    }

    #[test]
    fn test_path_entry_accepts_q_as_text() {
        let mut app = test_app();
        app.proceed_to_workspace();
        for c in "quarterly.pdf".chars() {
            handle_key(&mut app, key_event(KeyCode::Char(c)), Instant::now());
        }
        assert!(!app.should_quit);
        assert_eq!(app.path_input, "quarterly.pdf");

        handle_key(&mut app, key_event(KeyCode::Backspace), Instant::now());
        assert_eq!(app.path_input, "quarterly.pd");
    }

    #[test]
    fn test_enter_selects_typed_path() {
        let mut app = test_app();
        app.proceed_to_workspace();
        app.path_input = "temp/doc.pdf".to_string();
        handle_key(&mut app, key_event(KeyCode::Enter), Instant::now());
        assert_eq!(app.upload_phase, UploadPhase::Confirm);
    }

    #[test]
    fn test_esc_in_confirm_returns_to_path_entry() {
        let mut app = test_app();
        app.proceed_to_workspace();
        app.path_input = "temp/doc.pdf".to_string();
        handle_key(&mut app, key_event(KeyCode::Enter), Instant::now());
        handle_key(&mut app, key_event(KeyCode::Esc), Instant::now());
        assert_eq!(app.upload_phase, UploadPhase::PickFile);
        // Typed path kept for editing
        assert_eq!(app.path_input, "temp/doc.pdf");
    }

    #[test]
    fn test_alert_captures_input_until_dismissed() {
        let mut app = test_app();
        app.alert = Some("boom".to_string());

        // 'q' is swallowed by the modal
        handle_key(&mut app, key_event(KeyCode::Char('q')), Instant::now());
        assert!(!app.should_quit);
        assert!(app.alert.is_some());

        handle_key(&mut app, key_event(KeyCode::Enter), Instant::now());
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_space_toggles_checkbox_in_findings() {
        let mut app = test_app();
        app.proceed_to_workspace();
        app.upload_phase = UploadPhase::Findings;

        handle_key(&mut app, key_event(KeyCode::Char(' ')), Instant::now());
        assert!(app.checkboxes[0].checked);
        handle_key(&mut app, key_event(KeyCode::Char(' ')), Instant::now());
        assert!(!app.checkboxes[0].checked);
    }

    #[tokio::test]
    async fn test_run_application_nonexistent_file() {
        let args = Args {
            file: Some(PathBuf::from("/nonexistent/file/that/does/not/exist.pdf")),
            debug: false,
        };

        let result = run_application(args).await;
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to access file"));
    }

    #[tokio::test]
    async fn test_run_application_debug_mode() {
        let args = Args {
            file: None,
            debug: true,
        };

        // Debug mode prints the config and returns without touching the terminal
        let result = run_application(args).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_args_parsing_with_file() {
        let args = Args {
            file: Some(PathBuf::from("/some/file.pdf")),
            debug: false,
        };
        assert_eq!(args.file, Some(PathBuf::from("/some/file.pdf")));
    }
}
