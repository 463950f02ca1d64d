//! # Rendering
//!
//! Draws the veil TUI from the current [`App`] state. Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            Header (title + subtitle)            │
//! ├─────────────────────────────────────────────────┤
//! │                                                 │
//! │   Auth screen: buttons + active auth panel      │
//! │   Workspace: upload surface, then the analyze   │
//! │   and anonymization terminal panels             │
//! │                                                 │
//! ├─────────────────────────────────────────────────┤
//! │                 Footer (hints)                  │
//! └─────────────────────────────────────────────────┘
//! ```

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::app::{App, Screen, UploadPhase};
use crate::ui::auth::{AuthPanelKind, AUTH_SLOT};
use crate::ui::panel::TerminalPanel;

pub fn render(frame: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, main_chunks[0]);

    match app.screen {
        Screen::Auth => render_auth(frame, app, main_chunks[1]),
        Screen::Workspace => render_workspace(frame, app, main_chunks[1]),
    }

    render_footer(frame, app, main_chunks[2]);

    if let Some(message) = &app.alert {
        render_alert(frame, app, message);
    }
}

/// Typed slot text plus the blinking cursor marker, if it sits here.
fn slot_line<'a>(app: &'a App, slot: &str, style: Style) -> Vec<Line<'a>> {
    let text = app.slots.text(slot);
    let cursor_here = app.slots.has_cursor(slot) && app.cursor_visible();

    let mut lines: Vec<Line> = text.split('\n').map(|l| Line::styled(l, style)).collect();
    if cursor_here {
        if let Some(last) = lines.last_mut() {
            last.push_span(Span::styled(
                "_",
                Style::default()
                    .fg(app.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }
    lines
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::styled(
        app.header_text().to_string(),
        Style::default()
            .fg(app.theme.accent)
            .add_modifier(Modifier::BOLD),
    )];
    lines.extend(slot_line(app, "subtitle", Style::default().fg(app.theme.fg)));

    let header = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(app.theme.fg_dim)),
        );
    frame.render_widget(header, area);
}

fn render_auth(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    // Toggle buttons
    let button = |kind: AuthPanelKind| -> Span {
        let label = format!("[ {} ]", kind.name().to_uppercase());
        if app.auth.button_active(kind) {
            Span::styled(
                label,
                Style::default()
                    .fg(app.theme.bg)
                    .bg(app.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, Style::default().fg(app.theme.fg_dim))
        }
    };
    let buttons = Paragraph::new(Line::from(vec![
        button(AuthPanelKind::Login),
        Span::raw("  "),
        button(AuthPanelKind::Register),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(buttons, chunks[0]);

    // Active panel; dimmed while it slides out ahead of a swap
    let border = if app.auth.is_sliding_out() {
        app.theme.fg_dim
    } else {
        app.theme.accent
    };
    let title = format!("<{}/>", app.auth.active().name().to_uppercase());
    let body = if app.auth.is_sliding_out() {
        Vec::new()
    } else {
        slot_line(app, AUTH_SLOT, Style::default().fg(app.theme.secondary))
    };
    let panel = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(panel, chunks[1]);
}

fn render_workspace(frame: &mut Frame, app: &App, area: Rect) {
    // On very short terminals the body chunk can have zero rows.
    if area.height == 0 {
        return;
    }

    let surface = app.upload_surface_fraction(app.last_tick);

    if surface > 0.0 {
        // Upload surface, shrinking during the collapse transition
        let height = ((f32::from(area.height) * surface).round() as u16).min(area.height);
        let upload_area = Rect {
            height: height.max(1),
            ..area
        };
        render_upload_surface(frame, app, upload_area);
        return;
    }

    // Terminal panels stacked vertically, each at its grow fraction
    let slot_count = app.panels.len().max(1) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, u32::from(slot_count)); slot_count as usize])
        .split(area);

    for (panel, chunk) in app.panels.iter().zip(chunks.iter()) {
        render_panel(frame, app, panel, *chunk);
    }
}

fn render_upload_surface(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("document path > ", Style::default().fg(app.theme.fg_dim)),
        Span::styled(
            app.path_input.clone(),
            Style::default().fg(app.theme.secondary),
        ),
        Span::styled(
            if matches!(app.upload_phase, UploadPhase::PickFile) && app.cursor_visible() {
                "_"
            } else {
                ""
            },
            Style::default().fg(app.theme.accent),
        ),
    ]));
    lines.push(Line::from(""));

    match app.upload_phase {
        UploadPhase::Confirm => {
            lines.push(Line::styled(
                "File selected. Press Enter to upload and analyze.",
                Style::default()
                    .fg(app.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        UploadPhase::Analyzing | UploadPhase::Collapsing { .. } => {
            for entry in &app.activity {
                lines.push(Line::styled(
                    format!("  {entry}"),
                    Style::default().fg(app.theme.fg),
                ));
            }
        }
        _ => {}
    }

    // Surface any previous no-result runs while picking again
    if matches!(app.upload_phase, UploadPhase::PickFile | UploadPhase::Confirm)
        && !app.activity.is_empty()
    {
        for entry in &app.activity {
            lines.push(Line::styled(
                format!("  {entry}"),
                Style::default().fg(app.theme.fg_dim),
            ));
        }
    }

    let upload = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title("<UPLOAD/>")
            .border_style(Style::default().fg(app.theme.accent)),
    );
    frame.render_widget(upload, area);
}

fn render_panel(frame: &mut Frame, app: &App, panel: &TerminalPanel, area: Rect) {
    if area.height == 0 {
        return;
    }
    let fraction = panel.grow_fraction(app.last_tick);
    if fraction <= 0.0 {
        return;
    }
    let height = ((f32::from(area.height) * fraction).round() as u16)
        .min(area.height)
        .max(1);
    let panel_area = Rect { height, ..area };

    let mut lines = slot_line(
        app,
        &panel.slot(),
        Style::default().fg(app.theme.secondary),
    );

    if panel.name == "anonymization" && panel.is_filled() {
        lines.push(Line::from(""));
        for (i, cb) in app.checkboxes.iter().enumerate() {
            let marker = if cb.checked { "[x]" } else { "[ ]" };
            let selected = i == app.checkbox_cursor
                && matches!(app.upload_phase, UploadPhase::Findings | UploadPhase::Redacted);
            let style = if selected {
                Style::default()
                    .fg(app.theme.bg)
                    .bg(app.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.fg)
            };
            lines.push(Line::styled(
                format!(" {marker} {} ({})", cb.meaning, cb.label),
                style,
            ));
        }
        if app.upload_phase == UploadPhase::Redacting {
            lines.push(Line::from(""));
            lines.push(Line::styled(
                " Anonymisation en cours...",
                Style::default().fg(app.theme.fg_dim),
            ));
        }
        if let Some(link) = &app.redacted_link {
            lines.push(Line::from(""));
            lines.push(Line::styled(
                format!(" Télécharger: {link}"),
                Style::default()
                    .fg(app.theme.success)
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(panel.title())
            .border_style(Style::default().fg(app.theme.accent)),
    );
    frame.render_widget(widget, panel_area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match (app.screen, app.upload_phase) {
        (Screen::Auth, _) => "[←→] Switch Panel  [Enter] Continue  [Q] Quit",
        (Screen::Workspace, UploadPhase::PickFile) => "[Type] Document Path  [Enter] Select  [Esc] Quit",
        (Screen::Workspace, UploadPhase::Confirm) => "[Enter] Upload  [Esc] Change File  [Q] Quit",
        (Screen::Workspace, UploadPhase::Analyzing) => "Analyzing...  [Q] Quit",
        (Screen::Workspace, UploadPhase::Findings | UploadPhase::Redacted) => {
            "[↑↓/jk] Navigate  [Space] Toggle  [Enter] Anonymize  [Q] Quit"
        }
        (Screen::Workspace, _) => "[Q] Quit",
    };

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(hints, Style::default().fg(app.theme.fg_dim)),
        Span::raw("  "),
        Span::styled(
            app.footer_text().to_string(),
            Style::default().fg(app.theme.fg_dim),
        ),
    ]));
    frame.render_widget(footer, area);
}

fn render_alert(frame: &mut Frame, app: &App, message: &str) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let alert = Paragraph::new(vec![
        Line::from(""),
        Line::styled(
            message.to_string(),
            Style::default()
                .fg(app.theme.error)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::styled("[Enter] Dismiss", Style::default().fg(app.theme.fg_dim)),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("<ALERT/>")
            .border_style(Style::default().fg(app.theme.error)),
    );
    frame.render_widget(alert, area);
}

/// Centered sub-rectangle, sized as percentages of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::config::Config;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::{Duration, Instant};

    #[test]
    fn test_expanding_panel_renders_on_short_terminal() {
        // Header (4 rows) + footer (1 row) leave a zero-height body on a
        // 5-row terminal; a mid-expansion panel must not panic there.
        let start = Instant::now();
        let mut app = App::new(Config::default(), start);
        let mut rng = StdRng::seed_from_u64(3);

        app.proceed_to_workspace();
        app.upload_phase = UploadPhase::Findings;
        app.panels
            .push(TerminalPanel::new("analyze", "findings", start));

        // Past the mount delay, mid-expansion: fractional grow height.
        app.tick(start + Duration::from_millis(500), &mut rng);

        let backend = TestBackend::new(40, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
    }

    #[test]
    fn test_upload_surface_renders_on_short_terminal() {
        let start = Instant::now();
        let mut app = App::new(Config::default(), start);
        let mut rng = StdRng::seed_from_u64(4);

        app.proceed_to_workspace();
        app.tick(start, &mut rng);

        let backend = TestBackend::new(30, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
    }

    #[test]
    fn test_filled_panels_render_with_checkbox_form() {
        let start = Instant::now();
        let mut app = App::new(Config::default(), start);
        let mut rng = StdRng::seed_from_u64(5);

        app.proceed_to_workspace();
        app.upload_phase = UploadPhase::Collapsing {
            until: start + Duration::from_millis(10),
        };
        let mut t = 0;
        while t <= 8000 {
            app.tick(start + Duration::from_millis(t), &mut rng);
            t += 20;
        }

        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
    }
}
