//! # Application State
//!
//! The [`App`] struct owns everything the event loop mutates: the active
//! screen, the animations, the upload flow state machine, and the handles of
//! background pipeline tasks. All mutation happens from the main thread's
//! event handlers; background tasks only publish status through their
//! handles, which [`App::tick`] polls once per frame.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::anim::{Scramble, TextSlots, Typewriter};
use crate::pipeline::{
    spawn_analysis, spawn_anonymize, AnalysisHandle, AnalysisStatus, AnonymizeHandle,
    AnonymizeStatus, LabelGroup, ServiceClient,
};
use crate::ui::auth::AuthToggle;
use crate::ui::config::Config;
use crate::ui::panel::TerminalPanel;
use crate::ui::theme::Theme;

/// Teardown delay for the upload surface once analysis completes.
const UPLOAD_FORM_CLOSE: Duration = Duration::from_millis(1300);
/// Scramble repeat period for the header and footer.
const SCRAMBLE_INTERVAL: Duration = Duration::from_secs(5);
/// Scramble inner tick rate.
const SCRAMBLE_SPEED: Duration = Duration::from_millis(30);

const APP_TITLE: &str = "V E I L";
const APP_TAG: &str = "anonymize everything";
const SUBTITLE: &str = "Anonymize your documents for free";

/// Label categories offered on the anonymization form.
pub const FORM_CATEGORIES: [&str; 4] = ["PERSON", "EMAIL", "PHONE", "ADDRESS"];

/// Alert text raised when the anonymization request fails.
pub const ANONYMIZATION_ALERT: &str = "Une erreur est survenue lors de l'anonymisation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Workspace,
}

/// Where the upload & analysis flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UploadPhase {
    /// Waiting for the user to enter a document path.
    PickFile,
    /// A file is selected; the upload confirmation control is revealed.
    Confirm,
    /// The analysis pipeline is running in the background.
    Analyzing,
    /// Analysis done; the upload surface is collapsing.
    Collapsing { until: Instant },
    /// Findings and anonymization panels are up.
    Findings,
    /// The anonymization request is in flight.
    Redacting,
    /// The redacted-file link is displayed.
    Redacted,
}

/// One anonymization-form checkbox.
#[derive(Debug, Clone)]
pub struct Checkbox {
    pub label: String,
    pub meaning: String,
    pub checked: bool,
}

pub struct App {
    pub screen: Screen,
    pub theme: Theme,
    pub slots: TextSlots,
    pub auth: AuthToggle,

    pub upload_phase: UploadPhase,
    pub path_input: String,
    pub selected_file: Option<PathBuf>,
    /// One line per pipeline stage, shown while the analysis runs.
    pub activity: Vec<String>,

    /// Terminal panels, appended in mount order and never reused.
    pub panels: Vec<TerminalPanel>,
    pub groups: Vec<LabelGroup>,
    /// Server-assigned path of the staged file.
    pub staged_path: Option<String>,
    pub checkboxes: Vec<Checkbox>,
    pub checkbox_cursor: usize,
    pub redacted_link: Option<String>,

    pub alert: Option<String>,
    pub should_quit: bool,
    pub started_at: Instant,
    pub last_tick: Instant,

    header_scramble: Scramble,
    header_looping: bool,
    footer_scramble: Scramble,
    footer_looping: bool,
    subtitle: Typewriter,

    analysis: Option<AnalysisHandle>,
    anonymize: Option<AnonymizeHandle>,
    client: ServiceClient,
    label_meanings: HashMap<String, String>,
    reported_stage: Option<&'static str>,
}

impl App {
    pub fn new(config: Config, now: Instant) -> Self {
        let theme = Theme::by_name(&config.theme)
            .unwrap_or_else(Theme::default_theme)
            .clone();

        let mut subtitle = Typewriter::new("preloader", Duration::from_millis(20));
        subtitle.queue("subtitle", SUBTITLE, now);

        let checkboxes = FORM_CATEGORIES
            .iter()
            .map(|&label| Checkbox {
                label: label.to_string(),
                meaning: config
                    .label_meanings
                    .get(label)
                    .cloned()
                    .unwrap_or_else(|| label.to_string()),
                checked: false,
            })
            .collect();

        Self {
            screen: Screen::Auth,
            theme,
            slots: TextSlots::new(),
            auth: AuthToggle::new(now),
            upload_phase: UploadPhase::PickFile,
            path_input: String::new(),
            selected_file: None,
            activity: Vec::new(),
            panels: Vec::new(),
            groups: Vec::new(),
            staged_path: None,
            checkboxes,
            checkbox_cursor: 0,
            redacted_link: None,
            alert: None,
            should_quit: false,
            started_at: now,
            last_tick: now,
            // First pass resolves immediately, then the looping interval
            // takes over (mirrors the intro-then-repeat title animation).
            header_scramble: Scramble::new(
                APP_TITLE,
                Duration::ZERO,
                SCRAMBLE_SPEED,
                false,
                now,
            ),
            header_looping: false,
            footer_scramble: Scramble::new(APP_TAG, Duration::ZERO, SCRAMBLE_SPEED, false, now),
            footer_looping: false,
            subtitle,
            analysis: None,
            anonymize: None,
            client: ServiceClient::new(config.endpoints),
            label_meanings: config.label_meanings,
            reported_stage: None,
        }
    }

    pub fn header_text(&self) -> &str {
        self.header_scramble.display()
    }

    pub fn footer_text(&self) -> &str {
        self.footer_scramble.display()
    }

    /// Whether the blinking cursor is in its visible half-period.
    pub fn cursor_visible(&self) -> bool {
        let elapsed = self.last_tick.duration_since(self.started_at);
        elapsed.as_millis() / 530 % 2 == 0
    }

    pub fn analysis_in_flight(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn anonymize_in_flight(&self) -> bool {
        self.anonymize.is_some()
    }

    /// Leave the auth screen for the workspace.
    pub fn proceed_to_workspace(&mut self) {
        self.screen = Screen::Workspace;
    }

    /// Preselect a document (e.g. from `--file`), revealing the upload
    /// confirmation control.
    pub fn select_file(&mut self, path: PathBuf) {
        self.selected_file = Some(path);
        self.upload_phase = UploadPhase::Confirm;
    }

    /// Confirm the typed path as the selected file. Empty input is a silent
    /// no-op.
    pub fn confirm_path_input(&mut self) {
        let trimmed = self.path_input.trim();
        if trimmed.is_empty() {
            return;
        }
        self.select_file(PathBuf::from(trimmed));
    }

    /// Return to path entry, keeping the typed path for editing.
    pub fn cancel_selection(&mut self) {
        self.selected_file = None;
        self.upload_phase = UploadPhase::PickFile;
    }

    /// Submit the selected file: spawn the analysis pipeline. A missing
    /// selection is a silent no-op.
    pub fn submit_upload(&mut self) {
        if self.upload_phase != UploadPhase::Confirm {
            return;
        }
        let Some(file) = self.selected_file.clone() else {
            return;
        };
        self.activity.clear();
        self.reported_stage = None;
        self.analysis = Some(spawn_analysis(
            self.client.clone(),
            file,
            self.label_meanings.clone(),
        ));
        self.upload_phase = UploadPhase::Analyzing;
    }

    pub fn checkbox_next(&mut self) {
        if !self.checkboxes.is_empty() {
            self.checkbox_cursor = (self.checkbox_cursor + 1) % self.checkboxes.len();
        }
    }

    pub fn checkbox_previous(&mut self) {
        if !self.checkboxes.is_empty() {
            self.checkbox_cursor = self
                .checkbox_cursor
                .checked_sub(1)
                .unwrap_or(self.checkboxes.len() - 1);
        }
    }

    pub fn toggle_checkbox(&mut self) {
        if let Some(cb) = self.checkboxes.get_mut(self.checkbox_cursor) {
            cb.checked = !cb.checked;
        }
    }

    /// Submit the anonymization form. Zero selected categories is a silent
    /// no-op: no request is made.
    pub fn submit_anonymize(&mut self) {
        if self.upload_phase != UploadPhase::Findings {
            return;
        }
        let selected: Vec<String> = self
            .checkboxes
            .iter()
            .filter(|cb| cb.checked)
            .map(|cb| cb.label.clone())
            .collect();
        if selected.is_empty() {
            return;
        }
        let Some(file_path) = self.staged_path.clone() else {
            return;
        };
        self.anonymize = Some(spawn_anonymize(self.client.clone(), file_path, selected));
        self.upload_phase = UploadPhase::Redacting;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// How far the upload surface has collapsed, 1.0 = fully open.
    pub fn upload_surface_fraction(&self, now: Instant) -> f32 {
        match self.upload_phase {
            UploadPhase::Collapsing { until } => {
                let remaining = until.saturating_duration_since(now).as_secs_f32();
                (remaining / UPLOAD_FORM_CLOSE.as_secs_f32()).clamp(0.0, 1.0)
            }
            UploadPhase::Findings | UploadPhase::Redacting | UploadPhase::Redacted => 0.0,
            _ => 1.0,
        }
    }

    /// Whether any animation or background task needs fast frame updates.
    pub fn has_active_animation(&self) -> bool {
        self.header_scramble.is_running()
            || self.footer_scramble.is_running()
            || !self.subtitle.is_finished()
            || (self.screen == Screen::Auth && !self.auth.is_settled())
            || self.panels.iter().any(|p| !p.is_filled())
            || self.analysis.is_some()
            || self.anonymize.is_some()
            || matches!(self.upload_phase, UploadPhase::Collapsing { .. })
    }

    /// Advance every animation and poll background tasks. Called once per
    /// frame from the event loop.
    pub fn tick<R: Rng>(&mut self, now: Instant, rng: &mut R) {
        self.last_tick = now;

        self.header_scramble.tick(now, rng);
        if !self.header_looping && !self.header_scramble.is_active() {
            self.header_scramble =
                Scramble::new(APP_TITLE, SCRAMBLE_INTERVAL, SCRAMBLE_SPEED, true, now);
            self.header_looping = true;
        }
        self.footer_scramble.tick(now, rng);
        if !self.footer_looping && !self.footer_scramble.is_active() {
            self.footer_scramble =
                Scramble::new(APP_TAG, SCRAMBLE_INTERVAL, SCRAMBLE_SPEED, true, now);
            self.footer_looping = true;
        }

        self.subtitle.tick(now, &mut self.slots);

        if self.screen == Screen::Auth {
            self.auth.tick(now, &mut self.slots);
        }

        for panel in &mut self.panels {
            panel.tick(now, &mut self.slots);
        }

        // Findings panel typed out: mount the anonymization panel next.
        if self.upload_phase == UploadPhase::Findings
            && self.panels.len() == 1
            && self.panels[0].is_filled()
        {
            self.panels.push(TerminalPanel::new(
                "anonymization",
                "Générer une version anonymisée du document",
                now,
            ));
        }

        self.poll_analysis(now);
        self.poll_anonymize();

        if let UploadPhase::Collapsing { until } = self.upload_phase {
            if now >= until {
                // Upload surface is gone; mount the findings panel.
                let body = findings_text(&self.groups);
                self.panels.push(TerminalPanel::new("analyze", body, now));
                self.upload_phase = UploadPhase::Findings;
            }
        }
    }

    fn poll_analysis(&mut self, now: Instant) {
        let Some(handle) = &self.analysis else {
            return;
        };
        match handle.poll_status() {
            AnalysisStatus::Uploading => self.report_stage("Staging upload..."),
            AnalysisStatus::Extracting => self.report_stage("Extracting text..."),
            AnalysisStatus::Labelling => self.report_stage("Labelling entities..."),
            AnalysisStatus::Done { file_path, groups } => {
                self.analysis = None;
                self.staged_path = Some(file_path);
                self.groups = groups;
                self.activity.push("Analysis complete.".to_string());
                self.upload_phase = UploadPhase::Collapsing {
                    until: now + UPLOAD_FORM_CLOSE,
                };
            }
            AnalysisStatus::NoResult => {
                // Logged at the pipeline boundary; the upload surface simply
                // stays up with no user-facing error.
                self.analysis = None;
                self.activity.push("No result.".to_string());
                self.upload_phase = UploadPhase::Confirm;
            }
        }
    }

    fn poll_anonymize(&mut self) {
        let Some(handle) = &self.anonymize else {
            return;
        };
        match handle.poll_status() {
            AnonymizeStatus::Running => {}
            AnonymizeStatus::Done { redacted } => {
                self.anonymize = None;
                self.slots.push_str(
                    "anonymization-text",
                    &format!("\n\nDocument anonymisé généré: {redacted}"),
                );
                self.redacted_link = Some(redacted);
                self.upload_phase = UploadPhase::Redacted;
            }
            AnonymizeStatus::Failed { .. } => {
                self.anonymize = None;
                self.alert = Some(ANONYMIZATION_ALERT.to_string());
                self.upload_phase = UploadPhase::Findings;
            }
        }
    }

    fn report_stage(&mut self, stage: &'static str) {
        if self.reported_stage != Some(stage) {
            self.reported_stage = Some(stage);
            self.activity.push(stage.to_string());
        }
    }
}

/// Body text of the findings panel.
pub fn findings_text(groups: &[LabelGroup]) -> String {
    let mut text =
        String::from("These are the groups of informations found in your document.\n");
    for group in groups {
        text.push_str(&format!(" [{}]: {},    ", group.label, group.meaning));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(Config::default(), Instant::now())
    }

    #[test]
    fn test_starts_on_auth_screen() {
        let app = test_app();
        assert_eq!(app.screen, Screen::Auth);
        assert_eq!(app.upload_phase, UploadPhase::PickFile);
    }

    #[test]
    fn test_confirm_empty_path_is_noop() {
        let mut app = test_app();
        app.path_input = "   ".to_string();
        app.confirm_path_input();
        assert_eq!(app.upload_phase, UploadPhase::PickFile);
        assert!(app.selected_file.is_none());
    }

    #[test]
    fn test_selecting_file_reveals_confirmation() {
        let mut app = test_app();
        app.path_input = "temp/report.pdf".to_string();
        app.confirm_path_input();
        assert_eq!(app.upload_phase, UploadPhase::Confirm);
        assert_eq!(
            app.selected_file,
            Some(PathBuf::from("temp/report.pdf"))
        );
    }

    #[test]
    fn test_checkbox_navigation_wraps() {
        let mut app = test_app();
        assert_eq!(app.checkboxes.len(), FORM_CATEGORIES.len());

        app.checkbox_previous();
        assert_eq!(app.checkbox_cursor, FORM_CATEGORIES.len() - 1);
        app.checkbox_next();
        assert_eq!(app.checkbox_cursor, 0);
    }

    #[test]
    fn test_checkbox_meanings_come_from_config() {
        let app = test_app();
        let person = &app.checkboxes[0];
        assert_eq!(person.label, "PERSON");
        assert_eq!(person.meaning, "Personnes");
        assert!(!person.checked);
    }

    #[tokio::test]
    async fn test_anonymize_with_zero_selected_is_noop() {
        let mut app = test_app();
        app.upload_phase = UploadPhase::Findings;
        app.staged_path = Some("temp/doc.pdf".to_string());

        app.submit_anonymize();

        // No network call: no handle was spawned, phase unchanged.
        assert!(!app.anonymize_in_flight());
        assert_eq!(app.upload_phase, UploadPhase::Findings);
    }

    #[tokio::test]
    async fn test_anonymize_with_selection_spawns_request() {
        let mut app = test_app();
        app.upload_phase = UploadPhase::Findings;
        app.staged_path = Some("temp/doc.pdf".to_string());
        app.checkboxes[0].checked = true;

        app.submit_anonymize();

        assert!(app.anonymize_in_flight());
        assert_eq!(app.upload_phase, UploadPhase::Redacting);
    }

    #[tokio::test]
    async fn test_submit_upload_without_selection_is_noop() {
        let mut app = test_app();
        app.upload_phase = UploadPhase::Confirm;
        app.submit_upload();
        assert!(!app.analysis_in_flight());
        assert_eq!(app.upload_phase, UploadPhase::Confirm);
    }

    #[test]
    fn test_findings_text_format() {
        let groups = vec![
            LabelGroup {
                label: "PERSON".to_string(),
                meaning: "Personnes".to_string(),
                values: vec!["Isaac".to_string()],
            },
            LabelGroup {
                label: "EMAIL".to_string(),
                meaning: "Emails".to_string(),
                values: vec!["a@b.com".to_string()],
            },
        ];
        let text = findings_text(&groups);
        assert!(text.starts_with("These are the groups of informations"));
        assert!(text.contains("[PERSON]: Personnes"));
        assert!(text.contains("[EMAIL]: Emails"));
    }

    #[test]
    fn test_upload_surface_fraction_by_phase() {
        let mut app = test_app();
        let now = Instant::now();

        assert!((app.upload_surface_fraction(now) - 1.0).abs() < f32::EPSILON);

        app.upload_phase = UploadPhase::Collapsing {
            until: now + Duration::from_millis(650),
        };
        let half = app.upload_surface_fraction(now);
        assert!(half > 0.0 && half < 1.0);

        app.upload_phase = UploadPhase::Findings;
        assert!(app.upload_surface_fraction(now).abs() < f32::EPSILON);
    }

    #[test]
    fn test_collapse_finishes_into_findings_panel() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut app = test_app();
        let mut rng = StdRng::seed_from_u64(1);
        let now = Instant::now();

        app.groups = vec![LabelGroup {
            label: "PERSON".to_string(),
            meaning: "Personnes".to_string(),
            values: vec!["Isaac".to_string()],
        }];
        app.upload_phase = UploadPhase::Collapsing {
            until: now + Duration::from_millis(10),
        };

        app.tick(now + Duration::from_millis(20), &mut rng);

        assert_eq!(app.upload_phase, UploadPhase::Findings);
        assert_eq!(app.panels.len(), 1);
        assert_eq!(app.panels[0].name, "analyze");
    }

    #[test]
    fn test_second_panel_mounts_after_first_fills() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut app = test_app();
        let mut rng = StdRng::seed_from_u64(2);
        let start = Instant::now();

        app.upload_phase = UploadPhase::Collapsing {
            until: start + Duration::from_millis(10),
        };

        // Drive well past collapse + expand + typing of the short body.
        let mut t = 0;
        while t <= 8000 {
            app.tick(start + Duration::from_millis(t), &mut rng);
            t += 20;
        }

        assert_eq!(app.panels.len(), 2);
        assert_eq!(app.panels[1].name, "anonymization");
    }
}
