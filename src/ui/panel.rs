//! # Terminal Panel
//!
//! A reusable pop-in panel: it mounts collapsed (zero size), expands to its
//! target size after a short delay, then type-animates its body text via the
//! typewriter engine.
//!
//! ## Lifecycle
//!
//! ```text
//! Collapsed ──(mount delay)──▶ Expanding ──(open duration)──▶ Typing ──▶ Filled
//! ```
//!
//! Panels never transition backward; the workspace appends new panels and
//! never reuses one.

use std::time::{Duration, Instant};

use crate::anim::{TextSlots, Typewriter};

/// Delay between mounting and the start of the expand animation.
const MOUNT_DELAY: Duration = Duration::from_millis(200);
/// Duration of the expand animation.
const OPEN_DURATION: Duration = Duration::from_millis(1300);
/// Per-character delay for the body text.
const TYPE_DELAY: Duration = Duration::from_millis(25);

/// Where a panel is in its pop-in lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    /// Mounted but invisible (zero size).
    Collapsed,
    /// Size animating toward the target.
    Expanding,
    /// Fully open; the typewriter is running over the body.
    Typing,
    /// Body text completely typed.
    Filled,
}

/// A pop-in panel that types its body text into a text slot named
/// `{name}-text`.
pub struct TerminalPanel {
    pub name: String,
    pub body: String,
    phase: PanelPhase,
    mounted_at: Instant,
    typewriter: Typewriter,
}

impl TerminalPanel {
    pub fn new(name: impl Into<String>, body: impl Into<String>, now: Instant) -> Self {
        let name = name.into();
        let typewriter = Typewriter::new(name.clone(), TYPE_DELAY);
        Self {
            name,
            body: body.into(),
            phase: PanelPhase::Collapsed,
            mounted_at: now,
            typewriter,
        }
    }

    /// The text slot this panel's body is typed into.
    pub fn slot(&self) -> String {
        format!("{}-text", self.name)
    }

    /// Title rendered on the panel frame, e.g. `<ANALYZE/>`.
    pub fn title(&self) -> String {
        format!("<{}/>", self.name.to_uppercase())
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn is_filled(&self) -> bool {
        self.phase == PanelPhase::Filled
    }

    /// Fraction of the target size currently occupied, 0.0 to 1.0.
    pub fn grow_fraction(&self, now: Instant) -> f32 {
        match self.phase {
            PanelPhase::Collapsed => 0.0,
            PanelPhase::Expanding => {
                let since_open = now
                    .saturating_duration_since(self.mounted_at + MOUNT_DELAY)
                    .as_secs_f32();
                (since_open / OPEN_DURATION.as_secs_f32()).clamp(0.0, 1.0)
            }
            PanelPhase::Typing | PanelPhase::Filled => 1.0,
        }
    }

    /// Advance the lifecycle. Forward-only.
    pub fn tick(&mut self, now: Instant, slots: &mut TextSlots) {
        match self.phase {
            PanelPhase::Collapsed => {
                if now >= self.mounted_at + MOUNT_DELAY {
                    self.phase = PanelPhase::Expanding;
                }
            }
            PanelPhase::Expanding => {
                if now >= self.mounted_at + MOUNT_DELAY + OPEN_DURATION {
                    self.phase = PanelPhase::Typing;
                    self.typewriter.queue(self.slot(), self.body.clone(), now);
                }
            }
            PanelPhase::Typing => {
                self.typewriter.tick(now, slots);
                if self.typewriter.is_finished() {
                    self.phase = PanelPhase::Filled;
                }
            }
            PanelPhase::Filled => {}
        }
    }
}
