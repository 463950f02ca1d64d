//! # Auth Panel Toggle
//!
//! Two mutually exclusive authentication panels (login / register) tracked by
//! a single active name. A toggle slides the current panel out, waits a fixed
//! delay, then swaps in the other panel and restarts its typed intro.
//!
//! Rapid re-toggling during the pending delay is deliberately not guarded:
//! a second request before the timer fires replaces the pending swap, which
//! can interleave transitions. Accepted limitation.

use std::time::{Duration, Instant};

use crate::anim::{TextSlots, Typewriter};

/// Delay between the slide-out and the panel swap.
const SWAP_DELAY: Duration = Duration::from_millis(750);
/// Per-character delay for panel intros.
const INTRO_DELAY: Duration = Duration::from_millis(20);

/// Slot the active panel's intro is typed into.
pub const AUTH_SLOT: &str = "auth-text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPanelKind {
    Login,
    Register,
}

impl AuthPanelKind {
    pub fn name(self) -> &'static str {
        match self {
            AuthPanelKind::Login => "login",
            AuthPanelKind::Register => "register",
        }
    }

    pub fn other(self) -> Self {
        match self {
            AuthPanelKind::Login => AuthPanelKind::Register,
            AuthPanelKind::Register => AuthPanelKind::Login,
        }
    }

    fn intro(self) -> &'static str {
        match self {
            AuthPanelKind::Login => {
                "ACCESS TERMINAL\n\nIdentify yourself to continue.\n\nuser >\npassword >"
            }
            AuthPanelKind::Register => {
                "NEW OPERATOR\n\nRegister an account to continue.\n\nuser >\nemail >\npassword >"
            }
        }
    }
}

/// State of the auth surface: which panel is active, whether a swap is
/// pending, and the intro typewriter for the active panel.
pub struct AuthToggle {
    active: AuthPanelKind,
    pending: Option<(AuthPanelKind, Instant)>,
    sliding_out: bool,
    /// Set once the panel's fields have been typed in; reset on every swap.
    pub field_loaded: bool,
    intro: Typewriter,
}

impl AuthToggle {
    /// Start with the login panel active and its intro typing from `now`.
    pub fn new(now: Instant) -> Self {
        let mut intro = Typewriter::new("auth", INTRO_DELAY);
        intro.queue(AUTH_SLOT, AuthPanelKind::Login.intro(), now);
        Self {
            active: AuthPanelKind::Login,
            pending: None,
            sliding_out: false,
            field_loaded: false,
            intro,
        }
    }

    pub fn active(&self) -> AuthPanelKind {
        self.active
    }

    /// Whether a panel button renders as active. Buttons flip at swap time,
    /// together with the panel itself.
    pub fn button_active(&self, kind: AuthPanelKind) -> bool {
        kind == self.active
    }

    /// Whether the current panel is sliding out ahead of a swap.
    pub fn is_sliding_out(&self) -> bool {
        self.sliding_out
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_none() && self.intro.is_finished()
    }

    /// Request a toggle to `to`. Ignored when `to` is already active. A
    /// request landing while another swap is pending replaces it (unguarded,
    /// see module docs).
    pub fn request_toggle(&mut self, to: AuthPanelKind, now: Instant) -> bool {
        if to == self.active {
            return false;
        }
        self.sliding_out = true;
        self.pending = Some((to, now + SWAP_DELAY));
        true
    }

    /// Advance pending swaps and the intro animation.
    pub fn tick(&mut self, now: Instant, slots: &mut TextSlots) {
        if let Some((to, at)) = self.pending {
            if now >= at {
                // Remove the old panel, inject the other one, flip the
                // tracked name, and restart the typed intro.
                self.pending = None;
                self.sliding_out = false;
                self.active = to;
                slots.clear(AUTH_SLOT);
                self.intro.reset(slots);
                self.intro.queue(AUTH_SLOT, to.intro(), now);
                self.field_loaded = false;
            }
        }

        self.intro.tick(now, slots);
        if self.intro.is_finished() && self.pending.is_none() {
            self.field_loaded = true;
        }
    }
}
