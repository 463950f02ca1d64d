//! # Scramble Animator
//!
//! Cycles random lowercase letters through a piece of text before resolving
//! it left-to-right to the real characters. Used by the header title and the
//! footer tag.
//!
//! ## Reveal Rate
//!
//! The reveal counter advances by a fractional step (1/3 of a character per
//! tick), so some frames reveal no new character. That slow-reveal stutter is
//! intentional. A run self-cancels once every character is revealed; an outer
//! interval restarts the run unless looping is disabled, in which case the
//! animation plays exactly once.

use rand::Rng;
use std::time::{Duration, Instant};

/// Reveal counter advance per inner tick.
const REVEAL_STEP: f32 = 1.0 / 3.0;

/// A scramble animation over one piece of text.
#[derive(Debug)]
pub struct Scramble {
    original: Vec<char>,
    display: String,
    /// Fractional count of characters revealed so far in the current run.
    revealed: f32,
    /// Inner tick rate while a run is in progress.
    speed: Duration,
    /// Delay before the first run, and the repeat period when looping.
    interval: Duration,
    looping: bool,
    running: bool,
    next_tick_at: Instant,
    next_run_at: Option<Instant>,
}

impl Scramble {
    /// Capture `text` as the resolve target. The first run starts one
    /// `interval` after `now`; until then the original text is shown.
    pub fn new(text: &str, interval: Duration, speed: Duration, looping: bool, now: Instant) -> Self {
        Self {
            original: text.chars().collect(),
            display: text.to_string(),
            revealed: 0.0,
            speed,
            interval,
            looping,
            running: false,
            next_tick_at: now,
            next_run_at: Some(now + interval),
        }
    }

    /// Text to draw this frame.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Whether a reveal run is currently in progress.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether anything is left to do (a run in progress or one scheduled).
    pub fn is_active(&self) -> bool {
        self.running || self.next_run_at.is_some()
    }

    /// Advance the animation.
    pub fn tick<R: Rng>(&mut self, now: Instant, rng: &mut R) {
        // Outer interval: start (or restart) a run when due.
        if !self.running {
            if let Some(at) = self.next_run_at {
                if now >= at {
                    self.running = true;
                    self.revealed = 0.0;
                    self.next_tick_at = now;
                    self.next_run_at = if self.looping {
                        Some(at + self.interval)
                    } else {
                        None
                    };
                }
            }
        }

        // Inner interval: rebuild the display at the configured speed.
        while self.running && now >= self.next_tick_at {
            self.display = self
                .original
                .iter()
                .enumerate()
                .map(|(i, &c)| {
                    if (i as f32) < self.revealed {
                        c
                    } else {
                        random_lowercase(rng)
                    }
                })
                .collect();

            // Self-cancel once fully revealed; the display just built used
            // original characters for every position.
            if self.revealed >= self.original.len() as f32 {
                self.running = false;
                self.display = self.original.iter().collect();
                break;
            }

            self.revealed += REVEAL_STEP;
            self.next_tick_at += self.speed;
        }
    }
}

fn random_lowercase<R: Rng>(rng: &mut R) -> char {
    rng.random_range(b'a'..=b'z') as char
}
