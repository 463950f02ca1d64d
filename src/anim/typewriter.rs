//! # Typewriter Engine
//!
//! Reveals text one character at a time into named text slots, trailing a
//! blinking cursor marker. Several UI surfaces share this engine: the header
//! subtitle, the auth panel intros, and the terminal panels.
//!
//! ## Cursor Markers
//!
//! Each engine carries a cursor *tag*. Before a character is committed, the
//! previous cursor marker for that tag is removed (wherever it sits) and a
//! fresh one is attached to the slot receiving the character, so at most one
//! marker exists per tag at any time. The marker left in place after the last
//! character is intentional: the cursor keeps blinking at the end of the
//! typed text.
//!
//! ## Sequencing
//!
//! Segments queued on one engine run strictly one after another, never
//! concurrently, so the total duration is the sum of the individual segment
//! durations.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Named text buffers written by the animations and read by the renderer.
///
/// A slot is identified by a string key (e.g. `"subtitle"`,
/// `"analyze-text"`). Cursor markers are tracked separately per cursor tag so
/// the renderer can decide where to draw the blinking underscore.
#[derive(Debug, Default)]
pub struct TextSlots {
    texts: HashMap<String, String>,
    /// cursor tag -> slot currently holding that tag's marker
    cursors: HashMap<String, String>,
}

impl TextSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text of a slot, empty if the slot was never written.
    pub fn text(&self, slot: &str) -> &str {
        self.texts.get(slot).map_or("", String::as_str)
    }

    /// Overwrite a slot's text without animating.
    pub fn set(&mut self, slot: &str, text: impl Into<String>) {
        self.texts.insert(slot.to_string(), text.into());
    }

    /// Append raw text to a slot without animating.
    pub fn push_str(&mut self, slot: &str, text: &str) {
        self.texts.entry(slot.to_string()).or_default().push_str(text);
    }

    /// Remove a slot's text and any cursor markers attached to it.
    pub fn clear(&mut self, slot: &str) {
        self.texts.remove(slot);
        self.cursors.retain(|_, s| s != slot);
    }

    /// Whether any cursor tag currently has its marker on this slot.
    pub fn has_cursor(&self, slot: &str) -> bool {
        self.cursors.values().any(|s| s == slot)
    }

    /// Number of live cursor markers for a given tag (0 or 1).
    pub fn cursor_count(&self, tag: &str) -> usize {
        usize::from(self.cursors.contains_key(tag))
    }

    fn push_char(&mut self, slot: &str, c: char) {
        self.texts.entry(slot.to_string()).or_default().push(c);
    }

    fn place_cursor(&mut self, tag: &str, slot: &str) {
        self.cursors.insert(tag.to_string(), slot.to_string());
    }

    fn remove_cursor(&mut self, tag: &str) {
        self.cursors.remove(tag);
    }
}

/// One queued piece of work: type `text` into `slot`.
#[derive(Debug, Clone)]
struct Segment {
    slot: String,
    chars: Vec<char>,
}

/// Character-by-character text reveal with a per-tag cursor marker.
#[derive(Debug)]
pub struct Typewriter {
    tag: String,
    char_delay: Duration,
    queue: VecDeque<Segment>,
    /// Index of the next character within the front segment.
    pos: usize,
    next_char_at: Option<Instant>,
    finished: bool,
}

impl Typewriter {
    /// Create an idle engine. `tag` names the cursor marker this engine owns.
    pub fn new(tag: impl Into<String>, char_delay: Duration) -> Self {
        Self {
            tag: tag.into(),
            char_delay,
            queue: VecDeque::new(),
            pos: 0,
            next_char_at: None,
            finished: true,
        }
    }

    /// Queue a segment. Segments run in queue order, one at a time.
    ///
    /// Queueing onto an idle engine anchors the timing epoch at `now`: the
    /// first character comes due one char-delay later, whether or not a tick
    /// has run by then. Queueing onto a running engine just appends.
    pub fn queue(&mut self, slot: impl Into<String>, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.queue.push_back(Segment {
            slot: slot.into(),
            chars: text.chars().collect(),
        });
        if self.finished {
            self.next_char_at = Some(now + self.char_delay);
            self.finished = false;
        }
    }

    /// Drop all pending work and detach this engine's cursor marker.
    pub fn reset(&mut self, slots: &mut TextSlots) {
        self.queue.clear();
        self.pos = 0;
        self.next_char_at = None;
        self.finished = true;
        slots.remove_cursor(&self.tag);
    }

    /// True once every queued character has been placed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance the animation. Places every character that has come due since
    /// the last call, so a slow frame catches up rather than stretching the
    /// total duration.
    pub fn tick(&mut self, now: Instant, slots: &mut TextSlots) {
        if self.finished {
            return;
        }

        let mut due = match self.next_char_at {
            Some(at) => at,
            None => return,
        };

        while now >= due {
            let Some(segment) = self.queue.front() else {
                self.finished = true;
                self.next_char_at = None;
                return;
            };

            // Skip over empty segments without consuming a delay slot.
            if segment.chars.is_empty() {
                self.queue.pop_front();
                self.pos = 0;
                if self.queue.is_empty() {
                    self.finished = true;
                    self.next_char_at = None;
                    return;
                }
                continue;
            }

            let c = segment.chars[self.pos];
            let slot = segment.slot.clone();

            slots.remove_cursor(&self.tag);
            slots.push_char(&slot, c);
            slots.place_cursor(&self.tag, &slot);

            self.pos += 1;
            if self.pos >= segment.chars.len() {
                self.queue.pop_front();
                self.pos = 0;
                if self.queue.is_empty() {
                    self.finished = true;
                    self.next_char_at = None;
                    return;
                }
            }

            due += self.char_delay;
            self.next_char_at = Some(due);
        }
    }
}
