//! # Animation Primitives
//!
//! Tick-driven text animations shared by the UI surfaces.
//!
//! ## Components
//!
//! - [`Typewriter`] - character-by-character reveal with a blinking cursor
//! - [`Scramble`] - random-letter cycling that resolves to the real text
//! - [`TextSlots`] - named text buffers the animations write into
//!
//! Both animations are pure state machines: the main event loop calls
//! `tick(now, ...)` every frame and the renderer reads the current display
//! state. Nothing here touches the terminal directly, which keeps the
//! animations testable without a TTY.

pub mod scramble;
pub mod typewriter;

pub use scramble::Scramble;
pub use typewriter::{TextSlots, Typewriter};
