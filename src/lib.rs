//! Veil TUI - A terminal UI for anonymizing documents
//!
//! This library provides the building blocks for the veil client: tick-driven
//! text animations, the terminal-panel and auth surfaces, and the upload /
//! extraction / labelling / anonymization pipeline that talks to the remote
//! services.

pub mod anim;
pub mod pipeline;
pub mod ui;
