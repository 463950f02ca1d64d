//! # UI Module
//!
//! Terminal user interface components for veil.
//!
//! ## Components
//!
//! - [`App`] - application state (screen, upload flow, animations, handles)
//! - [`mod@render`] - rendering functions for drawing the TUI
//! - [`auth`] - the login/register panel toggle
//! - [`panel`] - pop-in terminal panels with typed bodies
//! - [`config`] - persisted configuration (theme, endpoints, label meanings)
//! - [`theme`] - built-in color themes

pub mod app;
pub mod auth;
pub mod config;
pub mod panel;
pub mod render;
pub mod theme;

pub use app::App;
pub use render::render;
