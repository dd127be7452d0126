//! Toolkit-independent user interface.
//!
//! The UI is organized into:
//! - `views`: view models for the dashboard, message list and draft panel,
//!   plus a plain-text renderer

pub mod views;

pub use views::{render_text, ActiveView};
