//! Application state and orchestration.
//!
//! This module contains:
//! - The dashboard orchestrator and its intents (controller.rs)
//! - Dashboard state and render snapshots (state.rs)
//! - Event bus for notifying the rendering layer (events.rs)

pub mod controller;
pub mod events;
pub mod state;

pub use controller::Dashboard;
pub use events::{DashboardEvent, EventBus};
pub use state::{DashboardSnapshot, DashboardState};
