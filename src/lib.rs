//! shopdesk - seller dashboard core.
//!
//! Surfaces storefront analytics, a customer message inbox and AI-drafted
//! replies on top of a remote dashboard backend. The crate owns the client
//! side: connection state for the storefront and mail providers, what to
//! fetch and when, the filterable message list, and the reply draft
//! workflow. Rendering is left to the front end; [`ui::views`] builds
//! toolkit-independent view models from a [`DashboardSnapshot`].

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod ui;

pub use api::{DashboardApi, HttpDashboardApi};
pub use app::{Dashboard, DashboardEvent, DashboardSnapshot};
pub use config::DashboardConfig;
pub use error::{ApiError, ClipboardError, ConfigError, DraftError};
