//! Application views.
//!
//! Views are pure functions of a [`DashboardSnapshot`](crate::app::DashboardSnapshot):
//! each builds a view model the front end draws however it likes.

mod dashboard;
mod draft_panel;
mod message_list;

pub use dashboard::{metric_cards, render_text, ActiveView, ConnectionBadge, MetricCard};
pub use draft_panel::DraftPanel;
pub use message_list::{filter_tabs, FilterTab, MessageList, MessageRow};
