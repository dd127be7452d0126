//! Dashboard tabs.

use serde::{Deserialize, Serialize};

/// Active view tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Analytics,
    Inbox,
    Products,
    Orders,
    Insights,
}

impl Tab {
    /// Returns all tabs in display order.
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Analytics,
            Tab::Inbox,
            Tab::Products,
            Tab::Orders,
            Tab::Insights,
        ]
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Analytics => "Analytics",
            Tab::Inbox => "Inbox",
            Tab::Products => "Products",
            Tab::Orders => "Orders",
            Tab::Insights => "AI Insights",
        }
    }

    /// Parses a tab from its snake_case key.
    pub fn from_key(key: &str) -> Option<Tab> {
        Tab::all()
            .iter()
            .copied()
            .find(|tab| tab.key() == key)
    }

    /// Returns the snake_case key.
    pub fn key(&self) -> &'static str {
        match self {
            Tab::Analytics => "analytics",
            Tab::Inbox => "inbox",
            Tab::Products => "products",
            Tab::Orders => "orders",
            Tab::Insights => "insights",
        }
    }
}
