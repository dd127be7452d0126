//! Top-level dashboard view.
//!
//! Decides what the active tab shows, builds the metric cards and the
//! connection badges, and renders the whole snapshot as plain text for the
//! command-line front end.

use std::fmt::Write;

use super::draft_panel::DraftPanel;
use super::message_list::MessageList;
use crate::app::DashboardSnapshot;
use crate::domain::{ConnectionState, ConnectionStatus, Provider, ShopMetrics, Tab};

/// One KPI tile.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    /// Period-over-period change, e.g. "+12.5%".
    pub change: Option<String>,
}

impl MetricCard {
    fn new(title: &'static str, value: String, change: Option<f64>) -> Self {
        Self {
            title,
            value,
            change: change.map(|c| format!("{:+.1}%", c)),
        }
    }
}

/// Builds the analytics tiles. Missing metrics display as zero.
pub fn metric_cards(metrics: Option<&ShopMetrics>) -> Vec<MetricCard> {
    let zero = ShopMetrics::default();
    let m = metrics.unwrap_or(&zero);
    let d = &m.deltas;
    vec![
        MetricCard::new("Orders", m.orders.to_string(), d.orders),
        MetricCard::new("Revenue", format!("${:.2}", m.gmv), d.gmv),
        MetricCard::new("Visits", m.visits.to_string(), d.visits),
        MetricCard::new("Views", m.views.to_string(), d.views),
        MetricCard::new(
            "Conversion",
            format!("{:.1}%", m.conversion_rate),
            d.conversion_rate,
        ),
        MetricCard::new("Favorites", m.favorites.to_string(), d.favorites),
    ]
}

/// Badge shown in the header for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionBadge {
    pub provider: Provider,
    pub status: ConnectionStatus,
    pub label: String,
}

impl ConnectionBadge {
    pub fn from_state(state: &ConnectionState) -> Self {
        let status = state.status();
        let label = match (&state.identity, status) {
            (Some(identity), ConnectionStatus::Connected) => {
                format!("{}: {} ({})", state.provider.display_name(), status.label(), identity)
            }
            _ => format!("{}: {}", state.provider.display_name(), status.label()),
        };
        Self {
            provider: state.provider,
            status,
            label,
        }
    }
}

/// What the body of the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveView {
    /// The provider the tab depends on is not connected.
    ConnectPrompt {
        provider: Provider,
        title: String,
        body: String,
    },
    Analytics(Vec<MetricCard>),
    Inbox {
        list: MessageList,
        draft: DraftPanel,
    },
    /// Tabs without content of their own yet.
    Placeholder {
        title: &'static str,
        body: &'static str,
    },
}

impl ActiveView {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        match snapshot.tab {
            Tab::Inbox if !snapshot.mail.connected => connect_prompt(Provider::Mail),
            Tab::Inbox => ActiveView::Inbox {
                list: MessageList::from_snapshot(snapshot),
                draft: DraftPanel::from_snapshot(snapshot),
            },
            _ if !snapshot.storefront.is_connected_or_pending() => {
                connect_prompt(Provider::Storefront)
            }
            Tab::Analytics => ActiveView::Analytics(metric_cards(snapshot.metrics.as_ref())),
            Tab::Products => ActiveView::Placeholder {
                title: "Top Products",
                body: "Product analytics will appear here when you have listings data.",
            },
            Tab::Orders => ActiveView::Placeholder {
                title: "Recent Orders",
                body: "Order details and trends will appear here.",
            },
            Tab::Insights => ActiveView::Placeholder {
                title: "AI Insights",
                body: "AI-powered recommendations will appear here.",
            },
        }
    }
}

fn connect_prompt(provider: Provider) -> ActiveView {
    let (title, body) = match provider {
        Provider::Storefront => (
            "Connect Your Etsy Store".to_string(),
            "Connect your Etsy store to view analytics and insights".to_string(),
        ),
        Provider::Mail => (
            "Connect Your Gmail".to_string(),
            "Connect Gmail to triage customer messages and draft replies".to_string(),
        ),
    };
    ActiveView::ConnectPrompt {
        provider,
        title,
        body,
    }
}

/// Renders a snapshot as plain text.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    let badges: Vec<String> = [&snapshot.storefront, &snapshot.mail]
        .into_iter()
        .map(|state| ConnectionBadge::from_state(state).label)
        .collect();
    let _ = writeln!(out, "{}", badges.join(" | "));

    let tabs: Vec<String> = Tab::all()
        .iter()
        .map(|tab| {
            if *tab == snapshot.tab {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join("  "));

    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out, "Error: {}", error);
    }
    if snapshot.loading {
        let _ = writeln!(out, "Loading...");
    }
    out.push('\n');

    match ActiveView::from_snapshot(snapshot) {
        ActiveView::ConnectPrompt { title, body, .. } => {
            let _ = writeln!(out, "{}\n{}", title, body);
        }
        ActiveView::Analytics(cards) => {
            for card in cards {
                let _ = match card.change {
                    Some(change) => {
                        writeln!(out, "{:<12}{:>12}  {}", card.title, card.value, change)
                    }
                    None => writeln!(out, "{:<12}{:>12}", card.title, card.value),
                };
            }
        }
        ActiveView::Inbox { list, draft } => render_inbox(&mut out, &list, &draft),
        ActiveView::Placeholder { title, body } => {
            let _ = writeln!(out, "{}\n{}", title, body);
        }
    }
    out
}

fn render_inbox(out: &mut String, list: &MessageList, draft: &DraftPanel) {
    let tabs: Vec<String> = list
        .tabs
        .iter()
        .map(|t| {
            if t.active {
                format!("[{}]", t.label)
            } else {
                t.label.clone()
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join("  "));
    let _ = writeln!(out, "{}", list.header());

    if let Some(empty) = list.empty_state() {
        let _ = writeln!(out, "{}", empty);
    }
    for row in &list.rows {
        let marker = if row.is_selected { '>' } else { ' ' };
        let unread = if row.is_unread { '*' } else { ' ' };
        let mut badges = Vec::new();
        if let Some(priority) = row.priority {
            badges.push(priority.to_string());
        }
        if row.is_refund {
            badges.push("Refund".to_string());
        }
        if let Some(order) = &row.order {
            badges.push(order.clone());
        }
        let _ = writeln!(
            out,
            "{}{} {}  {}  {}  {}",
            marker,
            unread,
            row.timestamp,
            row.sender,
            row.subject,
            badges.join(", ")
        );
    }

    match draft {
        DraftPanel::Hidden | DraftPanel::NotNeeded | DraftPanel::Generate => {}
        DraftPanel::Generating => {
            let _ = writeln!(out, "\nGenerating draft...");
        }
        DraftPanel::Ready {
            content,
            confidence,
            rationale,
        } => {
            let _ = writeln!(
                out,
                "\nDraft reply ({}):\n{}\n\nWhy: {}",
                confidence, content, rationale
            );
        }
        DraftPanel::Failed { error } => {
            let _ = writeln!(out, "\nDraft failed: {}", error);
        }
    }
}
