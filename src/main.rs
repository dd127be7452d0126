//! `shopdesk` - command-line front end for the seller dashboard.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopdesk::domain::{InboxFilter, MessageId, Provider, Tab};
use shopdesk::ui::render_text;
use shopdesk::{Dashboard, DashboardConfig, DashboardEvent, HttpDashboardApi};

#[derive(Parser, Debug)]
#[command(name = "shopdesk")]
#[command(about = "Seller dashboard: storefront analytics, inbox and AI-drafted replies")]
struct Args {
    /// Tab to show: analytics, inbox, products, orders or insights
    #[arg(long, default_value = "analytics")]
    tab: String,

    /// Inbox filter: all, needs_reply or refunds
    #[arg(long, default_value = "all")]
    filter: String,

    /// Connect a provider (etsy or gmail) after loading
    #[arg(long)]
    connect: Option<String>,

    /// Pull new mail into the backend before showing the inbox
    #[arg(long)]
    sync: bool,

    /// Generate a reply draft for this message id
    #[arg(long)]
    draft: Option<String>,

    /// Copy the generated draft to the clipboard
    #[arg(long, requires = "draft")]
    copy: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let tab = Tab::from_key(&args.tab).with_context(|| format!("Unknown tab `{}`", args.tab))?;
    let filter = InboxFilter::from_query(&args.filter)
        .with_context(|| format!("Unknown filter `{}`", args.filter))?;
    let connect = args
        .connect
        .as_deref()
        .map(|key| {
            Provider::from_source_key(key).with_context(|| format!("Unknown provider `{}`", key))
        })
        .transpose()?;

    let config = DashboardConfig::load().context("Failed to load configuration")?;
    let api = Arc::new(HttpDashboardApi::new(&config)?);
    info!(api = %api.base_url(), "Starting shopdesk");

    let dashboard = Dashboard::new(api, &config);
    let mut events = dashboard.subscribe();

    match dashboard.health().await {
        Ok(true) => {}
        Ok(false) => warn!("Backend reports itself unhealthy"),
        Err(e) => warn!(error = %e, "Backend health check failed"),
    }

    dashboard.refresh_all().await;

    if let Some(provider) = connect {
        // Failures land in the error banner.
        let _ = dashboard.connect(provider).await;
    }
    if filter != InboxFilter::default() {
        dashboard.set_filter(filter).await;
    }
    if args.sync {
        let _ = dashboard.sync_mail().await;
    }
    dashboard.set_tab(tab).await;

    if let Some(id) = args.draft {
        dashboard.set_tab(Tab::Inbox).await;
        dashboard.generate_draft(&MessageId::from(id)).await?;
        if args.copy {
            dashboard.copy_result().await?;
        }
    }

    print!("{}", render_text(&dashboard.snapshot().await));

    while let Ok(event) = events.try_recv() {
        if let DashboardEvent::NavigateExternally { provider, url } = event {
            println!(
                "\nOpen this address to connect {}:\n{}",
                provider.display_name(),
                url
            );
        }
    }
    Ok(())
}
