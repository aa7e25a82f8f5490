//! This binary serves a prioritized copy of an upstream iCalendar feed.
//!
//! The path is `/calendar.ics`, the query string may set `zoom_priority`, `zoom_reminder`,
//! `zoom_reminder_minutes`, `other_priority`, `other_reminder` and `other_reminder_minutes`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use clap::Parser;
use hpc_core::{feed_client::FeedUrl, policy::PolicyConfig, serializer::FeedMetadata};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod route;

#[derive(Debug, Parser)]
#[command(about = "Serve a prioritized copy of an iCalendar feed")]
struct Arguments {
    /// the address to listen on
    #[arg(long, env = "HPC_LISTEN", default_value = "0.0.0.0:8008")]
    listen: SocketAddr,
    /// the upstream feed
    #[arg(long, env = "HPC_FEED_URL", hide_env_values = true)]
    feed_url: FeedUrl,
    /// the name of the generated calendar
    #[arg(long, env = "HPC_CALENDAR_NAME")]
    calendar_name: Option<String>,
    /// the timezone announced by the generated calendar
    #[arg(long, env = "HPC_TIMEZONE")]
    timezone: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Arguments::parse();
    let mut metadata = FeedMetadata::default();
    if let Some(calendar_name) = args.calendar_name {
        metadata.name = calendar_name;
    }
    if let Some(timezone) = args.timezone {
        metadata.timezone = timezone;
    }
    let state = route::AppState {
        feed_url: args.feed_url,
        metadata,
        defaults: PolicyConfig::default(),
    };
    info!(listen = %args.listen, feed_url = %state.feed_url, "serving calendar");
    let app = route::router(Arc::new(state));
    axum::Server::bind(&args.listen)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
