//! This client fetches the upstream calendar and prioritizes its events.

use std::{fmt, str::FromStr, time::Duration};

use reqwest::Url;
use tracing::info;

use crate::{
    classifier::{classify, EventCategory},
    error::{InvalidFeedUrl, Result},
    event::OutputEvent,
    parser::parse,
    policy::PolicyConfig,
    serializer::{serialize, FeedMetadata},
};

static USER_AGENT: &str = "Calendar-Priority-Service/1.0";
static TIMEOUT: Duration = Duration::from_secs(30);

/// The URL of the upstream feed.
///
/// Its query carries the export token, so it is redacted whenever the URL is displayed.
#[derive(Clone, PartialEq, Eq)]
pub struct FeedUrl(Url);

impl FromStr for FeedUrl {
    type Err = InvalidFeedUrl;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let url = Url::parse(value).map_err(|err| InvalidFeedUrl {
            reason: err.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(FeedUrl(url)),
            scheme => Err(InvalidFeedUrl {
                reason: format!("unsupported scheme {scheme:?}"),
            }),
        }
    }
}

impl fmt::Display for FeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.0.scheme())?;
        if let Some(host) = self.0.host_str() {
            write!(f, "{host}")?;
        }
        if let Some(port) = self.0.port() {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.0.path())?;
        if self.0.query().is_some() {
            write!(f, "?<redacted>")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FeedUrl").field(&self.to_string()).finish()
    }
}

/// Get the prioritized calendar text for the upstream feed.
pub async fn get(url: &FeedUrl, config: &PolicyConfig, metadata: &FeedMetadata) -> Result<String> {
    let text = fetch(url).await?;
    Ok(transform(&text, config, metadata))
}

/// Get the raw upstream feed.
///
/// There is a single attempt, any failure or non-success status is an error.
pub async fn fetch(url: &FeedUrl) -> Result<String> {
    info!(%url, "fetching upstream calendar");
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()?;
    let response = client.get(url.0.clone()).send().await?.error_for_status()?;
    let text = response.text().await?;
    Ok(text)
}

/// Reclassify every event of a feed and render the new feed.
pub fn transform(text: &str, config: &PolicyConfig, metadata: &FeedMetadata) -> String {
    let output_events: Vec<OutputEvent> = parse(text)
        .into_iter()
        .map(|event| {
            let category = classify(&event);
            OutputEvent::new(event, category, config)
        })
        .collect();
    let meeting_events = output_events
        .iter()
        .filter(|output_event| output_event.category == EventCategory::PrimaryMeeting)
        .count();
    info!(
        meeting_events,
        other_events = output_events.len() - meeting_events,
        "processed calendar"
    );
    serialize(&output_events, metadata)
}
