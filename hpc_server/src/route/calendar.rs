use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, EXPIRES, PRAGMA},
        StatusCode,
    },
    response::{IntoResponse, Response},
};
use hpc_core::{feed_client, policy::PolicyConfig};
use serde::Deserialize;
use tracing::error;

use crate::route::AppState;

/// The raw policy parameters, parsed leniently in [`QueryParams::policy`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    zoom_priority: Option<String>,
    zoom_reminder: Option<String>,
    zoom_reminder_minutes: Option<String>,
    other_priority: Option<String>,
    other_reminder: Option<String>,
    other_reminder_minutes: Option<String>,
}

impl QueryParams {
    /// Absent or unreadable parameters fall back to `defaults`.
    pub fn policy(&self, defaults: &PolicyConfig) -> PolicyConfig {
        PolicyConfig {
            zoom_priority: number(&self.zoom_priority, defaults.zoom_priority),
            zoom_reminder: flag(&self.zoom_reminder, defaults.zoom_reminder),
            zoom_reminder_minutes: number(
                &self.zoom_reminder_minutes,
                defaults.zoom_reminder_minutes,
            ),
            other_priority: number(&self.other_priority, defaults.other_priority),
            other_reminder: flag(&self.other_reminder, defaults.other_reminder),
            other_reminder_minutes: number(
                &self.other_reminder_minutes,
                defaults.other_reminder_minutes,
            ),
        }
    }
}

fn number<T: FromStr>(value: &Option<String>, default: T) -> T {
    value
        .as_deref()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// A given flag is set only by `true`.
fn flag(value: &Option<String>, default: bool) -> bool {
    value
        .as_deref()
        .map_or(default, |value| value.trim().eq_ignore_ascii_case("true"))
}

/// Handle calendar requests.
///
/// The policy is read from the query string, the calendar is fetched fresh for every request.
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Query(query_params): Query<QueryParams>,
) -> Result<Response, (StatusCode, String)> {
    let config = query_params.policy(&state.defaults);
    let ics = feed_client::get(&state.feed_url, &config, &state.metadata)
        .await
        .map_err(|err| {
            error!(error = %err, "serving calendar failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing calendar: {err}"),
            )
        })?;
    let response = (
        [
            (CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=high_priority_events.ics",
            ),
            (CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (PRAGMA, "no-cache"),
            (EXPIRES, "0"),
        ],
        ics,
    )
        .into_response();
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{
            header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
            Request, StatusCode,
        },
        Router,
    };
    use hpc_core::{policy::PolicyConfig, serializer::FeedMetadata};
    use tower::ServiceExt;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::route::router;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
        BEGIN:VEVENT\r\nUID:zoom-1\r\nSUMMARY:Lecture\r\n\
        DESCRIPTION:Join https://futurense.zoom.us/j/123\r\n\
        DTSTART:20231201T143000Z\r\nEND:VEVENT\r\n\
        BEGIN:VEVENT\r\nUID:other-1\r\nSUMMARY:Library\r\n\
        DTSTART:20231202T100000Z\r\nEND:VEVENT\r\n\
        END:VCALENDAR\r\n";

    async fn app(status: u16) -> (MockServer, Router) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string(FEED))
            .expect(1)
            .mount(&server)
            .await;
        let state = AppState {
            feed_url: format!("{}/export.php?authtoken=secret-token", server.uri())
                .parse()
                .unwrap(),
            metadata: FeedMetadata::default(),
            defaults: PolicyConfig::default(),
        };
        (server, router(Arc::new(state)))
    }

    async fn body_text(response: Response) -> String {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_policy_from_empty_query_params() {
        let query_params = QueryParams::default();
        assert_eq!(
            query_params.policy(&PolicyConfig::default()),
            PolicyConfig::default()
        );
    }

    #[test]
    fn test_policy_from_query_params() {
        let query_params = QueryParams {
            zoom_priority: Some("2".to_string()),
            zoom_reminder: Some("false".to_string()),
            zoom_reminder_minutes: Some("30".to_string()),
            other_priority: Some("9".to_string()),
            other_reminder: Some("TRUE".to_string()),
            other_reminder_minutes: Some("5".to_string()),
        };
        assert_eq!(
            query_params.policy(&PolicyConfig::default()),
            PolicyConfig {
                zoom_priority: 2,
                zoom_reminder: false,
                zoom_reminder_minutes: 30,
                other_priority: 9,
                other_reminder: true,
                other_reminder_minutes: 5,
            }
        );
    }

    #[test]
    fn test_policy_from_unreadable_query_params() {
        let query_params = QueryParams {
            zoom_priority: Some("high".to_string()),
            zoom_reminder: Some("yes".to_string()),
            zoom_reminder_minutes: Some("-5".to_string()),
            other_priority: Some("".to_string()),
            other_reminder: None,
            other_reminder_minutes: Some("1.5".to_string()),
        };
        let defaults = PolicyConfig::default();
        assert_eq!(
            query_params.policy(&defaults),
            PolicyConfig {
                zoom_reminder: false,
                ..defaults
            }
        );
    }

    #[tokio::test]
    async fn test_handler_serves_calendar() {
        let (_server, app) = app(200).await;
        let request = Request::builder()
            .uri("/calendar.ics?zoom_priority=2&zoom_reminder_minutes=30&other_reminder=true")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/calendar; charset=utf-8"
        );
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=high_priority_events.ics"
        );
        assert_eq!(
            response.headers()[CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        let text = body_text(response).await;
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.contains(&"PRIORITY:2"));
        assert!(lines.contains(&"TRIGGER:-PT30M"));
        assert!(lines.contains(&"PRIORITY:5"));
        assert!(lines.contains(&"TRIGGER:-PT10M"));
    }

    #[tokio::test]
    async fn test_handler_upstream_failure() {
        let (_server, app) = app(500).await;
        let request = Request::builder()
            .uri("/calendar.ics")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = body_text(response).await;
        assert!(text.starts_with("Error processing calendar:"));
        assert!(!text.contains("BEGIN:VCALENDAR"));
        assert!(!text.contains("secret-token"));
    }
}
