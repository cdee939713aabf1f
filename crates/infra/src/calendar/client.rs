//! HTTP client for the calendar provider's events API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hireflow_core::{AvailabilityProvider, BusyEvent};
use hireflow_domain::{CalendarConfig, HireflowError, Result, TimeWindow};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::errors::InfraError;

/// Calendar API client implementing the [`AvailabilityProvider`] port.
///
/// Fetches the manager's events inside the scheduling window with bearer
/// auth; the pure availability derivation lives in core.
pub struct CalendarClient {
    http: Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new(config: &CalendarConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| HireflowError::Config(format!("HTTP client build failed: {err}")))?;
        Ok(Self { http, base_url: config.api_base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl AvailabilityProvider for CalendarClient {
    #[instrument(skip(self, access_token, window))]
    async fn busy_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<BusyEvent>> {
        let url = format!("{}/calendars/{}/events", self.base_url, calendar_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", window.start.to_rfc3339()),
                ("timeMax", window.end.to_rfc3339()),
                ("singleEvents", "true".to_string()),
            ])
            .send()
            .await
            .map_err(InfraError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let payload: EventsResponse = response.json().await.map_err(|err| {
            HireflowError::CalendarUnavailable(format!("malformed events response: {err}"))
        })?;

        let mut busy = Vec::with_capacity(payload.items.len());
        for event in payload.items {
            // Cancelled and free-time events do not block a slot.
            if matches!(event.status.as_deref(), Some("cancelled"))
                || matches!(event.transparency.as_deref(), Some("transparent"))
            {
                continue;
            }
            match (event.start.and_then(|t| t.date_time), event.end.and_then(|t| t.date_time)) {
                (Some(start), Some(end)) => busy.push(BusyEvent { start, end }),
                _ => {
                    // All-day events carry date-only bounds; they never
                    // intersect the working-hours slots we carve.
                    debug!(event_id = %event.id.unwrap_or_default(), "skipping event without timed bounds");
                }
            }
        }

        debug!(count = busy.len(), "fetched busy events");
        Ok(busy)
    }
}

fn classify_status(status: StatusCode, body: &str) -> HireflowError {
    let detail = if body.is_empty() { status.to_string() } else { format!("{status}: {body}") };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!(%status, "calendar API rejected access token");
            HireflowError::Unauthorized(detail)
        }
        StatusCode::TOO_MANY_REQUESTS => HireflowError::CalendarUnavailable(detail),
        s if s.is_server_error() => HireflowError::CalendarUnavailable(detail),
        _ => HireflowError::InvalidInput(format!("calendar API error {detail}")),
    }
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<EventDto>,
}

#[derive(Debug, Deserialize)]
struct EventDto {
    id: Option<String>,
    status: Option<String>,
    transparency: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
struct EventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> CalendarClient {
        CalendarClient::new(&CalendarConfig {
            api_base_url: server.uri(),
            token_url: format!("{}/token", server.uri()),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            timeout_seconds: 5,
        })
        .expect("client built")
    }

    fn window() -> TimeWindow {
        let start = Utc::now();
        TimeWindow::new(start, start + Duration::days(7))
    }

    #[tokio::test]
    async fn parses_busy_events_and_skips_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(bearer_token("token-1"))
            .and(query_param("singleEvents", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "id": "evt-1",
                        "status": "confirmed",
                        "start": { "dateTime": "2025-06-02T10:00:00Z" },
                        "end": { "dateTime": "2025-06-02T11:00:00Z" }
                    },
                    {
                        "id": "evt-2",
                        "status": "cancelled",
                        "start": { "dateTime": "2025-06-02T12:00:00Z" },
                        "end": { "dateTime": "2025-06-02T13:00:00Z" }
                    },
                    {
                        "id": "evt-3",
                        "start": { "date": "2025-06-03" },
                        "end": { "date": "2025-06-04" }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let busy = client.busy_events("token-1", "primary", window()).await.expect("events");

        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].start.to_rfc3339(), "2025-06-02T10:00:00+00:00");
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.busy_events("stale", "primary", window()).await.expect_err("rejected");
        assert!(matches!(err, HireflowError::Unauthorized(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn server_error_maps_to_calendar_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.busy_events("token", "primary", window()).await.expect_err("outage");
        assert!(matches!(err, HireflowError::CalendarUnavailable(_)));
        assert!(err.is_retryable());
    }
}
