//! OAuth refresh-grant client for the calendar provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use hireflow_core::{RefreshFailure, RefreshedToken, TokenRefresher};
use hireflow_domain::{CalendarConfig, HireflowError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// [`TokenRefresher`] implementation speaking the standard OAuth
/// `refresh_token` grant against the provider's token endpoint.
pub struct OAuthTokenRefresher {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl OAuthTokenRefresher {
    pub fn new(config: &CalendarConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| HireflowError::Config(format!("HTTP client build failed: {err}")))?;
        Ok(Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }
}

#[async_trait]
impl TokenRefresher for OAuthTokenRefresher {
    #[instrument(skip(self, refresh_token))]
    async fn refresh(
        &self,
        principal: &str,
        refresh_token: &str,
    ) -> std::result::Result<RefreshedToken, RefreshFailure> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|err| RefreshFailure::Transient(format!("token request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Only an explicit invalid_grant means the authorization is
            // revoked; everything else is treated as a provider hiccup.
            if body.contains("invalid_grant") {
                warn!(principal, "refresh token rejected by provider");
                return Err(RefreshFailure::InvalidGrant(format!(
                    "provider rejected refresh token ({status})"
                )));
            }
            return Err(RefreshFailure::Transient(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let payload: TokenResponse = response.json().await.map_err(|err| {
            RefreshFailure::Transient(format!("malformed token response: {err}"))
        })?;

        debug!(principal, rotated = payload.refresh_token.is_some(), "access token refreshed");
        Ok(RefreshedToken {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            expires_at: Utc::now() + ChronoDuration::seconds(payload.expires_in),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Present only when the provider rotates the refresh token.
    refresh_token: Option<String>,
    expires_in: i64,
}
