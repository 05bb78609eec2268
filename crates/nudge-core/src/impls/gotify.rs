//! Gotify notifier: one POST to `{url}/message` per digest.
//!
//! No retries. A request error, a timeout or a non-2xx status all surface as
//! [`NudgeError::Transport`] and the caller decides what to tell the user.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;

use crate::config::{ENV_GOTIFY_APP_TOKEN, ENV_GOTIFY_URL, GotifySettings};
use crate::domain::{Digest, NudgeError};
use crate::ports::Notifier;

/// Header carrying the application token.
const TOKEN_HEADER: &str = "X-Gotify-Key";

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    title: &'a str,
    message: &'a str,
    priority: i64,
    extras: Extras<'a>,
}

#[derive(Debug, Serialize)]
struct Extras<'a> {
    #[serde(rename = "client::display")]
    client_display: ClientDisplay<'a>,
}

#[derive(Debug, Serialize)]
struct ClientDisplay<'a> {
    #[serde(rename = "contentType")]
    content_type: &'a str,
}

impl<'a> From<&'a Digest> for MessagePayload<'a> {
    fn from(digest: &'a Digest) -> Self {
        Self {
            title: &digest.title,
            message: &digest.body,
            priority: digest.priority,
            extras: Extras {
                client_display: ClientDisplay {
                    content_type: &digest.content_type,
                },
            },
        }
    }
}

pub struct GotifyNotifier {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl GotifyNotifier {
    /// Build a notifier, failing fast when the URL or token is missing.
    pub fn from_settings(settings: &GotifySettings) -> Result<Self, NudgeError> {
        let url = settings
            .url
            .as_deref()
            .ok_or(NudgeError::MissingTransportCredentials(ENV_GOTIFY_URL))?;
        let token = settings
            .token
            .clone()
            .ok_or(NudgeError::MissingTransportCredentials(ENV_GOTIFY_APP_TOKEN))?;

        let endpoint = format!("{}/message", url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| NudgeError::Config(format!("invalid {ENV_GOTIFY_URL} '{url}': {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| NudgeError::transport_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for GotifyNotifier {
    async fn send(&self, digest: &Digest) -> Result<(), NudgeError> {
        let payload = MessagePayload::from(digest);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(TOKEN_HEADER, &self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "gotify request timed out"
                } else {
                    "gotify request failed"
                };
                NudgeError::transport_with_source(message, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NudgeError::transport(format!(
                "gotify returned HTTP {}",
                status.as_u16()
            )));
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            priority = digest.priority,
            "digest delivered"
        );
        Ok(())
    }
}
