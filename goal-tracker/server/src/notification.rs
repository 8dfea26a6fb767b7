//! Outbound notifications about task activity.
//!
//! Delivery is best effort: [`NotificationDispatcher`] sends every notification
//! from a background task under a bounded timeout and only logs failures.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing_futures::Instrument;

use crate::config::Config;

/// A message addressed to a notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub channel: String,
    pub text: String,
}

/// Error type for notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// No credential was configured for the notification channel.
    #[error("Notification credential is not configured")]
    MissingCredential,
    /// The request could not be sent or its reply could not be read.
    #[error("Notification request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("Notification rejected with status {0}")]
    Rejected(reqwest::StatusCode),
    /// The endpoint accepted the request but reported a failure.
    #[error("Notification rejected by provider: {0}")]
    Provider(String),
}

/// One-way delivery of notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Reply body of Slack's `chat.postMessage`.
#[derive(Debug, Deserialize)]
struct SlackReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts notifications as Slack messages.
pub struct SlackNotifier {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl SlackNotifier {
    /// Creates a notifier posting to `endpoint` with `token` as bearer credential.
    /// An absent or empty token makes every send fail with
    /// [`NotificationError::MissingCredential`].
    pub fn new(
        endpoint: String,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            token: token.filter(|token| !token.is_empty()),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    #[tracing::instrument(skip(self))]
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let token = self
            .token
            .as_deref()
            .ok_or(NotificationError::MissingCredential)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(notification)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotificationError::Rejected(response.status()));
        }

        let reply: SlackReply = response.json().await?;
        if !reply.ok {
            return Err(NotificationError::Provider(
                reply.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(())
    }
}

/// Sends notifications without making callers wait for them.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    channel: String,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, channel: String, timeout: Duration) -> Self {
        Self {
            notifier,
            channel,
            timeout,
        }
    }

    /// Builds the Slack-backed dispatcher described by the application config.
    pub fn from_config(config: &Config) -> Result<Self, NotificationError> {
        let timeout = config.notification_timeout();
        let notifier = SlackNotifier::new(
            config.slack_endpoint.clone(),
            config.slack_api.clone(),
            timeout,
        )?;
        if !notifier.has_credential() {
            tracing::warn!("SLACK_API is not set, task completion notifications will not be delivered");
        }
        Ok(Self::new(
            Arc::new(notifier),
            config.slack_channel.clone(),
            timeout,
        ))
    }

    /// Announces that a task was completed.
    pub fn task_completed(&self, title: &str) -> JoinHandle<()> {
        self.dispatch(format!("Someone just completed the task {}", title))
    }

    /// Sends `text` to the configured channel in the background.
    ///
    /// The returned handle resolves once delivery succeeded, failed or timed out.
    pub fn dispatch(&self, text: String) -> JoinHandle<()> {
        let notification = Notification {
            channel: self.channel.clone(),
            text,
        };
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.timeout;
        let span = tracing::info_span!("notification", channel = %notification.channel);

        tokio::spawn(
            async move {
                match tokio::time::timeout(timeout, notifier.send(&notification)).await {
                    Ok(Ok(())) => tracing::info!("Notification delivered"),
                    Ok(Err(err)) => tracing::warn!("Failed to deliver notification: {}", err),
                    Err(_) => tracing::warn!("Notification timed out after {:?}", timeout),
                }
            }
            .instrument(span),
        )
    }
}
