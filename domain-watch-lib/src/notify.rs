//! Outbound chat notifications.
//!
//! Notifications are fire-and-forget: a failed send is reported to the
//! caller as a `NotificationError`, which the reporter logs and drops.
//! Nothing here retries.

use crate::error::DomainWatchError;
use async_trait::async_trait;
use serde::Serialize;
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable holding the destination chat id.
pub const TELEGRAM_CHAT_ENV: &str = "TELEGRAM_CHAT_ID";

/// Default Telegram Bot API endpoint.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// A sink for human-readable alert messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Deliver one message.
    async fn send(&self, text: &str) -> Result<(), DomainWatchError>;
}

/// Credentials and endpoint for the Telegram sink.
///
/// Read once at startup and handed to [`TelegramNotifier::new`]. Missing
/// credentials are allowed; sends then fail with a notification error.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TelegramConfig {
    /// Read credentials from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    pub fn from_env() -> Self {
        let read = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            bot_token: read(TELEGRAM_TOKEN_ENV),
            chat_id: read(TELEGRAM_CHAT_ENV),
            ..Self::default()
        }
    }

    /// Override the API endpoint (self-hosted Bot API servers, tests).
    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Both token and chat id are present.
    pub fn is_complete(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends messages through the Telegram Bot API `sendMessage` method.
#[derive(Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    http_client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a notifier from explicit configuration.
    pub fn new(config: TelegramConfig) -> Result<Self, DomainWatchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                DomainWatchError::notification(
                    "telegram",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), DomainWatchError> {
        let token = self.config.bot_token.as_deref().ok_or_else(|| {
            DomainWatchError::notification("telegram", format!("{} is not set", TELEGRAM_TOKEN_ENV))
        })?;
        let chat_id = self.config.chat_id.as_deref().ok_or_else(|| {
            DomainWatchError::notification("telegram", format!("{} is not set", TELEGRAM_CHAT_ENV))
        })?;

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            token
        );
        let response = self
            .http_client
            .post(&url)
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the URL, which contains the token
                DomainWatchError::notification("telegram", e.without_url().to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainWatchError::notification(
                "telegram",
                format!("HTTP {}: {}", status.as_u16(), body.chars().take(200).collect::<String>()),
            ));
        }

        debug!(chat_id, "telegram message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(server: &MockServer) -> TelegramConfig {
        TelegramConfig {
            bot_token: Some("123:abc".to_string()),
            chat_id: Some("42".to_string()),
            api_base: server.base_url(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_message() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/bot123:abc/sendMessage")
                    .json_body(json!({"chat_id": "42", "text": "exarnple.com is now registered"}));
                then.status(200).json_body(json!({"ok": true}));
            })
            .await;

        let notifier = TelegramNotifier::new(config(&server)).unwrap();
        notifier
            .send("exarnple.com is now registered")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_reports_http_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(401).body("Unauthorized");
            })
            .await;

        let notifier = TelegramNotifier::new(config(&server)).unwrap();
        let err = notifier.send("hello").await.unwrap_err();
        assert!(err.is_notification());
        assert!(err.to_string().contains("HTTP 401"));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_without_request() {
        let notifier = TelegramNotifier::new(TelegramConfig::default()).unwrap();
        let err = notifier.send("hello").await.unwrap_err();
        assert!(err.is_notification());
        assert!(err.to_string().contains(TELEGRAM_TOKEN_ENV));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TelegramConfig {
            bot_token: Some("secret-token".to_string()),
            chat_id: Some("42".to_string()),
            ..TelegramConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-token"));
        assert!(config.is_complete());
    }
}
