//! Outbound webhook notifications for chat questions and checklist progress.
//!
//! Delivery is best effort: every failure is logged and reported as `false`.

use std::env;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Serialize, Serializer};
use url::Url;

use onboarding_core::model::{Stage, Task};
use onboarding_core::progress::percentage;

use crate::error::WebhookConfigError;

pub const CHAT_WEBHOOK_VAR: &str = "ONBOARDING_CHAT_WEBHOOK_URL";
pub const PROGRESS_WEBHOOK_VAR: &str = "ONBOARDING_PROGRESS_WEBHOOK_URL";

/// Upper bound a notification can add to the operation that sent it.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    pub chat_url: Option<Url>,
    pub progress_url: Option<Url>,
    pub timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            chat_url: None,
            progress_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl WebhookConfig {
    /// Read webhook URLs from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `WebhookConfigError` when a non-blank value is not an http(s) URL.
    pub fn from_env() -> Result<Self, WebhookConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `WebhookConfigError` when a non-blank value is not an http(s) URL.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, WebhookConfigError> {
        Ok(Self {
            chat_url: parse_webhook_url(CHAT_WEBHOOK_VAR, lookup(CHAT_WEBHOOK_VAR))?,
            progress_url: parse_webhook_url(PROGRESS_WEBHOOK_VAR, lookup(PROGRESS_WEBHOOK_VAR))?,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

fn parse_webhook_url(
    var: &'static str,
    raw: Option<String>,
) -> Result<Option<Url>, WebhookConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let url = Url::parse(trimmed).map_err(|source| WebhookConfigError::InvalidUrl { var, source })?;
    match url.scheme() {
        "http" | "https" => Ok(Some(url)),
        other => Err(WebhookConfigError::UnsupportedScheme {
            var,
            scheme: other.to_string(),
        }),
    }
}

/// Who is using the companion, as reported in notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub display_name: String,
    pub user_id: String,
    pub email: String,
    /// Page the user asks from; the query string is dropped when sent.
    pub page_url: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            display_name: "Anonymous".to_string(),
            user_id: String::new(),
            email: String::new(),
            page_url: String::new(),
        }
    }
}

impl UserProfile {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            display_name: read("ONBOARDING_USER").unwrap_or(defaults.display_name),
            user_id: read("ONBOARDING_USER_ID").unwrap_or_default(),
            email: read("ONBOARDING_USER_EMAIL").unwrap_or_default(),
            page_url: read("ONBOARDING_PAGE_URL").unwrap_or_default(),
        }
    }
}

fn iso_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// A question asked in the chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatNotification {
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "usuario")]
    pub user: String,
    #[serde(rename = "dataHora", serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "respostaAutomatica")]
    pub auto_answered: bool,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "sharePointUrl")]
    pub page_url: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userEmail")]
    pub user_email: String,
}

impl ChatNotification {
    pub const AUTO_ANSWERED: &'static str = "Resposta Automática";
    pub const NEW_QUESTION: &'static str = "Dúvida Nova";

    #[must_use]
    pub fn new(
        user: &UserProfile,
        message: impl Into<String>,
        auto_answered: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let category = if auto_answered {
            Self::AUTO_ANSWERED
        } else {
            Self::NEW_QUESTION
        };
        let page_url = user
            .page_url
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            message: message.into(),
            user: user.display_name.clone(),
            timestamp,
            auto_answered,
            category: category.to_string(),
            page_url,
            user_id: user.user_id.clone(),
            user_email: user.email.clone(),
        }
    }
}

/// Checklist progress after a change to one stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressNotification {
    #[serde(rename = "usuario")]
    pub user: String,
    #[serde(rename = "etapa")]
    pub stage: Stage,
    #[serde(rename = "tarefasConcluidas")]
    pub completed: u32,
    #[serde(rename = "totalTarefas")]
    pub total: u32,
    #[serde(rename = "porcentagem")]
    pub percentage: u8,
    #[serde(rename = "dataHora", serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

impl ProgressNotification {
    /// Counts are taken from `tasks`, the list being reported.
    #[must_use]
    pub fn from_tasks(
        user: &UserProfile,
        stage: Stage,
        tasks: &[Task],
        timestamp: DateTime<Utc>,
    ) -> Self {
        let total = u32::try_from(tasks.len()).unwrap_or(u32::MAX);
        let completed = u32::try_from(tasks.iter().filter(|t| t.completed).count()).unwrap_or(total);
        Self {
            user: user.display_name.clone(),
            stage,
            completed,
            total,
            percentage: percentage(u64::from(completed), u64::from(total)),
            timestamp,
        }
    }
}

/// Posts notifications as JSON to the configured webhooks.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    config: WebhookConfig,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(WebhookConfig::default())
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.chat_url.is_some() || self.config.progress_url.is_some()
    }

    #[must_use]
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Returns `true` only when the webhook accepted the notification.
    pub async fn send_chat(&self, notification: &ChatNotification) -> bool {
        self.post("chat", self.config.chat_url.as_ref(), notification)
            .await
    }

    /// Returns `true` only when the webhook accepted the notification.
    pub async fn send_progress(&self, notification: &ProgressNotification) -> bool {
        self.post("progress", self.config.progress_url.as_ref(), notification)
            .await
    }

    async fn post<T: Serialize + Sync>(&self, kind: &str, url: Option<&Url>, payload: &T) -> bool {
        let Some(url) = url else {
            tracing::debug!(kind, "webhook not configured");
            return false;
        };

        let response = self
            .client
            .post(url.clone())
            .timeout(self.config.timeout)
            .json(payload)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                tracing::info!(kind, status = %response.status(), "webhook notified");
                true
            }
            Ok(response) => {
                tracing::warn!(kind, status = %response.status(), "webhook rejected notification");
                false
            }
            Err(err) => {
                tracing::warn!(kind, error = %err, "webhook request failed");
                false
            }
        }
    }
}
