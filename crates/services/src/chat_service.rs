use std::sync::Arc;

use chrono::{Duration, FixedOffset};
use uuid::Uuid;

use onboarding_core::KeywordResponder;
use onboarding_core::history::{
    DEFAULT_SESSION_CAP, append_messages, find_session, retain_most_recent, session_key,
    sort_by_recency,
};
use onboarding_core::model::{ChatMessage, ChatSession, Sender};
use onboarding_core::time::utc_offset;
use storage::repository::ChatHistoryRepository;

use crate::Clock;
use crate::error::ChatError;
use crate::notify::{ChatNotification, UserProfile, WebhookNotifier};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatConfig {
    /// Calendar used to pick the day's session.
    pub utc_offset: FixedOffset,
    pub session_cap: usize,
    /// Added to the question's timestamp to stamp the reply.
    pub reply_delay: Duration,
    pub greeting: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            utc_offset: utc_offset(),
            session_cap: DEFAULT_SESSION_CAP,
            reply_delay: Duration::milliseconds(500),
            greeting: "Olá! Como posso ajudá-lo hoje?".to_string(),
        }
    }
}

/// Outcome of one question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub question: ChatMessage,
    pub answer: ChatMessage,
    /// Knowledge category that answered, if any.
    pub category: Option<String>,
    pub session_id: String,
    pub notified: bool,
}

impl ChatReply {
    #[must_use]
    pub fn auto_answered(&self) -> bool {
        self.category.is_some()
    }
}

/// Answers questions and keeps the day-bucketed chat history.
#[derive(Clone)]
pub struct ChatService {
    clock: Clock,
    config: ChatConfig,
    responder: Arc<KeywordResponder>,
    history: Arc<dyn ChatHistoryRepository>,
    notifier: Arc<WebhookNotifier>,
    user: UserProfile,
}

impl ChatService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: ChatConfig,
        responder: Arc<KeywordResponder>,
        history: Arc<dyn ChatHistoryRepository>,
        notifier: Arc<WebhookNotifier>,
        user: UserProfile,
    ) -> Self {
        Self {
            clock,
            config,
            responder,
            history,
            notifier,
            user,
        }
    }

    #[must_use]
    pub fn responder(&self) -> &KeywordResponder {
        &self.responder
    }

    /// Answer `text`, record both messages in today's session and notify the chat webhook.
    ///
    /// The notification is awaited after the history is saved, so a slow
    /// webhook delays the returned reply by at most `WebhookConfig::timeout`.
    /// Its outcome only sets `ChatReply::notified`.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::EmptyMessage` for blank input.
    /// Returns `ChatError::Storage` if the history cannot be saved.
    pub async fn ask(&self, text: &str) -> Result<ChatReply, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let classification = self.responder.classify(text);
        let category = classification.map(|c| c.category.to_string());
        let response = classification.map_or(self.responder.default_response(), |c| c.response);
        tracing::debug!(category = category.as_deref(), "classified question");

        let asked_at = self.clock.now();
        let answered_at = asked_at + self.config.reply_delay;
        let question = ChatMessage::new(Uuid::new_v4().to_string(), text, Sender::User, asked_at);
        let answer = ChatMessage::new(
            Uuid::new_v4().to_string(),
            response,
            Sender::System,
            answered_at,
        );

        let mut sessions = self.load().await;
        let index = append_messages(
            &mut sessions,
            [question.clone(), answer.clone()],
            answered_at,
            self.config.utc_offset,
        );
        let session_id = sessions[index].id.clone();
        retain_most_recent(&mut sessions, self.config.session_cap);
        self.history.save_sessions(&sessions).await?;
        tracing::info!(session = %session_id, sessions = sessions.len(), "saved chat history");

        let notification =
            ChatNotification::new(&self.user, text, category.is_some(), asked_at);
        let notified = self.notifier.send_chat(&notification).await;

        Ok(ChatReply {
            question,
            answer,
            category,
            session_id,
            notified,
        })
    }

    /// Today's session, if anything was asked today.
    pub async fn current_session(&self) -> Option<ChatSession> {
        let key = session_key(self.clock.today(self.config.utc_offset));
        let sessions = self.load().await;
        find_session(&sessions, &key).cloned()
    }

    /// Stored sessions, most recently active first.
    pub async fn sessions(&self) -> Vec<ChatSession> {
        let mut sessions = self.load().await;
        sort_by_recency(&mut sessions);
        sessions
    }

    pub async fn session_messages(&self, id: &str) -> Vec<ChatMessage> {
        let sessions = self.load().await;
        find_session(&sessions, id)
            .map(|session| session.messages.clone())
            .unwrap_or_default()
    }

    /// Messages to open the chat with: today's history, or the greeting.
    pub async fn conversation(&self) -> Vec<ChatMessage> {
        match self.current_session().await {
            Some(session) if !session.is_empty() => session.messages,
            _ => vec![self.greeting()],
        }
    }

    /// # Errors
    ///
    /// Returns `ChatError::Storage` if the backend fails.
    pub async fn clear_history(&self) -> Result<(), ChatError> {
        self.history.clear_sessions().await?;
        tracing::info!("cleared chat history");
        Ok(())
    }

    #[must_use]
    pub fn greeting(&self) -> ChatMessage {
        ChatMessage::new(
            "greeting",
            self.config.greeting.clone(),
            Sender::System,
            self.clock.now(),
        )
    }

    async fn load(&self) -> Vec<ChatSession> {
        match self.history.load_sessions().await {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!(error = %err, "could not read chat history");
                Vec::new()
            }
        }
    }
}
