use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
}

/// A single chat line. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        sender: Sender,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sender,
            timestamp,
        }
    }

    #[must_use]
    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// All messages exchanged on one calendar day.
///
/// `id` is the day key (`YYYY-MM-DD`); messages are kept oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

impl ChatSession {
    #[must_use]
    pub fn new(id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: at,
            last_message_at: at,
        }
    }

    pub fn user_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.is_from_user())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn session_wire_format_matches_stored_history() {
        let now = fixed_now();
        let mut session = ChatSession::new("2023-11-14", now);
        session
            .messages
            .push(ChatMessage::new("1", "Oi", Sender::User, now));

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["id"], "2023-11-14");
        assert_eq!(json["lastMessageAt"], "2023-11-14T22:13:20Z");
        assert_eq!(json["messages"][0]["sender"], "user");

        let raw = r#"{
            "id": "2024-05-10",
            "createdAt": "2024-05-10T09:00:00.000Z",
            "lastMessageAt": "2024-05-10T09:05:00.000Z",
            "messages": [
                {"id": "a", "text": "Onde fica o RH?", "sender": "user", "timestamp": "2024-05-10T09:00:00.000Z"},
                {"id": "b", "text": "No segundo andar.", "sender": "system", "timestamp": "2024-05-10T09:05:00.000Z"}
            ]
        }"#;
        let parsed: ChatSession = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.user_messages().count(), 1);
        assert_eq!(parsed.messages[1].sender, Sender::System);
    }
}
