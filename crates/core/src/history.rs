//! Rules for the day-bucketed chat history.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::model::{ChatMessage, ChatSession};
use crate::time::local_date;

/// Number of sessions kept on every save.
pub const DEFAULT_SESSION_CAP: usize = 30;

/// Session id for a calendar day (`YYYY-MM-DD`).
#[must_use]
pub fn session_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Append `messages` to the session of `now`'s calendar day, creating it if needed.
///
/// Returns the index of the session that received the messages.
pub fn append_messages(
    sessions: &mut Vec<ChatSession>,
    messages: impl IntoIterator<Item = ChatMessage>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> usize {
    let key = session_key(local_date(now, offset));
    let index = match sessions.iter().position(|s| s.id == key) {
        Some(index) => index,
        None => {
            sessions.push(ChatSession::new(key, now));
            sessions.len() - 1
        }
    };
    let session = &mut sessions[index];
    session.messages.extend(messages);
    session.last_message_at = now;
    index
}

/// Sort by `last_message_at`, newest first.
pub fn sort_by_recency(sessions: &mut [ChatSession]) {
    sessions.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
}

/// Keep only the `cap` most recently active sessions, newest first.
pub fn retain_most_recent(sessions: &mut Vec<ChatSession>, cap: usize) {
    sort_by_recency(sessions);
    sessions.truncate(cap);
}

#[must_use]
pub fn find_session<'a>(sessions: &'a [ChatSession], id: &str) -> Option<&'a ChatSession> {
    sessions.iter().find(|s| s.id == id)
}
