use onboarding_core::model::{ChatMessage, Sender, Task};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn sender_to_str(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "user",
        Sender::System => "system",
    }
}

pub(crate) fn parse_sender(s: &str) -> Result<Sender, StorageError> {
    match s {
        "user" => Ok(Sender::User),
        "system" => Ok(Sender::System),
        _ => Err(StorageError::Serialization(format!("invalid sender: {s}"))),
    }
}

pub(crate) fn encode_tasks(tasks: &[Task]) -> Result<String, StorageError> {
    serde_json::to_string(tasks).map_err(ser)
}

pub(crate) fn decode_tasks(raw: &str) -> Result<Vec<Task>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| StorageError::Serialization("position overflow".into()))
}

pub(crate) fn map_message_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChatMessage, StorageError> {
    let sender: String = row.try_get("sender").map_err(ser)?;
    Ok(ChatMessage {
        id: row.try_get("id").map_err(ser)?,
        text: row.try_get("text").map_err(ser)?,
        sender: parse_sender(&sender)?,
        timestamp: row.try_get("timestamp").map_err(ser)?,
    })
}
