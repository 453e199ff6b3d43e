use std::collections::HashMap;

use async_trait::async_trait;
use onboarding_core::model::{ChatMessage, ChatSession};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_message_row, position_to_i64, sender_to_str, ser};
use crate::repository::{ChatHistoryRepository, StorageError};

#[async_trait]
impl ChatHistoryRepository for SqliteRepository {
    async fn load_sessions(&self) -> Result<Vec<ChatSession>, StorageError> {
        let session_rows = sqlx::query(
            r"
                SELECT id, created_at, last_message_at
                FROM chat_sessions
                ORDER BY last_message_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let message_rows = sqlx::query(
            r"
                SELECT session_id, position, id, text, sender, timestamp
                FROM chat_messages
                ORDER BY session_id ASC, position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut messages: HashMap<String, Vec<ChatMessage>> = HashMap::new();
        for row in &message_rows {
            let session_id: String = row.try_get("session_id").map_err(ser)?;
            messages
                .entry(session_id)
                .or_default()
                .push(map_message_row(row)?);
        }

        let mut out = Vec::with_capacity(session_rows.len());
        for row in session_rows {
            let id: String = row.try_get("id").map_err(ser)?;
            out.push(ChatSession {
                messages: messages.remove(&id).unwrap_or_default(),
                created_at: row.try_get("created_at").map_err(ser)?,
                last_message_at: row.try_get("last_message_at").map_err(ser)?,
                id,
            });
        }
        Ok(out)
    }

    async fn save_sessions(&self, sessions: &[ChatSession]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM chat_messages")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        sqlx::query("DELETE FROM chat_sessions")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for session in sessions {
            sqlx::query(
                r"
                    INSERT INTO chat_sessions (id, created_at, last_message_at)
                    VALUES (?1, ?2, ?3)
                ",
            )
            .bind(&session.id)
            .bind(session.created_at)
            .bind(session.last_message_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
                other => conn(other),
            })?;

            for (position, message) in session.messages.iter().enumerate() {
                sqlx::query(
                    r"
                        INSERT INTO chat_messages (
                            session_id, position, id, text, sender, timestamp
                        )
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ",
                )
                .bind(&session.id)
                .bind(position_to_i64(position)?)
                .bind(&message.id)
                .bind(&message.text)
                .bind(sender_to_str(message.sender))
                .bind(message.timestamp)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn clear_sessions(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        sqlx::query("DELETE FROM chat_messages")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        sqlx::query("DELETE FROM chat_sessions")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
