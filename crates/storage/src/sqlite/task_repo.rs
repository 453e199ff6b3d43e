use async_trait::async_trait;
use chrono::Utc;
use onboarding_core::model::{Stage, Task};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, decode_tasks, encode_tasks, ser};
use crate::repository::{StorageError, TaskRepository};

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn load_tasks(&self, stage: Stage) -> Result<Option<Vec<Task>>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT tasks
                FROM task_progress
                WHERE stage = ?1
            ",
        )
        .bind(stage.storage_key())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.try_get("tasks").map_err(ser)?;
        decode_tasks(&raw).map(Some)
    }

    async fn save_tasks(&self, stage: Stage, tasks: &[Task]) -> Result<(), StorageError> {
        let encoded = encode_tasks(tasks)?;
        sqlx::query(
            r"
                INSERT INTO task_progress (stage, tasks, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(stage) DO UPDATE SET
                    tasks = excluded.tasks,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(stage.storage_key())
        .bind(encoded)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn clear_tasks(&self, stage: Option<Stage>) -> Result<(), StorageError> {
        match stage {
            Some(stage) => {
                sqlx::query("DELETE FROM task_progress WHERE stage = ?1")
                    .bind(stage.storage_key())
                    .execute(&self.pool)
                    .await
                    .map_err(conn)?;
            }
            None => {
                sqlx::query("DELETE FROM task_progress")
                    .execute(&self.pool)
                    .await
                    .map_err(conn)?;
            }
        }
        Ok(())
    }
}
