use async_trait::async_trait;
use onboarding_core::model::{ChatSession, Stage, Task};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Checklist state, one whole list per stage.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetch the saved task list of a stage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored list cannot be decoded.
    async fn load_tasks(&self, stage: Stage) -> Result<Option<Vec<Task>>, StorageError>;

    /// Replace the saved task list of a stage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be stored.
    async fn save_tasks(&self, stage: Stage, tasks: &[Task]) -> Result<(), StorageError>;

    /// Forget one stage, or every stage when `stage` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn clear_tasks(&self, stage: Option<Stage>) -> Result<(), StorageError>;
}

/// Day-bucketed chat history.
#[async_trait]
pub trait ChatHistoryRepository: Send + Sync {
    /// Load every stored session. Order is unspecified; callers sort as needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or stored data is malformed.
    async fn load_sessions(&self) -> Result<Vec<ChatSession>, StorageError>;

    /// Replace the stored history with `sessions`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be stored.
    async fn save_sessions(&self, sessions: &[ChatSession]) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn clear_sessions(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tasks: Arc<Mutex<HashMap<Stage, Vec<Task>>>>,
    sessions: Arc<Mutex<Vec<ChatSession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn load_tasks(&self, stage: Stage) -> Result<Option<Vec<Task>>, StorageError> {
        let guard = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&stage).cloned())
    }

    async fn save_tasks(&self, stage: Stage, tasks: &[Task]) -> Result<(), StorageError> {
        let mut guard = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(stage, tasks.to_vec());
        Ok(())
    }

    async fn clear_tasks(&self, stage: Option<Stage>) -> Result<(), StorageError> {
        let mut guard = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match stage {
            Some(stage) => {
                guard.remove(&stage);
            }
            None => guard.clear(),
        }
        Ok(())
    }
}

#[async_trait]
impl ChatHistoryRepository for InMemoryRepository {
    async fn load_sessions(&self) -> Result<Vec<ChatSession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_sessions(&self, sessions: &[ChatSession]) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = sessions.to_vec();
        Ok(())
    }

    async fn clear_sessions(&self) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub tasks: Arc<dyn TaskRepository>,
    pub chat_history: Arc<dyn ChatHistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let tasks: Arc<dyn TaskRepository> = Arc::new(repo.clone());
        let chat_history: Arc<dyn ChatHistoryRepository> = Arc::new(repo);
        Self {
            tasks,
            chat_history,
        }
    }
}
