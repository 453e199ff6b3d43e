#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ChatHistoryRepository, InMemoryRepository, Storage, StorageError, TaskRepository,
};
