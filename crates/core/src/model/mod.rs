mod chat;
mod ids;
mod stage;
mod task;

pub use chat::{ChatMessage, ChatSession, Sender};
pub use ids::{ParseIdError, TaskId};
pub use stage::Stage;
pub use task::Task;
