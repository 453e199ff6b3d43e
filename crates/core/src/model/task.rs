use serde::{Deserialize, Serialize};

use crate::model::TaskId;

/// One checklist item of an onboarding stage.
///
/// Stored lists are written with `description`/`completed`; lists saved by the
/// earlier web part used `descricao`/`concluida`, which are still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(alias = "descricao")]
    pub description: String,
    #[serde(alias = "concluida", default)]
    pub completed: bool,
}

impl Task {
    /// A task that has not been completed yet.
    #[must_use]
    pub fn pending(id: u32, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(id),
            description: description.into(),
            completed: false,
        }
    }

    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}
