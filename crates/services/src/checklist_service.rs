use std::sync::Arc;

use onboarding_core::model::{Stage, Task, TaskId};
use onboarding_core::progress::{OverallProgress, StageProgress, toggle};
use onboarding_core::ProgressAggregator;
use storage::repository::TaskRepository;

use crate::Clock;
use crate::error::ChecklistError;
use crate::notify::{ProgressNotification, UserProfile, WebhookNotifier};

/// Loads, toggles and reports the onboarding checklists.
#[derive(Clone)]
pub struct ChecklistService {
    clock: Clock,
    aggregator: ProgressAggregator,
    tasks: Arc<dyn TaskRepository>,
    notifier: Arc<WebhookNotifier>,
    user: UserProfile,
}

impl ChecklistService {
    #[must_use]
    pub fn new(
        clock: Clock,
        aggregator: ProgressAggregator,
        tasks: Arc<dyn TaskRepository>,
        notifier: Arc<WebhookNotifier>,
        user: UserProfile,
    ) -> Self {
        Self {
            clock,
            aggregator,
            tasks,
            notifier,
            user,
        }
    }

    #[must_use]
    pub fn aggregator(&self) -> &ProgressAggregator {
        &self.aggregator
    }

    /// The stage checklist: the template with saved completion applied.
    pub async fn load_stage(&self, stage: Stage) -> Vec<Task> {
        let saved = self.saved(stage).await;
        self.aggregator.merge(stage, saved.as_deref())
    }

    /// Flip one task, persist the stage and report the new progress.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::UnknownTask` if the stage has no such task.
    /// Returns `ChecklistError::Storage` if the list cannot be saved.
    pub async fn toggle_task(&self, stage: Stage, id: TaskId) -> Result<Vec<Task>, ChecklistError> {
        let mut tasks = self.load_stage(stage).await;
        if !toggle(&mut tasks, id) {
            return Err(ChecklistError::UnknownTask { stage, id });
        }
        self.save_stage(stage, &tasks).await?;

        let notification =
            ProgressNotification::from_tasks(&self.user, stage, &tasks, self.clock.now());
        self.notifier.send_progress(&notification).await;
        Ok(tasks)
    }

    /// Overwrite the saved list of a stage.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::Storage` if the list cannot be saved.
    pub async fn save_stage(&self, stage: Stage, tasks: &[Task]) -> Result<(), ChecklistError> {
        self.tasks.save_tasks(stage, tasks).await?;
        tracing::info!(
            stage = stage.storage_key(),
            completed = tasks.iter().filter(|t| t.completed).count(),
            total = tasks.len(),
            "saved checklist"
        );
        Ok(())
    }

    /// Progress over the saved list, or the configured total when nothing is saved.
    pub async fn stage_progress(&self, stage: Stage) -> StageProgress {
        let saved = self.saved(stage).await;
        self.aggregator.stage_progress(stage, saved.as_deref())
    }

    pub async fn overall_progress(&self) -> OverallProgress {
        let first_day = self.saved(Stage::FirstDay).await;
        let first_week = self.saved(Stage::FirstWeek).await;
        let first_month = self.saved(Stage::FirstMonth).await;
        self.aggregator.overall(
            first_day.as_deref(),
            first_week.as_deref(),
            first_month.as_deref(),
        )
    }

    /// Forget saved progress of one stage, or of every stage.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::Storage` if the backend fails.
    pub async fn reset(&self, stage: Option<Stage>) -> Result<(), ChecklistError> {
        self.tasks.clear_tasks(stage).await?;
        tracing::info!(stage = stage.map(Stage::storage_key), "reset checklist");
        Ok(())
    }

    async fn saved(&self, stage: Stage) -> Option<Vec<Task>> {
        match self.tasks.load_tasks(stage).await {
            Ok(saved) => saved,
            Err(err) => {
                tracing::warn!(stage = stage.storage_key(), error = %err, "could not read checklist");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use onboarding_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> ChecklistService {
        ChecklistService::new(
            fixed_clock(),
            ProgressAggregator::default(),
            Arc::new(repo.clone()),
            Arc::new(WebhookNotifier::disabled()),
            UserProfile::default(),
        )
    }

    #[tokio::test]
    async fn fresh_stage_is_the_template() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);

        let tasks = service.load_stage(Stage::FirstDay).await;
        assert_eq!(tasks, service.aggregator().template(Stage::FirstDay));
        assert!(tasks.iter().all(|t| !t.completed));

        let progress = service.stage_progress(Stage::FirstDay).await;
        assert_eq!((progress.completed, progress.total, progress.percentage), (0, 5, 0));
    }

    #[tokio::test]
    async fn toggling_persists_and_updates_progress() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);

        let tasks = service
            .toggle_task(Stage::FirstDay, TaskId::new(2))
            .await
            .unwrap();
        assert!(tasks.iter().any(|t| t.id == TaskId::new(2) && t.completed));

        let saved = repo.load_tasks(Stage::FirstDay).await.unwrap().unwrap();
        assert_eq!(saved, tasks);

        let progress = service.stage_progress(Stage::FirstDay).await;
        assert_eq!((progress.completed, progress.total, progress.percentage), (1, 5, 20));

        service
            .toggle_task(Stage::FirstDay, TaskId::new(2))
            .await
            .unwrap();
        assert_eq!(service.stage_progress(Stage::FirstDay).await.completed, 0);
    }

    #[tokio::test]
    async fn unknown_task_is_rejected_without_saving() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);

        let err = service
            .toggle_task(Stage::FirstWeek, TaskId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, ChecklistError::UnknownTask { .. }));
        assert!(repo.load_tasks(Stage::FirstWeek).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reset_restores_templates() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);
        service
            .toggle_task(Stage::FirstMonth, TaskId::new(1))
            .await
            .unwrap();

        service.reset(None).await.unwrap();
        let overall = service.overall_progress().await;
        assert_eq!(overall.completed, 0);
        assert_eq!(overall.total, 21);
    }
}
