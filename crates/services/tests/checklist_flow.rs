mod support;

use std::sync::Arc;

use async_trait::async_trait;
use onboarding_core::ProgressAggregator;
use onboarding_core::model::{Stage, Task, TaskId};
use onboarding_core::time::fixed_clock;
use services::{AppServices, ChecklistError, ChecklistService, UserProfile, WebhookConfig, WebhookNotifier};
use storage::repository::{Storage, StorageError, TaskRepository};

struct BrokenTasks;

#[async_trait]
impl TaskRepository for BrokenTasks {
    async fn load_tasks(&self, _stage: Stage) -> Result<Option<Vec<Task>>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn save_tasks(&self, _stage: Stage, _tasks: &[Task]) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn clear_tasks(&self, _stage: Option<Stage>) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[tokio::test]
async fn checklist_progress_across_stages() {
    let services = AppServices::in_memory(fixed_clock());
    let checklist = services.checklist();

    for id in 1..=3 {
        checklist
            .toggle_task(Stage::FirstDay, TaskId::new(id))
            .await
            .unwrap();
    }
    checklist
        .toggle_task(Stage::FirstMonth, TaskId::new(9))
        .await
        .unwrap();

    let overall = checklist.overall_progress().await;
    assert_eq!(overall.first_day.percentage, 60);
    assert_eq!(overall.first_week.total, 7);
    assert_eq!(overall.first_month.completed, 1);
    assert_eq!((overall.completed, overall.total), (4, 21));
    assert_eq!(overall.percentage, 19);

    checklist.reset(Some(Stage::FirstDay)).await.unwrap();
    let overall = checklist.overall_progress().await;
    assert_eq!(overall.first_day.completed, 0);
    assert_eq!(overall.completed, 1);
}

#[tokio::test]
async fn stale_saved_list_keeps_its_own_denominator() {
    let storage = Storage::in_memory();
    storage
        .tasks
        .save_tasks(
            Stage::FirstWeek,
            &[
                Task::pending(1, "antiga").with_completed(true),
                Task::pending(2, "antiga"),
            ],
        )
        .await
        .unwrap();
    let services = AppServices::from_storage(
        &storage,
        fixed_clock(),
        WebhookConfig::default(),
        UserProfile::default(),
    );
    let checklist = services.checklist();

    let progress = checklist.stage_progress(Stage::FirstWeek).await;
    assert_eq!((progress.completed, progress.total, progress.percentage), (1, 2, 50));

    let merged = checklist.load_stage(Stage::FirstWeek).await;
    assert_eq!(merged.len(), 7);
    assert_eq!(merged[0].description, "antiga");
    assert!(merged[0].completed);
    assert!(!merged[6].completed);
}

#[tokio::test]
async fn unreadable_storage_degrades_but_writes_fail() {
    let checklist = ChecklistService::new(
        fixed_clock(),
        ProgressAggregator::default(),
        Arc::new(BrokenTasks),
        Arc::new(WebhookNotifier::disabled()),
        UserProfile::default(),
    );

    let tasks = checklist.load_stage(Stage::FirstDay).await;
    assert_eq!(tasks.len(), 5);
    assert_eq!(checklist.overall_progress().await.total, 21);

    let err = checklist
        .toggle_task(Stage::FirstDay, TaskId::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ChecklistError::Storage(StorageError::Connection(_))));
    assert!(checklist.reset(None).await.is_err());
}

#[tokio::test]
async fn toggling_posts_progress_webhook() {
    let (url, received) = support::capture_one("200 OK").await;
    let webhooks = WebhookConfig {
        progress_url: Some(url),
        ..WebhookConfig::default()
    };
    let user = UserProfile {
        display_name: "Ana".into(),
        ..UserProfile::default()
    };
    let services = AppServices::from_storage(&Storage::in_memory(), fixed_clock(), webhooks, user);

    services
        .checklist()
        .toggle_task(Stage::FirstDay, TaskId::new(4))
        .await
        .unwrap();

    let body = received.await.unwrap();
    assert_eq!(body["usuario"], "Ana");
    assert_eq!(body["etapa"], "primeiroDia");
    assert_eq!(body["tarefasConcluidas"], 1);
    assert_eq!(body["totalTarefas"], 5);
    assert_eq!(body["porcentagem"], 20);
    assert_eq!(body["dataHora"], "2023-11-14T22:13:20.000Z");
}
