use std::sync::Arc;

use onboarding_core::{AnalyticsConfig, ChatAnalytics, KeywordResponder, ProgressAggregator};
use storage::repository::Storage;

use crate::Clock;
use crate::chat_service::{ChatConfig, ChatService};
use crate::checklist_service::ChecklistService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::notify::{UserProfile, WebhookConfig, WebhookNotifier};

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    checklist: Arc<ChecklistService>,
    chat: Arc<ChatService>,
    dashboard: Arc<DashboardService>,
    notifier: Arc<WebhookNotifier>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or a webhook URL is invalid.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let webhooks = WebhookConfig::from_env()?;
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(
            &storage,
            clock,
            webhooks,
            UserProfile::from_env(),
        ))
    }

    /// In-memory storage and no webhooks.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(
            &Storage::in_memory(),
            clock,
            WebhookConfig::default(),
            UserProfile::default(),
        )
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        webhooks: WebhookConfig,
        user: UserProfile,
    ) -> Self {
        let notifier = Arc::new(WebhookNotifier::new(webhooks));
        let responder = KeywordResponder::with_default_knowledge();

        let checklist = Arc::new(ChecklistService::new(
            clock,
            ProgressAggregator::default(),
            Arc::clone(&storage.tasks),
            Arc::clone(&notifier),
            user.clone(),
        ));
        let dashboard = Arc::new(DashboardService::new(
            ChatAnalytics::new(responder.clone(), AnalyticsConfig::default()),
            Arc::clone(&storage.chat_history),
        ));
        let chat = Arc::new(ChatService::new(
            clock,
            ChatConfig::default(),
            Arc::new(responder),
            Arc::clone(&storage.chat_history),
            Arc::clone(&notifier),
            user,
        ));

        Self {
            checklist,
            chat,
            dashboard,
            notifier,
        }
    }

    #[must_use]
    pub fn checklist(&self) -> Arc<ChecklistService> {
        Arc::clone(&self.checklist)
    }

    #[must_use]
    pub fn chat(&self) -> Arc<ChatService> {
        Arc::clone(&self.chat)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn notifier(&self) -> Arc<WebhookNotifier> {
        Arc::clone(&self.notifier)
    }
}
