use std::sync::Arc;

use onboarding_core::history::sort_by_recency;
use onboarding_core::{ChatAnalytics, DashboardData};
use storage::repository::ChatHistoryRepository;

/// Builds the statistics dashboard from the stored chat history.
#[derive(Clone)]
pub struct DashboardService {
    analytics: ChatAnalytics,
    history: Arc<dyn ChatHistoryRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(analytics: ChatAnalytics, history: Arc<dyn ChatHistoryRepository>) -> Self {
        Self { analytics, history }
    }

    #[must_use]
    pub fn analytics(&self) -> &ChatAnalytics {
        &self.analytics
    }

    /// Sessions are analysed most recently active first, whatever order the
    /// backend returns them in. An unreadable history yields the empty dashboard.
    pub async fn dashboard(&self) -> DashboardData {
        let mut sessions = match self.history.load_sessions().await {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!(error = %err, "could not read chat history for dashboard");
                Vec::new()
            }
        };
        sort_by_recency(&mut sessions);
        self.analytics.compute_dashboard(&sessions)
    }
}
