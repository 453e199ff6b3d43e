#![forbid(unsafe_code)]

pub mod app_services;
pub mod chat_service;
pub mod checklist_service;
pub mod dashboard_service;
pub mod error;
pub mod notify;

pub use onboarding_core::Clock;

pub use app_services::AppServices;
pub use chat_service::{ChatConfig, ChatReply, ChatService};
pub use checklist_service::ChecklistService;
pub use dashboard_service::DashboardService;
pub use error::{AppServicesError, ChatError, ChecklistError, WebhookConfigError};
pub use notify::{
    ChatNotification, ProgressNotification, UserProfile, WebhookConfig, WebhookNotifier,
};
