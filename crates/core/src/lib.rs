#![forbid(unsafe_code)]

pub mod analytics;
pub mod error;
pub mod history;
pub mod model;
pub mod progress;
pub mod responder;
pub mod similarity;
pub mod time;

pub use analytics::{AnalyticsConfig, ChatAnalytics, DashboardData};
pub use progress::{ProgressAggregator, ProgressConfig};
pub use responder::{Classification, KeywordResponder, KnowledgeEntry};
pub use time::Clock;
