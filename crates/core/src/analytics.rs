//! Dashboard statistics over the stored chat history.
//!
//! Everything here is a pure function of the sessions passed in. Empty input
//! yields zeroed figures and `"N/A"` latency rather than an error.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use crate::model::{ChatMessage, ChatSession, Sender};
use crate::progress::percentage;
use crate::responder::KeywordResponder;
use crate::similarity;
use crate::time::{local_date, utc_offset};

/// Replies slower than a day are session boundaries, not response times.
const MAX_RESPONSE_MINUTES: f64 = 1440.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: usize,
    pub percentage: u8,
}

/// A group of near-duplicate questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonQuestion {
    pub text: String,
    pub count: usize,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseTime {
    pub average_minutes: f64,
    pub formatted: String,
    pub total_responses: usize,
}

impl ResponseTime {
    fn unavailable() -> Self {
        Self {
            average_minutes: 0.0,
            formatted: "N/A".to_string(),
            total_responses: 0,
        }
    }
}

/// Questions asked on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub count: usize,
}

impl DailyVolume {
    /// `DD/MM/YYYY`
    #[must_use]
    pub fn label(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub total_questions: usize,
    pub total_users: usize,
    pub users: Vec<String>,
    pub by_category: Vec<CategoryStat>,
    pub common_questions: Vec<CommonQuestion>,
    pub response_time: ResponseTime,
    pub daily_volume: Vec<DailyVolume>,
    pub top_category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Category for questions no knowledge entry matches.
    pub fallback_category: String,
    /// Reported as the top category when there are no questions.
    pub no_category_label: String,
    /// Synthetic users are named `"{prefix} {n}"`.
    pub user_label_prefix: String,
    pub top_questions: usize,
    pub max_days: usize,
    /// Calendar used for daily buckets.
    pub utc_offset: FixedOffset,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            fallback_category: "General".to_string(),
            no_category_label: "None".to_string(),
            user_label_prefix: "User".to_string(),
            top_questions: 10,
            max_days: 30,
            utc_offset: utc_offset(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatAnalytics {
    responder: KeywordResponder,
    config: AnalyticsConfig,
}

impl ChatAnalytics {
    #[must_use]
    pub fn new(responder: KeywordResponder, config: AnalyticsConfig) -> Self {
        Self { responder, config }
    }

    #[must_use]
    pub fn responder(&self) -> &KeywordResponder {
        &self.responder
    }

    #[must_use]
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    #[must_use]
    pub fn compute_dashboard(&self, sessions: &[ChatSession]) -> DashboardData {
        let questions: Vec<&ChatMessage> = sessions
            .iter()
            .flat_map(|s| s.messages.iter())
            .filter(|m| m.is_from_user())
            .collect();

        let by_category = self.category_breakdown(&questions);
        let top_category = by_category
            .first()
            .map_or_else(|| self.config.no_category_label.clone(), |c| c.category.clone());
        let users = self.unique_users(sessions);

        DashboardData {
            total_questions: questions.len(),
            total_users: users.len(),
            users,
            common_questions: self.common_questions(&questions),
            response_time: response_time(sessions),
            daily_volume: self.daily_volume(sessions),
            by_category,
            top_category,
        }
    }

    fn category_of(&self, text: &str) -> &str {
        self.responder
            .category_of(text)
            .unwrap_or(self.config.fallback_category.as_str())
    }

    /// Questions per category, most frequent first. Ties keep first-seen order.
    #[must_use]
    pub fn category_breakdown(&self, questions: &[&ChatMessage]) -> Vec<CategoryStat> {
        let mut tally: Vec<(&str, usize)> = Vec::new();
        for question in questions {
            let category = self.category_of(&question.text);
            match tally.iter_mut().find(|(name, _)| *name == category) {
                Some((_, count)) => *count += 1,
                None => tally.push((category, 1)),
            }
        }

        let total = questions.len() as u64;
        let mut stats: Vec<CategoryStat> = tally
            .into_iter()
            .map(|(category, count)| CategoryStat {
                category: category.to_string(),
                count,
                percentage: percentage(count as u64, total),
            })
            .collect();
        stats.sort_by(|a, b| b.count.cmp(&a.count));
        stats
    }

    /// Largest groups of near-duplicate questions.
    #[must_use]
    pub fn common_questions(&self, questions: &[&ChatMessage]) -> Vec<CommonQuestion> {
        let clusters = similarity::group(questions.iter().map(|m| m.text.as_str()));
        let mut common: Vec<CommonQuestion> = clusters
            .into_iter()
            .map(|cluster| CommonQuestion {
                text: cluster.representative.to_string(),
                count: cluster.size,
                category: self.category_of(cluster.representative).to_string(),
            })
            .collect();
        common.sort_by(|a, b| b.count.cmp(&a.count));
        common.truncate(self.config.top_questions);
        common
    }

    /// User questions per day of each session's last activity, newest day first.
    #[must_use]
    pub fn daily_volume(&self, sessions: &[ChatSession]) -> Vec<DailyVolume> {
        let mut buckets: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for session in sessions {
            let day = local_date(session.last_message_at, self.config.utc_offset);
            *buckets.entry(day).or_default() += session.user_messages().count();
        }
        buckets
            .into_iter()
            .rev()
            .take(self.config.max_days)
            .map(|(date, count)| DailyVolume { date, count })
            .collect()
    }

    /// One synthetic user per non-empty session.
    ///
    /// Sessions are calendar days, not people; this is an approximation until
    /// messages carry a user identifier.
    #[must_use]
    pub fn unique_users(&self, sessions: &[ChatSession]) -> Vec<String> {
        let mut seen: Vec<&str> = Vec::new();
        let mut users = Vec::new();
        for (index, session) in sessions.iter().enumerate() {
            if session.is_empty() || seen.contains(&session.id.as_str()) {
                continue;
            }
            seen.push(&session.id);
            users.push(format!("{} {}", self.config.user_label_prefix, index + 1));
        }
        users
    }
}

/// Average delay between a question and the reply right after it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn response_time(sessions: &[ChatSession]) -> ResponseTime {
    let samples: Vec<f64> = sessions
        .iter()
        .flat_map(|session| session.messages.windows(2))
        .filter(|pair| pair[0].sender == Sender::User && pair[1].sender == Sender::System)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64 / 60_000.0)
        .filter(|minutes| *minutes > 0.0 && *minutes < MAX_RESPONSE_MINUTES)
        .collect();

    if samples.is_empty() {
        return ResponseTime::unavailable();
    }

    let average = samples.iter().sum::<f64>() / samples.len() as f64;
    ResponseTime {
        average_minutes: average,
        formatted: format_minutes(average),
        total_responses: samples.len(),
    }
}

/// `"{h}h {m}min"` from one hour up, `"{m}min"` below.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_minutes(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor() as u64;
    let rest = (minutes % 60.0).round() as u64;
    if hours > 0 {
        format!("{hours}h {rest}min")
    } else {
        format!("{rest}min")
    }
}
