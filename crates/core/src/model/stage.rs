use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseStageError;

/// The three time-boxed onboarding phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "primeiroDia")]
    FirstDay,
    #[serde(rename = "primeiraSemana")]
    FirstWeek,
    #[serde(rename = "primeiroMes")]
    FirstMonth,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::FirstDay, Stage::FirstWeek, Stage::FirstMonth];

    /// Key under which the stage's task list is persisted.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Stage::FirstDay => "primeiroDia",
            Stage::FirstWeek => "primeiraSemana",
            Stage::FirstMonth => "primeiroMes",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Stage::FirstDay => "First day",
            Stage::FirstWeek => "First week",
            Stage::FirstMonth => "First month",
        }
    }

    /// Inverse of [`Stage::storage_key`].
    #[must_use]
    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.storage_key() == key)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if let Some(stage) = Self::from_storage_key(raw) {
            return Ok(stage);
        }
        match raw.to_lowercase().as_str() {
            "day" | "first-day" => Ok(Stage::FirstDay),
            "week" | "first-week" => Ok(Stage::FirstWeek),
            "month" | "first-month" => Ok(Stage::FirstMonth),
            _ => Err(ParseStageError {
                raw: raw.to_string(),
            }),
        }
    }
}
