use thiserror::Error;

pub use crate::model::ParseIdError;

/// Raised when a stage name from user input or storage is not recognized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown stage: {raw}")]
pub struct ParseStageError {
    pub raw: String,
}
