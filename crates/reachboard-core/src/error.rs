use crate::config_manager::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReachboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing input file: {0}")]
    MissingFile(String),

    #[error("Malformed table {table}: {reason}")]
    Malformed { table: String, reason: String },

    #[error("Join error: {0}")]
    Join(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid selection: {0}")]
    Selection(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ReachboardError {
    pub(crate) fn malformed(table: impl Into<String>, reason: impl Into<String>) -> Self {
        ReachboardError::Malformed {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by the input data rather than the request.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ReachboardError::Io(_)
                | ReachboardError::Csv(_)
                | ReachboardError::MissingFile(_)
                | ReachboardError::Malformed { .. }
                | ReachboardError::Join(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReachboardError>;
