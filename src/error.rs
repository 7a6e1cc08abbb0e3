use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("debt #{index} has invalid {field}: {value}")]
    InvalidDebt {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("{field} must be a finite number >= 0, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unknown debt order `{0}`; expected as-given, balance or minimum-payment")]
    UnknownOrder(String),
    #[error("malformed debt `{0}`; expected name:rate:amount:balance")]
    MalformedDebt(String),
    #[error("no debt at position {0}")]
    NoSuchDebt(usize),
    #[error("invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profile store lock poisoned")]
    StorePoisoned,
}

impl PlanError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PlanError::StorePoisoned | PlanError::Io { .. })
    }
}
